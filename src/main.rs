use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_summarizer::cli::{Cli, Commands, LogFormat};
use yt_summarizer::{output, utils, Config, Pipeline, PipelineError, VideoId};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "yt_summarizer=debug"
    } else {
        "yt_summarizer=warn"
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()),
    );
    match cli.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    match cli.command {
        Commands::Summarize {
            url,
            lang,
            model,
            api_url,
            api_key,
            output,
            no_export,
            format,
        } => {
            let config =
                Config::load()?.with_overrides(&lang, model.as_deref(), api_url.as_deref())?;

            // Check for yt-dlp only when the URL is usable (non-fatal)
            if VideoId::parse(&url).is_some() {
                let missing_deps = utils::check_dependencies(&config.transcript.yt_dlp_path).await;
                if !missing_deps.is_empty() {
                    eprintln!("⚠️  Dependency check warnings:");
                    for dep in missing_deps {
                        eprintln!("   • {}", dep);
                    }
                }
            }

            let pipeline = Pipeline::from_config(&config, api_key);

            let progress = if cli.quiet {
                None
            } else {
                let progress = ProgressBar::new_spinner();
                progress.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
                );
                progress.enable_steady_tick(Duration::from_millis(100));
                Some(progress)
            };

            let outcome = pipeline
                .run_with(&url, |state| {
                    if let Some(progress) = &progress {
                        progress.set_message(state.describe());
                    }
                })
                .await;

            if let Some(progress) = &progress {
                progress.finish_and_clear();
            }

            // The transcript is exported even when summarization failed
            let export_path = if no_export {
                None
            } else {
                Some(output.unwrap_or_else(|| config.transcript_file()))
            };

            let presentation = output::present(&outcome, &format, export_path.as_deref())?;
            if outcome.is_done() || matches!(format, yt_summarizer::OutputFormat::Json) {
                println!("{}", presentation.rendered);
            } else {
                eprint!("{}", presentation.rendered);
            }

            if let Some(e) = presentation.export_error {
                eprintln!("{} {:#}", style("Warning:").yellow().bold(), e);
                return Ok(ExitCode::FAILURE);
            }

            if !outcome.is_done() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Extract { url } => match VideoId::parse(&url) {
            Some(video_id) => println!("{}", video_id),
            None => {
                eprintln!("{} {}", style("Error:").red().bold(), PipelineError::InvalidUrl(url));
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Config { show, init } => {
            if init {
                let path = Config::init()?;
                println!("Default configuration written to: {}", path.display());
            } else if show {
                let api_key = std::env::var("OPENAI_API_KEY").ok();
                Config::load()?.display(api_key.as_deref());
            } else {
                println!(
                    "Use --show to print the current configuration or --init to create a config file."
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
