use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::PipelineOutcome;
use crate::Stage;

/// JSON rendering of a run
#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    status: &'static str,
    video_id: Option<&'a str>,
    summary: Option<&'a str>,
    error: Option<ErrorDocument>,
    transcript_chars: Option<usize>,
    transcript_file: Option<String>,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ErrorDocument {
    stage: Stage,
    message: String,
}

/// Write the full transcript as plain text
pub fn export_transcript(text: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    fs_err::write(path, text)
        .with_context(|| format!("Failed to write transcript to {}", path.display()))?;

    tracing::debug!("Transcript written to {}", path.display());
    Ok(())
}

/// Rendered outcome plus the result of the transcript export
#[derive(Debug)]
pub struct Presentation {
    pub rendered: String,
    pub export_error: Option<anyhow::Error>,
}

/// Export the transcript, when there is one, and render the outcome.
///
/// A failed export is carried next to the rendered text so the summary is
/// still shown.
pub fn present(
    outcome: &PipelineOutcome,
    format: &OutputFormat,
    export_path: Option<&Path>,
) -> Result<Presentation> {
    let mut export_error = None;

    let transcript_file = match (outcome.transcript(), export_path) {
        (Some(text), Some(path)) => match export_transcript(text, path) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!("Transcript export failed: {:#}", e);
                export_error = Some(e);
                None
            }
        },
        _ => None,
    };

    let rendered = render_outcome(outcome, format, transcript_file)?;
    Ok(Presentation {
        rendered,
        export_error,
    })
}

/// Render a run outcome for the console
pub fn render_outcome(
    outcome: &PipelineOutcome,
    format: &OutputFormat,
    transcript_file: Option<&Path>,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(outcome, transcript_file)),
        OutputFormat::Json => format_as_json(outcome, transcript_file),
    }
}

fn format_as_text(outcome: &PipelineOutcome, transcript_file: Option<&Path>) -> String {
    let mut out = String::new();

    match outcome {
        PipelineOutcome::Done { summary, .. } => {
            let banner = style("Summary generated successfully!").green().bold();
            out.push_str(&format!("{}\n\n", banner));
            out.push_str(&format!("{}\n", style("Summary").bold().underlined()));
            out.push_str(summary);
            out.push('\n');
        }
        PipelineOutcome::Errored { error, .. } => {
            out.push_str(&format!("{} {}\n", style("Error:").red().bold(), error));
        }
    }

    if let Some(path) = transcript_file {
        out.push_str(&format!("\nFull transcript saved to: {}\n", path.display()));
    }

    out
}

fn format_as_json(outcome: &PipelineOutcome, transcript_file: Option<&Path>) -> Result<String> {
    let document = SummaryDocument {
        status: if outcome.is_done() { "done" } else { "errored" },
        video_id: outcome.video_id().map(|id| id.as_str()),
        summary: outcome.summary(),
        error: outcome.error().map(|error| ErrorDocument {
            stage: error.stage(),
            message: error.to_string(),
        }),
        transcript_chars: outcome.transcript().map(|text| text.chars().count()),
        transcript_file: transcript_file.map(|path| path.display().to_string()),
        generated_at: Utc::now(),
    };

    serde_json::to_string_pretty(&document).context("Failed to serialize summary")
}
