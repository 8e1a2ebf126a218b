use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-summarizer",
    about = "YT Summarizer - Summarize YouTube videos from their transcripts",
    version,
    long_about = "Fetches the transcript of a YouTube video, sends it to an OpenAI-compatible chat model and prints a condensed summary. The full transcript is saved as a plain-text file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a video's transcript and summarize it
    Summarize {
        /// YouTube video URL (youtube.com/watch?v=, youtube.com/live/ or youtu.be/)
        #[arg(value_name = "URL")]
        url: String,

        /// Preferred transcript languages, in order (comma separated)
        #[arg(short, long, value_name = "LANGS", value_delimiter = ',')]
        lang: Vec<String>,

        /// Chat model used for the summary
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// Chat completions endpoint
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,

        /// API key for the completion service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// File the full transcript is written to
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not write the transcript file
        #[arg(long)]
        no_export: bool,

        /// Summary output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the video identifier found in a URL
    Extract {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON document with metadata
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
