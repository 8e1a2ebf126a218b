//! YT Summarizer - A Rust CLI tool for summarizing YouTube videos from their transcripts
//!
//! This library extracts the video identifier from a YouTube URL, fetches the video's
//! transcript in a preferred language and asks an OpenAI-compatible chat model for a
//! condensed summary. The full transcript stays available for export.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{VideoId, VideoReference};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineState};
pub use summarize::{Summarizer, SummaryResult};
pub use transcript::{TranscriptFetcher, TranscriptResult, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Pipeline stage in which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Fetch,
    Summarization,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Extraction => write!(f, "URL extraction"),
            Stage::Fetch => write!(f, "transcript fetch"),
            Stage::Summarization => write!(f, "summarization"),
        }
    }
}

/// Error kinds a pipeline run can halt with
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid URL: '{0}' is not a recognizable YouTube video link")]
    InvalidUrl(String),

    #[error("Transcript fetch failed: transcripts are disabled for this video")]
    TranscriptDisabled,

    #[error("Transcript fetch failed: {0}")]
    TranscriptUnavailable(String),

    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),
}

impl PipelineError {
    /// The stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidUrl(_) => Stage::Extraction,
            PipelineError::TranscriptDisabled | PipelineError::TranscriptUnavailable(_) => {
                Stage::Fetch
            }
            PipelineError::SummarizationFailed(_) => Stage::Summarization,
        }
    }
}
