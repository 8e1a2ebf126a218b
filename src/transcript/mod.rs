use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::extractors::VideoId;

pub mod processor;
pub mod ytdlp;

pub use ytdlp::YtDlpSource;

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Outcome of a transcript fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptResult {
    /// Full transcript text
    Success(String),

    /// The owner turned transcripts off for this video
    Disabled,

    /// Any other retrieval failure, with a readable reason
    Unavailable(String),
}

/// Errors raised while retrieving transcript segments
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("transcripts are disabled for video {0}")]
    Disabled(VideoId),

    #[error("no transcript found for languages [{requested}] (available: [{available}])")]
    NoTranscript { requested: String, available: String },

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: VideoId, reason: String },

    #[error("no json3 caption format offered for language {0}")]
    UnsupportedFormat(String),

    #[error("yt-dlp failed: {0}")]
    Tool(String),

    #[error("failed to run yt-dlp: {0}")]
    Io(#[from] std::io::Error),

    #[error("caption download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed caption data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A service able to return the caption segments of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch segments in the first available language from `languages`
    async fn fetch_segments(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError>;
}

/// Join segment texts with single spaces, keeping their order.
///
/// Whitespace inside a segment collapses to one space and blank segments
/// are skipped, so the result never holds a doubled or trailing separator.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transcript stage of the pipeline
pub struct TranscriptFetcher {
    source: Box<dyn TranscriptSource>,
    timeout: Duration,
}

impl TranscriptFetcher {
    pub fn new(source: Box<dyn TranscriptSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetch the transcript text for a video.
    ///
    /// A single attempt is made; errors and timeouts become
    /// [`TranscriptResult::Unavailable`] except a disabled-captions error,
    /// which stays distinct.
    pub async fn fetch(&self, video_id: &VideoId, languages: &[String]) -> TranscriptResult {
        tracing::info!("Fetching transcript for {} (languages: {})", video_id, languages.join(","));

        let fetched = tokio::time::timeout(
            self.timeout,
            self.source.fetch_segments(video_id, languages),
        )
        .await;

        match fetched {
            Err(_) => {
                tracing::warn!("Transcript fetch for {} timed out", video_id);
                TranscriptResult::Unavailable(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                ))
            }
            Ok(Err(FetchError::Disabled(_))) => {
                tracing::warn!("Transcripts are disabled for {}", video_id);
                TranscriptResult::Disabled
            }
            Ok(Err(e)) => {
                tracing::warn!("Transcript fetch for {} failed: {}", video_id, e);
                TranscriptResult::Unavailable(e.to_string())
            }
            Ok(Ok(segments)) => {
                let text = join_segments(&segments);
                if text.is_empty() {
                    tracing::warn!("Transcript for {} contains no text", video_id);
                    return TranscriptResult::Unavailable("transcript contains no text".to_string());
                }

                tracing::info!("Fetched {} transcript segments", segments.len());
                TranscriptResult::Success(text)
            }
        }
    }
}
