use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::processor::{parse_json3, VideoInfo};
use super::{FetchError, TranscriptSegment, TranscriptSource};
use crate::extractors::VideoId;

/// Transcript source backed by yt-dlp metadata and the YouTube timed-text feed
pub struct YtDlpSource {
    yt_dlp_path: String,
    http: reqwest::Client,
}

impl YtDlpSource {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Get caption track listing using yt-dlp
    async fn get_video_info(&self, video_id: &VideoId) -> Result<VideoInfo, FetchError> {
        let url = video_id.watch_url();
        tracing::debug!("Listing caption tracks for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                url.as_str(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(video_id, error));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Download a caption track body
    async fn download_track(&self, track_url: &str) -> Result<String, FetchError> {
        let response = self.http.get(track_url).send().await?.error_for_status()?;
        tracing::debug!("Caption track responded with HTTP {}", response.status());
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch_segments(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError> {
        let info = self.get_video_info(video_id).await?;
        let track = info.select_track(video_id, languages)?;

        tracing::info!(
            "Using {} transcript '{}' for {}",
            if track.generated { "generated" } else { "manual" },
            track.language,
            info.title.as_deref().unwrap_or(video_id.as_str())
        );

        let body = self.download_track(&track.url).await?;
        parse_json3(&body)
    }
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

/// Map yt-dlp stderr to a fetch error
fn classify_failure(video_id: &VideoId, stderr: String) -> FetchError {
    const UNAVAILABLE_MARKERS: &[&str] = &[
        "Video unavailable",
        "Private video",
        "This video is not available",
        "This video has been removed",
        "Incomplete YouTube ID",
    ];

    let reason = stderr
        .lines()
        .rev()
        .find(|line| line.contains("ERROR"))
        .unwrap_or(stderr.as_str())
        .trim_start_matches("ERROR:")
        .trim()
        .to_string();

    if UNAVAILABLE_MARKERS.iter().any(|marker| stderr.contains(marker)) {
        FetchError::VideoUnavailable {
            video_id: video_id.clone(),
            reason,
        }
    } else {
        FetchError::Tool(reason)
    }
}
