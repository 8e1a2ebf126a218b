use serde::{Deserialize, Serialize};

pub mod youtube;

pub use youtube::extract_video_id;

/// Canonical YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a URL into a video identifier
    pub fn parse(url: &str) -> Option<Self> {
        extract_video_id(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch page URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    pub(crate) fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw user input together with the identifier parsed from it
#[derive(Debug, Clone)]
pub struct VideoReference {
    /// Input exactly as supplied
    pub raw: String,

    /// Identifier found in the input, if any
    pub video_id: Option<VideoId>,
}

impl VideoReference {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            video_id: extract_video_id(raw),
        }
    }
}
