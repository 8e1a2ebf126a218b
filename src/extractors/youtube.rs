use lazy_static::lazy_static;
use regex::Regex;

use super::VideoId;

lazy_static! {
    /// Supported URL shapes, tried in order
    static ref URL_PATTERNS: [(&'static str, Regex); 3] = [
        (
            "watch",
            Regex::new(
                r"(?:https?://)?(?:www\.)?youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]+)",
            )
            .unwrap(),
        ),
        (
            "live",
            Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/live/([A-Za-z0-9_-]+)").unwrap(),
        ),
        (
            "short",
            Regex::new(r"(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]+)").unwrap(),
        ),
    ];
}

/// Extract the video identifier from a YouTube URL.
///
/// Returns `None` when the input matches none of the supported shapes
/// (`youtube.com/watch?v=`, `youtube.com/live/`, `youtu.be/`).
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    for (shape, pattern) in URL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            let id = caps.get(1)?.as_str();
            tracing::debug!("Matched {} URL shape, video id: {}", shape, id);
            return Some(VideoId::new_unchecked(id));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> Option<String> {
        extract_video_id(url).map(|id| id.as_str().to_string())
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(id("https://www.youtube.com/watch?v=abc123"), Some("abc123".to_string()));
        assert_eq!(id("http://youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(id("youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(id("www.youtube.com/watch?v=a-b_c"), Some("a-b_c".to_string()));
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_live_url() {
        assert_eq!(id("https://www.youtube.com/live/jfKfPfyJRdk"), Some("jfKfPfyJRdk".to_string()));
        assert_eq!(id("youtube.com/live/jfKfPfyJRdk?si=xyz"), Some("jfKfPfyJRdk".to_string()));
    }

    #[test]
    fn test_short_url() {
        assert_eq!(id("https://youtu.be/xyz789"), Some("xyz789".to_string()));
        assert_eq!(id("youtu.be/dQw4w9WgXcQ?t=42"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(id("http://www.youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_unrecognized_input() {
        assert_eq!(id("not a url"), None);
        assert_eq!(id(""), None);
        assert_eq!(id("https://vimeo.com/123456"), None);
        assert_eq!(id("https://www.youtube.com/channel/UC123"), None);
        assert_eq!(id("https://www.youtube.com/watch?list=PL123"), None);
        assert_eq!(id("https://youtu.be/"), None);
        assert_eq!(id("💥 youtube.com/watch?v="), None);
    }

    #[test]
    fn test_video_reference() {
        let reference = crate::extractors::VideoReference::parse("https://youtu.be/xyz789");
        assert_eq!(reference.raw, "https://youtu.be/xyz789");
        assert_eq!(reference.video_id.as_ref().map(|id| id.as_str()), Some("xyz789"));
        assert_eq!(
            reference.video_id.unwrap().watch_url(),
            "https://www.youtube.com/watch?v=xyz789"
        );
    }
}
