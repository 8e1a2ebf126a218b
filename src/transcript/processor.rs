use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

use super::{FetchError, TranscriptSegment};
use crate::extractors::VideoId;

/// Subset of the `yt-dlp --dump-json` output describing caption tracks
#[derive(Debug, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    subtitles: Option<BTreeMap<String, Vec<CaptionFormat>>>,

    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, Vec<CaptionFormat>>>,
}

/// One downloadable rendition of a caption track
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionFormat {
    pub ext: String,
    pub url: String,
}

/// Caption track picked for download
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTrack {
    pub language: String,
    pub generated: bool,
    pub url: String,
}

/// YouTube json3 timed-text document
#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl VideoInfo {
    /// Manually created tracks, without the live chat pseudo-track
    fn manual_tracks(&self) -> Vec<(&str, &[CaptionFormat])> {
        self.subtitles
            .iter()
            .flatten()
            .filter(|(lang, _)| lang.as_str() != "live_chat")
            .map(|(lang, formats)| (lang.as_str(), formats.as_slice()))
            .collect()
    }

    /// Speech-recognition tracks in the spoken language; machine translations are left out
    fn generated_tracks(&self) -> Vec<(&str, &[CaptionFormat])> {
        self.automatic_captions
            .iter()
            .flatten()
            .filter(|(_, formats)| !formats.iter().any(|format| is_translation(&format.url)))
            .map(|(lang, formats)| (lang.as_str(), formats.as_slice()))
            .collect()
    }

    /// Pick the caption track to download.
    ///
    /// Requested languages are tried in order. For each, an exact match beats a
    /// primary-subtag match (`pt` accepts `pt-BR`), and a manual track beats a
    /// generated one.
    pub fn select_track(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<SelectedTrack, FetchError> {
        let manual = self.manual_tracks();
        let generated = self.generated_tracks();

        if manual.is_empty() && generated.is_empty() {
            return Err(FetchError::Disabled(video_id.clone()));
        }

        let candidates = manual
            .iter()
            .map(|(lang, formats)| (*lang, *formats, false))
            .chain(generated.iter().map(|(lang, formats)| (*lang, *formats, true)))
            .collect::<Vec<_>>();

        for wanted in languages {
            let exact = candidates.iter().find(|(lang, _, _)| lang.eq_ignore_ascii_case(wanted));
            let wanted_primary = primary_subtag(wanted);
            let by_prefix = || {
                candidates
                    .iter()
                    .find(|(lang, _, _)| primary_subtag(lang).eq_ignore_ascii_case(wanted_primary))
            };

            if let Some((lang, formats, generated)) = exact.or_else(by_prefix) {
                let format = formats
                    .iter()
                    .find(|format| format.ext == "json3")
                    .ok_or_else(|| FetchError::UnsupportedFormat(lang.to_string()))?;

                return Ok(SelectedTrack {
                    language: lang.to_string(),
                    generated: *generated,
                    url: format.url.clone(),
                });
            }
        }

        // Manual tracks first, each language listed once
        let mut seen = BTreeSet::new();
        let available = candidates
            .iter()
            .map(|(lang, _, _)| *lang)
            .filter(|lang| seen.insert(*lang))
            .collect::<Vec<_>>();

        Err(FetchError::NoTranscript {
            requested: languages.join(", "),
            available: available.join(", "),
        })
    }
}

fn primary_subtag(lang: &str) -> &str {
    lang.split(['-', '_']).next().unwrap_or(lang)
}

fn is_translation(track_url: &str) -> bool {
    Url::parse(track_url)
        .map(|parsed| parsed.query_pairs().any(|(key, _)| key == "tlang"))
        .unwrap_or(false)
}

/// Parse a json3 caption document into ordered segments.
///
/// Events carrying no visible text (line-break fillers in generated tracks)
/// are dropped. Line breaks inside a caption become spaces.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>, FetchError> {
    let track: Json3Track = serde_json::from_str(body)?;

    let segments = track
        .events
        .into_iter()
        .filter_map(|event| {
            let raw = event.segs.iter().map(|seg| seg.utf8.as_str()).collect::<String>();
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment {
                text,
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(json: &str) -> VideoInfo {
        serde_json::from_str(json).unwrap()
    }

    fn video_id() -> VideoId {
        VideoId::new_unchecked("abc123")
    }

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|lang| lang.to_string()).collect()
    }

    const INFO: &str = r#"{
        "title": "Demo",
        "subtitles": {
            "en": [
                {"ext": "vtt", "url": "https://yt.example/api/timedtext?v=abc123&lang=en&fmt=vtt"},
                {"ext": "json3", "url": "https://yt.example/api/timedtext?v=abc123&lang=en&fmt=json3"}
            ],
            "live_chat": [{"ext": "json", "url": "https://yt.example/live_chat"}]
        },
        "automatic_captions": {
            "pt": [{"ext": "json3", "url": "https://yt.example/api/timedtext?v=abc123&lang=pt&kind=asr&fmt=json3"}],
            "de": [{"ext": "json3", "url": "https://yt.example/api/timedtext?v=abc123&lang=pt&kind=asr&tlang=de&fmt=json3"}]
        }
    }"#;

    #[test]
    fn prefers_requested_language_order() {
        let track = info(INFO).select_track(&video_id(), &langs(&["pt", "en"])).unwrap();
        assert_eq!(track.language, "pt");
        assert!(track.generated);
        assert!(track.url.contains("kind=asr"));

        let track = info(INFO).select_track(&video_id(), &langs(&["en", "pt"])).unwrap();
        assert_eq!(track.language, "en");
        assert!(!track.generated);
        assert!(track.url.ends_with("fmt=json3"));
    }

    #[test]
    fn matches_regional_variant() {
        let track = info(INFO).select_track(&video_id(), &langs(&["en-US"])).unwrap();
        assert_eq!(track.language, "en");
    }

    #[test]
    fn translations_are_not_offered() {
        match info(INFO).select_track(&video_id(), &langs(&["de"])) {
            Err(FetchError::NoTranscript { requested, available }) => {
                assert_eq!(requested, "de");
                assert_eq!(available, "en, pt");
            }
            other => panic!("expected NoTranscript, got {:?}", other),
        }
    }

    #[test]
    fn available_languages_listed_once() {
        let both = info(
            r#"{
                "subtitles": {
                    "en": [{"ext": "json3", "url": "https://yt.example/en"}],
                    "fr": [{"ext": "json3", "url": "https://yt.example/fr"}]
                },
                "automatic_captions": {
                    "en": [{"ext": "json3", "url": "https://yt.example/en?kind=asr"}]
                }
            }"#,
        );

        match both.select_track(&video_id(), &langs(&["ja"])) {
            Err(FetchError::NoTranscript { available, .. }) => assert_eq!(available, "en, fr"),
            other => panic!("expected NoTranscript, got {:?}", other),
        }
    }

    #[test]
    fn no_tracks_means_disabled() {
        let empty = info(r#"{"title": "Quiet", "subtitles": {}, "automatic_captions": null}"#);
        assert!(matches!(
            empty.select_track(&video_id(), &langs(&["pt"])),
            Err(FetchError::Disabled(_))
        ));

        let chat_only = info(
            r#"{"subtitles": {"live_chat": [{"ext": "json", "url": "https://yt.example/c"}]}}"#,
        );
        assert!(matches!(
            chat_only.select_track(&video_id(), &langs(&["pt"])),
            Err(FetchError::Disabled(_))
        ));
    }

    #[test]
    fn missing_json3_format() {
        let vtt_only = info(
            r#"{"subtitles": {"pt": [{"ext": "vtt", "url": "https://yt.example/pt.vtt"}]}}"#,
        );
        assert!(matches!(
            vtt_only.select_track(&video_id(), &langs(&["pt"])),
            Err(FetchError::UnsupportedFormat(lang)) if lang == "pt"
        ));
    }

    #[test]
    fn parses_json3_events_in_order() {
        let body = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 1500, "segs": [{"utf8": "Hello"}]},
                {"tStartMs": 1500, "dDurationMs": 10, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 1600, "dDurationMs": 2000, "segs": [{"utf8": "big"}, {"utf8": " wide\nworld"}]},
                {"tStartMs": 4000, "dDurationMs": 500}
            ]
        }"#;

        let segments = parse_json3(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], TranscriptSegment::new("Hello", 0.0, 1.5));
        assert_eq!(segments[1], TranscriptSegment::new("big wide world", 1.6, 2.0));
    }

    #[test]
    fn rejects_malformed_json3() {
        assert!(matches!(parse_json3("<transcript/>"), Err(FetchError::Json(_))));
    }
}
