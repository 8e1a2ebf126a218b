//! Run controller: URL extraction, transcript fetch and summarization in sequence.
//!
//! Every call to [`Pipeline::run`] drives a fresh [`PipelineRun`] state machine
//! from `AwaitingInput` to either `Done` or `Errored`. The first failing stage
//! halts the run; nothing is retried.

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::extractors::{VideoId, VideoReference};
use crate::summarize::{OpenAiClient, Summarizer, SummaryResult};
use crate::transcript::{TranscriptFetcher, TranscriptResult, YtDlpSource};
use crate::PipelineError;

/// States of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    AwaitingInput,
    ExtractingId,
    FetchingTranscript,
    Summarizing,
    Done,
    Errored,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Errored)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (AwaitingInput, ExtractingId)
                | (ExtractingId, FetchingTranscript)
                | (ExtractingId, Errored)
                | (FetchingTranscript, Summarizing)
                | (FetchingTranscript, Errored)
                | (Summarizing, Done)
                | (Summarizing, Errored)
        )
    }

    /// Progress message for the state
    pub fn describe(self) -> &'static str {
        match self {
            PipelineState::AwaitingInput => "Waiting for a video URL",
            PipelineState::ExtractingId => "Reading video URL...",
            PipelineState::FetchingTranscript => "Fetching transcript...",
            PipelineState::Summarizing => "Summarizing transcript...",
            PipelineState::Done => "Summary generated",
            PipelineState::Errored => "Failed",
        }
    }
}

/// Terminal value of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Done {
        video_id: VideoId,
        transcript: String,
        summary: String,
    },
    Errored {
        error: PipelineError,
        video_id: Option<VideoId>,
        /// Present when the run failed after the transcript was fetched
        transcript: Option<String>,
    },
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, PipelineOutcome::Done { .. })
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            PipelineOutcome::Done { .. } => None,
            PipelineOutcome::Errored { error, .. } => Some(error),
        }
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        match self {
            PipelineOutcome::Done { video_id, .. } => Some(video_id),
            PipelineOutcome::Errored { video_id, .. } => video_id.as_ref(),
        }
    }

    /// Full transcript text, if one was fetched
    pub fn transcript(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Done { transcript, .. } => Some(transcript),
            PipelineOutcome::Errored { transcript, .. } => transcript.as_deref(),
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Done { summary, .. } => Some(summary),
            PipelineOutcome::Errored { .. } => None,
        }
    }
}

/// State machine for one run, reporting every transition to an observer
struct PipelineRun<F: FnMut(PipelineState)> {
    state: PipelineState,
    observer: F,
}

impl<F: FnMut(PipelineState)> PipelineRun<F> {
    fn new(observer: F) -> Self {
        Self {
            state: PipelineState::AwaitingInput,
            observer,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
        (self.observer)(next);
    }

    fn fail(
        &mut self,
        error: PipelineError,
        video_id: Option<VideoId>,
        transcript: Option<String>,
    ) -> PipelineOutcome {
        tracing::warn!(stage = %error.stage(), "Run failed: {}", error);
        self.advance(PipelineState::Errored);
        PipelineOutcome::Errored {
            error,
            video_id,
            transcript,
        }
    }
}

/// Summarization pipeline
pub struct Pipeline {
    fetcher: TranscriptFetcher,
    summarizer: Summarizer,
    languages: Vec<String>,
}

impl Pipeline {
    pub fn new(fetcher: TranscriptFetcher, summarizer: Summarizer, languages: Vec<String>) -> Self {
        Self {
            fetcher,
            summarizer,
            languages,
        }
    }

    /// Wire the pipeline to yt-dlp and the configured completion endpoint
    pub fn from_config(config: &Config, api_key: Option<String>) -> Self {
        let fetcher = TranscriptFetcher::new(
            Box::new(YtDlpSource::new(config.transcript.yt_dlp_path.clone())),
            config.transcript_timeout(),
        );
        let client = OpenAiClient::new(config.openai.api_url.clone(), api_key);
        let summarizer = Summarizer::from_config(Box::new(client), &config.openai);

        Self::new(fetcher, summarizer, config.transcript.languages.clone())
    }

    /// Run the whole chain for one URL
    pub async fn run(&self, url: &str) -> PipelineOutcome {
        self.run_with(url, |_| {}).await
    }

    /// Run the whole chain, reporting each state change to `observer`
    pub async fn run_with<F>(&self, url: &str, observer: F) -> PipelineOutcome
    where
        F: FnMut(PipelineState),
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        self.execute(url, PipelineRun::new(observer))
            .instrument(span)
            .await
    }

    async fn execute<F>(&self, url: &str, mut run: PipelineRun<F>) -> PipelineOutcome
    where
        F: FnMut(PipelineState),
    {
        run.advance(PipelineState::ExtractingId);
        let reference = VideoReference::parse(url);
        let Some(video_id) = reference.video_id else {
            return run.fail(PipelineError::InvalidUrl(reference.raw), None, None);
        };
        tracing::info!("Video id: {}", video_id);

        run.advance(PipelineState::FetchingTranscript);
        let transcript = match self.fetcher.fetch(&video_id, &self.languages).await {
            TranscriptResult::Success(text) => text,
            TranscriptResult::Disabled => {
                return run.fail(PipelineError::TranscriptDisabled, Some(video_id), None);
            }
            TranscriptResult::Unavailable(reason) => {
                return run.fail(PipelineError::TranscriptUnavailable(reason), Some(video_id), None);
            }
        };

        run.advance(PipelineState::Summarizing);
        match self.summarizer.summarize(&transcript).await {
            SummaryResult::Success(summary) => {
                run.advance(PipelineState::Done);
                tracing::info!("Summary generated ({} chars)", summary.chars().count());
                PipelineOutcome::Done {
                    video_id,
                    transcript,
                    summary,
                }
            }
            SummaryResult::Failure(reason) => run.fail(
                PipelineError::SummarizationFailed(reason),
                Some(video_id),
                Some(transcript),
            ),
        }
    }
}
