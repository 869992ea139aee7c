pub mod audio;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod output;
pub mod progress;
pub mod qa;
pub mod session;
pub mod summarize;
pub mod thumbnail;
pub mod whisper;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// A single timed piece of the transcript
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Source of the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptSource {
    Caption,
    Whisper,
}

/// Complete transcript for a video
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub source: TranscriptSource,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Full transcript text, segments joined by single spaces
    pub fn text(&self) -> String {
        output::render_text(self)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Caption => write!(f, "caption"),
            TranscriptSource::Whisper => write!(f, "whisper"),
        }
    }
}

static ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9_-]{11}").expect("video id pattern is valid"));

/// Extract video ID from the known YouTube URL shapes, falling back to
/// the first 11-character ID-like token anywhere in the input.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = Url::parse(input) {
        let host = parsed.host_str().unwrap_or_default().to_lowercase();

        if host.contains("youtu.be") {
            let id = parsed.path().trim_start_matches('/');
            let id = id.split(['?', '/']).next().unwrap_or_default();
            return non_empty(id);
        }

        if host.contains("youtube.com") || host.contains("youtube-nocookie.com") {
            if let Some(rest) = parsed.path().strip_prefix("/shorts/") {
                return non_empty(rest.trim_matches('/'));
            }
            if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
                return non_empty(&v);
            }
            let last = parsed.path().trim_matches('/').rsplit('/').next().unwrap_or_default();
            return non_empty(last);
        }
    }

    ID_TOKEN.find(input).map(|m| m.as_str().to_string())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}
