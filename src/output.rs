use crate::Transcript;
use crate::summarize::truncate_chars;

/// Characters of transcript shown inline before it is cut off
pub const PREVIEW_CHARS: usize = 1200;

pub const SUMMARY_FILE: &str = "summary.txt";
pub const TRANSCRIPT_FILE: &str = "transcript.txt";

/// Render transcript as one block of plain text
pub fn render_text(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Short inline preview of a long text
pub fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        format!("{}...", truncate_chars(text, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Segment, TranscriptSource};

    fn sample_transcript() -> Transcript {
        Transcript {
            video_id: "test123".to_string(),
            language: "en".to_string(),
            source: TranscriptSource::Caption,
            segments: vec![
                Segment {
                    text: "Hello world".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                Segment {
                    text: " This is a test ".to_string(),
                    start: 1.5,
                    duration: 2.0,
                },
            ],
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&sample_transcript()), "Hello world This is a test");
    }

    #[test]
    fn test_render_text_empty() {
        let t = Transcript {
            segments: vec![],
            ..sample_transcript()
        };
        assert_eq!(render_text(&t), "");
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
        let exact = "y".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact, PREVIEW_CHARS), exact);
    }

    #[test]
    fn test_preview_long_text() {
        let long = "z".repeat(PREVIEW_CHARS + 1);
        let p = preview(&long, PREVIEW_CHARS);
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("z..."));
    }
}
