use log::warn;

use crate::llm::Llm;

pub const DEFAULT_MAX_WORDS: usize = 250;

/// Transcript characters sent with the summary prompt
pub const SUMMARY_CONTEXT_CHARS: usize = 15_000;

pub const SUMMARY_PROMPT: &str = "You are an expert multilingual video summarizer.
Translate transcript to English if needed and summarize in 200–250 words
highlighting the key points, tone, and insights.

Transcript:
";

/// Generated summary plus the reason the local fallback was used, if it was
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub fallback_reason: Option<String>,
}

/// First `n` characters of `text`
pub fn truncate_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn summary_prompt(transcript: &str) -> String {
    format!("{SUMMARY_PROMPT}{}", truncate_chars(transcript, SUMMARY_CONTEXT_CHARS))
}

/// Naive summary: the first `max_words` words, whitespace collapsed
pub fn simple_summarize(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        format!("{}...", words[..max_words].join(" "))
    }
}

/// Summarize with the model when one is configured, locally otherwise
pub async fn generate_summary(
    client: &reqwest::Client,
    llm: Option<&Llm>,
    transcript: &str,
    max_words: usize,
) -> Summary {
    if transcript.trim().is_empty() {
        return Summary::default();
    }

    let Some(llm) = llm else {
        return Summary {
            text: simple_summarize(transcript, max_words),
            fallback_reason: None,
        };
    };

    match llm.generate(client, &summary_prompt(transcript)).await {
        Ok(text) => Summary {
            text,
            fallback_reason: None,
        },
        Err(e) => {
            warn!("{} summarization failed, using local summarizer: {e:#}", llm.provider);
            Summary {
                text: simple_summarize(transcript, max_words),
                fallback_reason: Some(format!("{e:#}")),
            }
        }
    }
}
