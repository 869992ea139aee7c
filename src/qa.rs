use log::warn;

use crate::llm::Llm;
use crate::summarize::truncate_chars;

/// Transcript characters sent with each question
pub const QA_CONTEXT_CHARS: usize = 12_000;

pub fn question_prompt(transcript: &str, question: &str) -> String {
    format!(
        "Answer the following question based ONLY on the transcript of the YouTube video:\n\n\
         Transcript:\n{}\n\nQuestion: {question}\nAnswer clearly in English:",
        truncate_chars(transcript, QA_CONTEXT_CHARS)
    )
}

/// Answer a free-text question about the transcript; failures come back as text
pub async fn answer_question(client: &reqwest::Client, llm: Option<&Llm>, transcript: &str, question: &str) -> String {
    let question = question.trim();
    if question.is_empty() {
        return "Please enter a question.".to_string();
    }

    let Some(llm) = llm else {
        return "Q&A requires an LLM API key.".to_string();
    };

    match llm.generate(client, &question_prompt(transcript, question)).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!("{} Q&A failed: {e:#}", llm.provider);
            format!("AI could not answer: {e:#}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prompt_layout() {
        let prompt = question_prompt("the talk covers rust", "What is covered?");
        assert_eq!(
            prompt,
            "Answer the following question based ONLY on the transcript of the YouTube video:\n\n\
             Transcript:\nthe talk covers rust\n\nQuestion: What is covered?\nAnswer clearly in English:"
        );
    }

    #[test]
    fn test_question_prompt_truncates() {
        let transcript = "x".repeat(QA_CONTEXT_CHARS * 2);
        let prompt = question_prompt(&transcript, "q");
        assert_eq!(prompt.matches('x').count(), QA_CONTEXT_CHARS);
    }

    #[tokio::test]
    async fn test_blank_question() {
        let client = reqwest::Client::new();
        assert_eq!(answer_question(&client, None, "text", "   ").await, "Please enter a question.");
    }

    #[tokio::test]
    async fn test_no_model_configured() {
        let client = reqwest::Client::new();
        assert_eq!(
            answer_question(&client, None, "text", "why?").await,
            "Q&A requires an LLM API key."
        );
    }

    #[tokio::test]
    async fn test_model_failure_is_reported_as_answer() {
        let client = reqwest::Client::new();
        let llm = Llm::new("gpt-4o-mini", "k".to_string()).with_base_url("http://127.0.0.1:1");

        let answer = answer_question(&client, Some(&llm), "the talk covers rust", "What is covered?").await;
        assert!(answer.starts_with("AI could not answer: "));
        assert!(answer.len() > "AI could not answer: ".len());
    }
}
