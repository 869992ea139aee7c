use eyre::{Result, bail};
use log::debug;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-001";

/// Hosted model vendor, chosen from the model name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("gemini") {
            Provider::Gemini
        } else if model.starts_with("claude") {
            Provider::Anthropic
        } else {
            Provider::OpenAi
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GOOGLE_API_KEY", "GENAI_API_KEY"],
            Provider::Anthropic => &["ANTHROPIC_API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAi => "https://api.openai.com",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "Gemini"),
            Provider::Anthropic => write!(f, "Anthropic"),
            Provider::OpenAi => write!(f, "OpenAI"),
        }
    }
}

/// A configured model endpoint
#[derive(Debug, Clone)]
pub struct Llm {
    pub provider: Provider,
    pub model: String,
    api_key: String,
    base_url: String,
}

impl Llm {
    pub fn new(model: &str, api_key: String) -> Self {
        let provider = Provider::for_model(model);
        Self {
            provider,
            model: model.to_string(),
            api_key,
            base_url: provider.default_base_url().to_string(),
        }
    }

    /// Point requests at another host (proxy, gateway, local mock)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a single user prompt and return the model's text reply
    pub async fn generate(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        debug!("Calling {} model {} ({} chars)", self.provider, self.model, prompt.chars().count());
        match self.provider {
            Provider::Gemini => self.generate_gemini(client, prompt).await,
            Provider::Anthropic => self.generate_anthropic(client, prompt).await,
            Provider::OpenAi => self.generate_openai(client, prompt).await,
        }
    }

    async fn generate_gemini(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        let url = self.endpoint(&format!("/v1beta/models/{}:generateContent", self.model));
        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let json = read_json(resp, self.provider).await?;
        extract_gemini_text(&json)
    }

    async fn generate_anthropic(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 4096,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let resp = client
            .post(self.endpoint("/v1/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        let json = read_json(resp, self.provider).await?;
        extract_anthropic_text(&json)
    }

    async fn generate_openai(&self, client: &reqwest::Client, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let resp = client
            .post(self.endpoint("/v1/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let json = read_json(resp, self.provider).await?;
        extract_openai_text(&json)
    }
}

async fn read_json(resp: reqwest::Response, provider: Provider) -> Result<serde_json::Value> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("{provider} API returned {status}: {body}");
    }
    Ok(resp.json().await?)
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());

    if let Some(parts) = parts {
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text")?.as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }

    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        bail!("Gemini blocked the prompt: {reason}");
    }
    bail!("unexpected Gemini API response format");
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    bail!("unexpected Anthropic API response format");
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected OpenAI API response format");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_for_model() {
        assert_eq!(Provider::for_model("gemini-1.5-flash-001"), Provider::Gemini);
        assert_eq!(Provider::for_model("claude-sonnet-4-6"), Provider::Anthropic);
        assert_eq!(Provider::for_model("gpt-4o-mini"), Provider::OpenAi);
    }

    #[test]
    fn test_endpoint_defaults_and_override() {
        let llm = Llm::new("claude-sonnet-4-6", "k".to_string());
        assert_eq!(llm.endpoint("/v1/messages"), "https://api.anthropic.com/v1/messages");

        let llm = Llm::new("gpt-4o-mini", "k".to_string()).with_base_url("http://localhost:8080/");
        assert_eq!(llm.endpoint("/v1/chat/completions"), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_generate_unreachable_host() {
        let client = reqwest::Client::new();
        let llm = Llm::new("gemini-1.5-flash-001", "k".to_string()).with_base_url("http://127.0.0.1:1");
        assert!(llm.generate(&client, "hello").await.is_err());
    }

    #[test]
    fn test_gemini_key_vars_order() {
        assert_eq!(Provider::Gemini.key_vars(), &["GOOGLE_API_KEY", "GENAI_API_KEY"]);
    }

    #[test]
    fn test_extract_gemini_text() {
        let json = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [{"text": "Key points: "}, {"text": "one, two."}]
                    },
                    "finishReason": "STOP"
                }
            ]
        });
        assert_eq!(extract_gemini_text(&json).unwrap(), "Key points: one, two.");
    }

    #[test]
    fn test_extract_gemini_text_blocked() {
        let json = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = extract_gemini_text(&json).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "Here is the summary."}]
        });
        assert_eq!(extract_anthropic_text(&json).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_anthropic_text_empty() {
        assert!(extract_anthropic_text(&serde_json::json!({"content": []})).is_err());
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Summary of the video."}}]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "Summary of the video.");
    }

    #[test]
    fn test_extract_openai_text_empty() {
        assert!(extract_openai_text(&serde_json::json!({"choices": []})).is_err());
    }
}
