use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::audio::{DEFAULT_FFMPEG_BIN, DEFAULT_YTDLP_BIN, Tools};
use crate::cli::Cli;
use crate::llm::{self, Llm};
use crate::summarize::DEFAULT_MAX_WORDS;
use crate::whisper::{SpeechBackend, SpeechConfig};

pub const DEFAULT_WHISPER_MODEL: &str = "base";
pub const DEFAULT_WHISPER_BIN: &str = "whisper";
pub const DEFAULT_COOKIES_FILE: &str = "cookies.txt";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub whisper_model: Option<String>,
    pub stt_backend: Option<SpeechBackend>,
    pub whisper_bin: Option<String>,
    pub ytdlp_bin: Option<String>,
    pub ffmpeg_bin: Option<String>,
    pub llm_base_url: Option<String>,
    pub cookies_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub summary_words: Option<usize>,
    pub lang: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytnotes/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytnotes")
        .join("config.toml")
}

/// Effective settings for a run: CLI over environment over config file over defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: String,
    pub llm: Option<Llm>,
    pub speech: SpeechConfig,
    pub tools: Tools,
    pub lang: String,
    pub cookies_file: PathBuf,
    pub output_dir: PathBuf,
    pub summary_words: usize,
    pub no_fallback: bool,
}

impl Settings {
    pub fn resolve<F>(cli: &Cli, config: &Config, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let model = cli
            .model
            .clone()
            .or_else(|| lookup("GENAI_MODEL"))
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| llm::DEFAULT_MODEL.to_string());

        let provider = llm::Provider::for_model(&model);
        let llm = provider
            .key_vars()
            .iter()
            .find_map(|var| lookup(*var))
            .map(|key| Llm::new(&model, key))
            .map(|llm| match &config.llm_base_url {
                Some(base) => llm.with_base_url(base),
                None => llm,
            });
        if llm.is_none() {
            debug!("No API key for {provider} in {:?}; using local fallbacks", provider.key_vars());
        }

        let speech = SpeechConfig {
            backend: cli.stt.or(config.stt_backend).unwrap_or_default(),
            model: cli
                .whisper_model
                .clone()
                .or_else(|| lookup("WHISPER_MODEL"))
                .or_else(|| config.whisper_model.clone())
                .unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
            binary: config
                .whisper_bin
                .clone()
                .unwrap_or_else(|| DEFAULT_WHISPER_BIN.to_string()),
            openai_key: lookup("OPENAI_API_KEY"),
        };

        let tools = Tools {
            ytdlp: config
                .ytdlp_bin
                .clone()
                .unwrap_or_else(|| DEFAULT_YTDLP_BIN.to_string()),
            ffmpeg: config
                .ffmpeg_bin
                .clone()
                .unwrap_or_else(|| DEFAULT_FFMPEG_BIN.to_string()),
        };

        Self {
            model,
            llm,
            speech,
            tools,
            lang: cli
                .lang
                .clone()
                .or_else(|| config.lang.clone())
                .unwrap_or_else(|| "en".to_string()),
            cookies_file: cli
                .cookies
                .clone()
                .or_else(|| config.cookies_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIES_FILE)),
            output_dir: cli
                .output_dir
                .clone()
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            summary_words: config.summary_words.unwrap_or(DEFAULT_MAX_WORDS),
            no_fallback: cli.no_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;
    use crate::llm::Provider;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ytnotes").chain(args.iter().copied()))
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
model = "claude-sonnet-4-6"
whisper_model = "small"
stt_backend = "openai"
cookies_file = "/home/me/cookies.txt"
ytdlp_bin = "/opt/bin/yt-dlp"
summary_words = 120
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.as_deref(), Some("claude-sonnet-4-6"));
        assert_eq!(config.whisper_model.as_deref(), Some("small"));
        assert_eq!(config.stt_backend, Some(SpeechBackend::OpenAi));
        assert_eq!(config.summary_words, Some(120));

        let s = Settings::resolve(&cli(&[]), &config, env_of(&[]));
        assert_eq!(s.tools.ytdlp, "/opt/bin/yt-dlp");
        assert_eq!(s.tools.ffmpeg, "ffmpeg");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.model.is_none());
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::resolve(&cli(&[]), &Config::default(), env_of(&[]));
        assert_eq!(s.model, "gemini-1.5-flash-001");
        assert!(s.llm.is_none());
        assert_eq!(s.speech.model, "base");
        assert_eq!(s.speech.backend, SpeechBackend::Local);
        assert_eq!(s.cookies_file, PathBuf::from("cookies.txt"));
        assert_eq!(s.summary_words, 250);
        assert_eq!(s.lang, "en");
    }

    #[test]
    fn test_gemini_key_lookup_order() {
        let s = Settings::resolve(
            &cli(&[]),
            &Config::default(),
            env_of(&[("GENAI_API_KEY", "second"), ("GOOGLE_API_KEY", "first")]),
        );
        let llm = s.llm.unwrap();
        assert_eq!(llm.provider, Provider::Gemini);

        let s = Settings::resolve(&cli(&[]), &Config::default(), env_of(&[("GENAI_API_KEY", "only")]));
        assert!(s.llm.is_some());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let s = Settings::resolve(&cli(&[]), &Config::default(), env_of(&[("GOOGLE_API_KEY", "  ")]));
        assert!(s.llm.is_none());
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            model: Some("gpt-4o-mini".to_string()),
            whisper_model: Some("tiny".to_string()),
            ..Config::default()
        };

        let s = Settings::resolve(&cli(&[]), &config, env_of(&[("WHISPER_MODEL", "medium")]));
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.speech.model, "medium");

        let s = Settings::resolve(
            &cli(&["--model", "claude-sonnet-4-6", "--whisper-model", "large"]),
            &config,
            env_of(&[("GENAI_MODEL", "gemini-2.0-flash"), ("ANTHROPIC_API_KEY", "k")]),
        );
        assert_eq!(s.model, "claude-sonnet-4-6");
        assert_eq!(s.speech.model, "large");
        assert_eq!(s.llm.unwrap().provider, Provider::Anthropic);
    }
}
