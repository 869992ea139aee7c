use std::path::{Path, PathBuf};
use std::process::Command;

use eyre::{Result, WrapErr, bail, eyre};
use log::debug;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::audio::{self, AudioFile};
use crate::{Segment, Transcript, TranscriptSource};

/// Maximum file size for a single hosted transcription upload (25 MB)
const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

const HOSTED_MODEL: &str = "whisper-1";

/// Where speech-to-text runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Local `whisper` CLI
    #[default]
    Local,
    /// OpenAI hosted transcription API
    #[value(name = "openai")]
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub backend: SpeechBackend,
    /// Model size for the local backend (tiny, base, small, medium, large)
    pub model: String,
    pub binary: String,
    pub openai_key: Option<String>,
}

impl SpeechConfig {
    /// Whether this backend can run at all on this machine
    pub fn available(&self) -> bool {
        match self.backend {
            SpeechBackend::Local => audio::tool_available(&self.binary, "--help"),
            SpeechBackend::OpenAi => self.openai_key.is_some(),
        }
    }
}

/// Turn downloaded audio into a transcript
pub async fn transcribe(
    client: &reqwest::Client,
    audio: &AudioFile,
    video_id: &str,
    config: &SpeechConfig,
) -> Result<Transcript> {
    let (segments, language) = match config.backend {
        SpeechBackend::Local => transcribe_local(audio, config)?,
        SpeechBackend::OpenAi => {
            let key = config
                .openai_key
                .as_deref()
                .ok_or_else(|| eyre!("OPENAI_API_KEY environment variable not set (required for hosted transcription)"))?;
            transcribe_hosted(client, key, audio.path()).await?
        }
    };

    Ok(Transcript {
        video_id: video_id.to_string(),
        language: language.unwrap_or_else(|| "unknown".to_string()),
        source: TranscriptSource::Whisper,
        segments,
    })
}

fn transcribe_local(audio: &AudioFile, config: &SpeechConfig) -> Result<(Vec<Segment>, Option<String>)> {
    debug!(
        "Running {} --model {} on {}",
        config.binary,
        config.model,
        audio.path().display()
    );

    let output = Command::new(&config.binary)
        .arg(audio.path())
        .args(["--model", config.model.as_str(), "--output_format", "json", "--verbose", "False"])
        .arg("--output_dir")
        .arg(audio.dir())
        .output()
        .wrap_err_with(|| format!("failed to run {}", config.binary))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} exited with status {}: {}", config.binary, output.status, stderr.trim());
    }

    let json_path = local_output_path(audio.path(), audio.dir());
    let content = std::fs::read_to_string(&json_path)
        .wrap_err_with(|| format!("whisper produced no output at {}", json_path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)?;

    let segments = parse_whisper_response(&json)?;
    Ok((segments, detected_language(&json)))
}

fn local_output_path(audio_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
    out_dir.join(format!("{stem}.json"))
}

async fn transcribe_hosted(
    client: &reqwest::Client,
    api_key: &str,
    audio_path: &Path,
) -> Result<(Vec<Segment>, Option<String>)> {
    let file_size = std::fs::metadata(audio_path)?.len();
    debug!("Audio file size: {file_size} bytes");
    if file_size > MAX_UPLOAD_BYTES {
        bail!("audio is {file_size} bytes, over the 25 MB hosted transcription limit; use the local backend");
    }

    let file_bytes = std::fs::read(audio_path)?;
    let file_name = audio_path.file_name().unwrap_or_default().to_string_lossy().to_string();

    let file_part = multipart::Part::bytes(file_bytes)
        .file_name(file_name)
        .mime_str("audio/mpeg")?;

    let form = multipart::Form::new()
        .part("file", file_part)
        .text("model", HOSTED_MODEL)
        .text("response_format", "verbose_json")
        .text("timestamp_granularities[]", "segment");

    debug!("Uploading {} for hosted transcription", audio_path.display());
    let resp = client
        .post("https://api.openai.com/v1/audio/transcriptions")
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("transcription API returned {status}: {body}");
    }

    let json: serde_json::Value = resp.json().await?;
    Ok((parse_whisper_response(&json)?, detected_language(&json)))
}

fn detected_language(json: &serde_json::Value) -> Option<String> {
    json.get("language")
        .and_then(|l| l.as_str())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

/// Segments from either verbose (timed segments) or plain text output
pub fn parse_whisper_response(json: &serde_json::Value) -> Result<Vec<Segment>> {
    if let Some(segments) = json.get("segments").and_then(|s| s.as_array()) {
        return Ok(segments
            .iter()
            .filter_map(|seg| {
                let text = seg.get("text")?.as_str()?.trim().to_string();
                let start = seg.get("start")?.as_f64()?;
                let end = seg.get("end")?.as_f64()?;
                if text.is_empty() {
                    return None;
                }
                Some(Segment {
                    text,
                    start,
                    duration: end - start,
                })
            })
            .collect());
    }

    if let Some(text) = json.get("text").and_then(|t| t.as_str()) {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Segment {
            text: text.to_string(),
            start: 0.0,
            duration: 0.0,
        }]);
    }

    bail!("unexpected Whisper response format");
}
