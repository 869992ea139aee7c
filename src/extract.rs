use eyre::{Result, WrapErr, bail};
use log::{debug, info};

use crate::config::Settings;
use crate::progress::{spinner, with_spinner};
use crate::{Transcript, extract_video_id, whisper, youtube};

/// Get a transcript for `url`: the published transcript if there is one,
/// otherwise download the audio and run speech-to-text on it.
pub async fn extract(client: &reqwest::Client, url: &str, settings: &Settings) -> Result<Transcript> {
    let video_id = extract_video_id(url);

    match &video_id {
        Some(id) => {
            let fetched = with_spinner(
                "Extracting transcript…",
                youtube::fetch_captions(client, id, &settings.lang),
            )
            .await;
            match fetched {
                Ok(t) if !t.is_empty() => return Ok(t),
                Ok(_) => info!("Transcript service returned an empty transcript for {id}"),
                Err(e) => info!("Transcript service failed for {id}: {e:#}"),
            }
        }
        None => info!("No video ID in {url}; skipping transcript service"),
    }

    if settings.no_fallback {
        bail!("no published transcript and --no-fallback set");
    }

    eprintln!("No transcript available. Falling back to Whisper — this may take a bit…");
    transcribe_audio(client, url, video_id.as_deref().unwrap_or_default(), settings).await
}

async fn transcribe_audio(
    client: &reqwest::Client,
    url: &str,
    video_id: &str,
    settings: &Settings,
) -> Result<Transcript> {
    if !settings.tools.ytdlp_available() {
        bail!("yt-dlp not installed; audio fallback disabled");
    }
    if !settings.speech.available() {
        bail!("speech-to-text backend {:?} unavailable; audio fallback disabled", settings.speech.backend);
    }
    if !settings.tools.ffmpeg_available() {
        bail!("FFmpeg not installed.");
    }

    let pb = spinner("Downloading audio…");
    let downloaded = settings.tools.download(url, Some(settings.cookies_file.as_path()));
    pb.finish_and_clear();
    let track = downloaded?;

    let transcript = with_spinner(
        "Transcribing…",
        whisper::transcribe(client, &track, video_id, &settings.speech),
    )
    .await
    .wrap_err("Whisper failed")?;

    debug!(
        "Transcribed {} segments, language {}",
        transcript.segments.len(),
        transcript.language
    );

    require_speech(transcript)
}

fn require_speech(transcript: Transcript) -> Result<Transcript> {
    if transcript.is_empty() {
        bail!("Whisper produced an empty transcript");
    }
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;
    use crate::config::Config;
    use crate::{Segment, TranscriptSource};

    const NO_VIDEO: &str = "https://example.com/a/b";

    fn settings_with(config: Config) -> Settings {
        Settings::resolve(&Cli::parse_from(["ytnotes"]), &config, |_| None)
    }

    #[tokio::test]
    async fn test_no_fallback_without_video_id() {
        let cli = Cli::parse_from(["ytnotes", "--no-fallback"]);
        let settings = Settings::resolve(&cli, &Config::default(), |_| None);
        let client = reqwest::Client::new();

        let err = extract(&client, "https://example.com/a/b", &settings).await.unwrap_err();
        assert!(err.to_string().contains("--no-fallback"));
    }

    #[tokio::test]
    async fn test_missing_ytdlp_disables_fallback() {
        let settings = settings_with(Config {
            ytdlp_bin: Some("/nonexistent/yt-dlp".to_string()),
            ..Config::default()
        });
        let client = reqwest::Client::new();

        let err = extract(&client, NO_VIDEO, &settings).await.unwrap_err();
        assert!(err.to_string().contains("yt-dlp not installed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_speech_backend_disables_fallback() {
        let settings = settings_with(Config {
            ytdlp_bin: Some("true".to_string()),
            whisper_bin: Some("/nonexistent/whisper".to_string()),
            ..Config::default()
        });
        let client = reqwest::Client::new();

        let err = extract(&client, NO_VIDEO, &settings).await.unwrap_err();
        assert!(err.to_string().contains("audio fallback disabled"));
        assert!(err.to_string().contains("Local"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_ffmpeg() {
        let settings = settings_with(Config {
            ytdlp_bin: Some("true".to_string()),
            whisper_bin: Some("true".to_string()),
            ffmpeg_bin: Some("/nonexistent/ffmpeg".to_string()),
            ..Config::default()
        });
        let client = reqwest::Client::new();

        let err = extract(&client, NO_VIDEO, &settings).await.unwrap_err();
        assert_eq!(err.to_string(), "FFmpeg not installed.");
    }

    #[test]
    fn test_silent_audio_is_a_failure() {
        let silent = Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "unknown".to_string(),
            source: TranscriptSource::Whisper,
            segments: vec![],
        };
        assert!(require_speech(silent).is_err());

        let spoken = Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "hi".to_string(),
            source: TranscriptSource::Whisper,
            segments: vec![Segment {
                text: "namaste".to_string(),
                start: 0.0,
                duration: 1.2,
            }],
        };
        assert_eq!(require_speech(spoken).unwrap().text(), "namaste");
    }
}
