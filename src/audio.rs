use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use eyre::{Result, bail, eyre};
use log::debug;
use tempfile::TempDir;

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "webm", "wav", "ogg"];

/// Downloaded audio track; the backing temp directory is removed on drop
#[derive(Debug)]
pub struct AudioFile {
    dir: TempDir,
    path: PathBuf,
}

impl AudioFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Whether an external tool answers to its version flag
pub fn tool_available(name: &str, version_flag: &str) -> bool {
    Command::new(name)
        .arg(version_flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub const DEFAULT_YTDLP_BIN: &str = "yt-dlp";
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// External programs used by the audio fallback
#[derive(Debug, Clone)]
pub struct Tools {
    pub ytdlp: String,
    pub ffmpeg: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ytdlp: DEFAULT_YTDLP_BIN.to_string(),
            ffmpeg: DEFAULT_FFMPEG_BIN.to_string(),
        }
    }
}

impl Tools {
    pub fn ffmpeg_available(&self) -> bool {
        tool_available(&self.ffmpeg, "-version")
    }

    pub fn ytdlp_available(&self) -> bool {
        tool_available(&self.ytdlp, "--version")
    }

    /// Download the best audio stream of `url` as mp3 via yt-dlp
    pub fn download(&self, url: &str, cookies: Option<&Path>) -> Result<AudioFile> {
        download_with(&self.ytdlp, url, cookies)
    }
}

fn download_with(ytdlp: &str, url: &str, cookies: Option<&Path>) -> Result<AudioFile> {
    let dir = tempfile::Builder::new().prefix("ytnotes_").tempdir()?;
    let template = dir.path().join("audio.%(ext)s");
    let args = ytdlp_args(url, &template, cookies);

    debug!("Downloading audio via yt-dlp: {url}");

    let output = Command::new(ytdlp).args(&args).output();
    match output {
        Ok(o) if o.status.success() => {}
        Ok(o) => {
            let stderr = String::from_utf8_lossy(&o.stderr);
            bail!("{ytdlp} exited with status {}: {}", o.status, stderr.trim());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("{ytdlp} not found. Install yt-dlp to enable the Whisper fallback:\n  pip install yt-dlp");
        }
        Err(e) => bail!("failed to run {ytdlp}: {e}"),
    }

    let path = find_audio(dir.path())?.ok_or_else(|| eyre!("audio download failed"))?;
    debug!("Audio downloaded to {}", path.display());
    Ok(AudioFile { dir, path })
}

fn ytdlp_args(url: &str, template: &Path, cookies: Option<&Path>) -> Vec<String> {
    let mut args: Vec<String> = [
        "--format",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "192K",
        "--no-playlist",
        "--quiet",
        "--no-warnings",
        "-o",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(template.to_string_lossy().to_string());

    if let Some(cookies) = cookies.filter(|p| p.exists()) {
        args.push("--cookies".to_string());
        args.push(cookies.to_string_lossy().to_string());
    }

    args.push(url.to_string());
    args
}

fn find_audio(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    Ok(entries.into_iter().find(|p| {
        p.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }))
}
