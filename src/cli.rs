use clap::Parser;
use std::path::PathBuf;

use crate::whisper::SpeechBackend;

#[derive(Parser, Debug)]
#[command(
    name = "ytnotes",
    about = "YouTube video to English notes, with Q&A about its content",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube / Shorts URL or video ID (prompted on stdin if omitted)
    pub url: Option<String>,

    /// Ask a question about the video (repeatable)
    #[arg(short, long = "question", value_name = "QUESTION")]
    pub questions: Vec<String>,

    /// Keep asking questions interactively after the summary
    #[arg(short, long)]
    pub interactive: bool,

    /// Directory for summary.txt and transcript.txt
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// LLM model for summary and Q&A [default: gemini-1.5-flash-001]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Local Whisper model size (tiny, base, small, medium, large) [default: base]
    #[arg(long, value_name = "SIZE")]
    pub whisper_model: Option<String>,

    /// Speech-to-text backend for the audio fallback
    #[arg(long, value_enum)]
    pub stt: Option<SpeechBackend>,

    /// Cookies file handed to yt-dlp [default: cookies.txt]
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Preferred caption language [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Don't fall back to audio transcription if no transcript is published
    #[arg(long)]
    pub no_fallback: bool,

    /// Show extraction method and metadata
    #[arg(short, long)]
    pub verbose: bool,
}
