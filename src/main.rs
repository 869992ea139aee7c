use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Command;

use eyre::{Result, WrapErr, bail};
use log::{debug, info, warn};

use ytnotes::audio::{DEFAULT_FFMPEG_BIN, DEFAULT_YTDLP_BIN};
use ytnotes::cli::Cli;
use ytnotes::config::{Config, DEFAULT_WHISPER_BIN, Settings};
use ytnotes::progress::with_spinner;
use ytnotes::session::Session;
use ytnotes::{extract, qa, summarize, thumbnail};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytnotes.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytnotes")
        .join("logs")
}

fn tool_version(name: &str, flag: &str) -> Option<String> {
    Command::new(name)
        .arg(flag)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn tool_line(name: &str, found: Option<String>, purpose: &str) -> String {
    match found {
        Some(v) => format!("  \x1b[32m✅\x1b[0m {name:<9} {v}"),
        None => format!("  \x1b[31m❌\x1b[0m {name:<9} (not found — {purpose})"),
    }
}

fn build_after_help() -> String {
    let tools = [
        tool_line("yt-dlp", tool_version(DEFAULT_YTDLP_BIN, "--version"), "needed for the audio fallback"),
        tool_line("ffmpeg", tool_version(DEFAULT_FFMPEG_BIN, "-version"), "needed for the audio fallback"),
        tool_line(
            "whisper",
            tool_version(DEFAULT_WHISPER_BIN, "--help").map(|_| "installed".to_string()),
            "needed for local transcription",
        ),
    ];

    format!(
        "\nOPTIONAL TOOLS:\n{}\n\nConfig is read from: {}\nLogs are written to: {}",
        tools.join("\n"),
        ytnotes::config::config_path().display(),
        log_dir().join("ytnotes.log").display()
    )
}

fn read_line(prompt: &str) -> Result<Option<String>> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn ask(client: &reqwest::Client, settings: &Settings, session: &Session, question: &str) {
    let answer = with_spinner(
        "Thinking...",
        qa::answer_question(client, settings.llm.as_ref(), &session.transcript, question),
    )
    .await;
    println!("\nAnswer:\n{answer}");
}

async fn interactive(client: &reqwest::Client, settings: &Settings, session: &Session) -> Result<()> {
    eprintln!("\n## Q&A about this video (empty line re-prompts, `exit` or Ctrl-D to quit)");
    while let Some(question) = read_line("\nAsk a question about this video's content: ")? {
        match question.as_str() {
            "" => eprintln!("Please type a question."),
            "exit" | "quit" => break,
            q => ask(client, settings, session, q).await,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    setup_logging()?;
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {e}"),
    }

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring invalid config {}: {e}", ytnotes::config::config_path().display());
        Config::default()
    });
    let settings = Settings::resolve(&cli, &config, |name| std::env::var(name).ok());

    if cli.verbose {
        let config_path = ytnotes::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        match &settings.llm {
            Some(llm) => eprintln!("Model: {} ({})", llm.model, llm.provider),
            None => eprintln!("Model: {} (no API key, local summarizer only)", settings.model),
        }
        eprintln!("Speech-to-text: {:?} ({})", settings.speech.backend, settings.speech.model);
    }

    let url = match cli.url.clone() {
        Some(url) => url,
        None => read_line("Paste YouTube / Shorts link: ")?.unwrap_or_default(),
    };
    let url = url.trim();
    if url.is_empty() {
        bail!("Please enter a link.");
    }

    let client = reqwest::Client::new();

    if let Some(video_id) = ytnotes::extract_video_id(url) {
        debug!("Video ID: {video_id}");
        if let Some(thumb) = thumbnail::resolve(&client, &video_id).await {
            println!("Thumbnail: {thumb}");
        }
    }

    let transcript = extract::extract(&client, url, &settings)
        .await
        .wrap_err("Could not extract transcript or audio.")?;

    let summary = with_spinner(
        "Summarizing…",
        summarize::generate_summary(&client, settings.llm.as_ref(), &transcript.text(), settings.summary_words),
    )
    .await;
    if let Some(reason) = &summary.fallback_reason {
        eprintln!("LLM failed → using local summarizer. ({reason})");
    }

    let session = Session::new(&transcript, summary.text);
    eprintln!("✅ Transcript extracted — Detected language: {}", session.language);
    if cli.verbose {
        eprintln!(
            "Video: {}\nSource: {}\nSegments: {}",
            transcript.video_id,
            session.source,
            transcript.segments.len()
        );
    }

    println!("\n## Summary\n\n{}", session.summary);
    println!("\n## Transcript (preview)\n\n{}", session.transcript_preview());

    let (summary_path, transcript_path) = session.save(&settings.output_dir)?;
    println!(
        "\nSaved:\n  {}\n  {}",
        summary_path.display(),
        transcript_path.display()
    );

    for question in &cli.questions {
        println!("\nQuestion: {question}");
        ask(&client, &settings, &session, question).await;
    }

    if cli.interactive {
        interactive(&client, &settings, &session).await?;
    }

    Ok(())
}
