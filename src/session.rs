use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;

use crate::output::{self, PREVIEW_CHARS, SUMMARY_FILE, TRANSCRIPT_FILE};
use crate::{Transcript, TranscriptSource};

/// Everything produced for one video during a run
#[derive(Debug, Clone)]
pub struct Session {
    pub language: String,
    pub source: TranscriptSource,
    pub transcript: String,
    pub summary: String,
}

impl Session {
    pub fn new(transcript: &Transcript, summary: String) -> Self {
        Self {
            language: transcript.language.clone(),
            source: transcript.source,
            transcript: transcript.text(),
            summary,
        }
    }

    pub fn transcript_preview(&self) -> String {
        output::preview(&self.transcript, PREVIEW_CHARS)
    }

    /// Write `summary.txt` and `transcript.txt` into `dir`
    pub fn save(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir).wrap_err_with(|| format!("could not create {}", dir.display()))?;

        let summary_path = dir.join(SUMMARY_FILE);
        let transcript_path = dir.join(TRANSCRIPT_FILE);
        std::fs::write(&summary_path, &self.summary)?;
        std::fs::write(&transcript_path, &self.transcript)?;

        debug!("Saved {} and {}", summary_path.display(), transcript_path.display());
        Ok((summary_path, transcript_path))
    }
}
