//! Run-scoped journal.
//!
//! A [`RunJournal`] is created once per invocation and handed to every
//! collection run. Each note is mirrored to `tracing` immediately and kept in
//! memory; [`RunJournal::flush`] appends the whole run to the day's log file
//! so several runs on the same day accumulate in one file.
//!
//! ```text
//! log_dir/
//! └── 2025/
//!     └── 05/
//!         └── 2025-05-06_run.log
//! ```

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLevel {
    Info,
    Warn,
}

#[derive(Debug, Default)]
pub struct RunJournal {
    lines: Mutex<Vec<String>>,
}

impl RunJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&self, message: impl AsRef<str>) {
        self.record(NoteLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(NoteLevel::Warn, message.as_ref());
    }

    fn record(&self, level: NoteLevel, message: &str) {
        match level {
            NoteLevel::Info => info!(journal = true, "{message}"),
            NoteLevel::Warn => warn!(journal = true, "{message}"),
        }
        let marker = match level {
            NoteLevel::Info => "",
            NoteLevel::Warn => "[WARN] ",
        };
        let line = format!("[{}] {marker}{message}", Local::now().format("%H:%M:%S"));
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).push(line);
    }

    /// Lines recorded so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Append every recorded line to `{log_dir}/{YYYY}/{MM}/{date}_run.log`.
    ///
    /// A run banner is written first so consecutive runs stay apart.
    #[instrument(level = "info", skip_all, fields(%log_dir, %date))]
    pub async fn flush(&self, log_dir: &str, date: NaiveDate) -> Result<PathBuf, Box<dyn Error>> {
        let path = log_path(log_dir, date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut text = format!("===== run started {} =====\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
        for line in self.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');

        let mut file = fs::OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(text.as_bytes()).await?;
        info!(path = %path.display(), "Flushed run journal");
        Ok(path)
    }
}

pub fn log_path(log_dir: &str, date: NaiveDate) -> PathBuf {
    Path::new(log_dir)
        .join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(format!("{}_run.log", date.format("%Y-%m-%d")))
}
