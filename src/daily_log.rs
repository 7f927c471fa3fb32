//! Human-readable daily log files.
//!
//! One markdown file per calendar date under the workspace `memory/`
//! directory, appended to as memories are stored.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};

use crate::errors::Error;

/// Heading label for memories stored by hand.
pub const KIND_MANUAL: &str = "Manual Memory";

/// One log entry.
#[derive(Debug, Clone)]
pub struct LogEntry<'a> {
    pub time: NaiveTime,
    pub kind: &'a str,
    pub text: &'a str,
}

impl LogEntry<'_> {
    fn render(&self) -> String {
        format!("\n## {} - {}\n{}\n", self.time.format("%H:%M"), self.kind, self.text)
    }
}

/// Append-only writer for `<dir>/YYYY-MM-DD.md` files.
#[derive(Debug, Clone)]
pub struct DailyLog {
    dir: PathBuf,
}

impl DailyLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    /// Append `entry` to the file for `date`, creating it if needed.
    ///
    /// The rendered entry goes out in a single `write_all` on an append-mode
    /// handle, so entries from concurrent writers do not interleave.
    pub fn append(&self, date: NaiveDate, entry: &LogEntry<'_>) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(entry.render().as_bytes())?;

        tracing::debug!(path = %path.display(), kind = entry.kind, "Daily log entry appended");
        Ok(path)
    }
}
