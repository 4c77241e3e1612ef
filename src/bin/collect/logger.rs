use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use item_collect::execute::MoveOutcome;
use item_collect::repository::JournalEntry;

use crate::config::Config;

/// Buffered run log for collect operations
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/item-collect/collect_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::in_dir(&home_dir.join("logs").join("item-collect"))
    }

    fn in_dir(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let path = log_dir.join(format!("collect_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, root: &Path, config: &Config) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), root.display());
        let _ = writeln!(
            self.writer,
            "  destination: {}",
            config.destination.as_deref().unwrap_or("<root>")
        );
        let _ = writeln!(self.writer, "  names: {}", config.names.len());
        if let Some(file) = &config.names_file {
            let _ = writeln!(self.writer, "  names_file: {}", file.display());
        }
        let _ = writeln!(self.writer, "  case_insensitive: {}", config.case_insensitive);
        let _ = writeln!(self.writer, "  keep_extensions: {}", config.keep_extensions);
        let _ = writeln!(self.writer, "  full_name: {}", config.full_name);
        let _ = writeln!(self.writer, "  create: {}", config.create);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = self.writer.flush();
    }

    /// Log a single file move
    pub(crate) fn log_move(&mut self, entry: &JournalEntry) {
        let _ = writeln!(
            self.writer,
            "[{}] MOVE    \"{}\" -> \"{}\"",
            Self::timestamp(),
            entry.from.display(),
            entry.to.display()
        );
    }

    /// Log an item that could not be moved
    pub(crate) fn log_failure(&mut self, name: &str, reason: &str) {
        let _ = writeln!(self.writer, "[{}] ERROR   \"{name}\" | {reason}", Self::timestamp());
    }

    /// Log when the user declined the move
    pub(crate) fn log_cancelled(&mut self) {
        let _ = writeln!(self.writer, "[{}] CANCELLED", Self::timestamp());
        let _ = self.writer.flush();
    }

    /// Log final summary
    pub(crate) fn log_summary(&mut self, outcome: &MoveOutcome) {
        let plan = &outcome.plan;
        let _ = writeln!(self.writer, "[{}] SUMMARY", Self::timestamp());
        let _ = writeln!(self.writer, "  Destination:    {}", outcome.destination.label);
        let _ = writeln!(self.writer, "  Names entered:  {}", plan.names_entered);
        let _ = writeln!(self.writer, "  Matched items:  {}", plan.matched.len());
        let _ = writeln!(self.writer, "  Moved:          {}", outcome.moved_count());
        let _ = writeln!(self.writer, "  Already there:  {}", plan.already_at_destination.len());
        let _ = writeln!(self.writer, "  Failed:         {}", outcome.failures.len());
        let _ = writeln!(self.writer, "  Not found:      {}", plan.not_found.len());
        if let Some(error) = &outcome.error {
            let _ = writeln!(self.writer, "  Stopped early:  {error}");
        }
        let _ = self.writer.flush();
    }
}
