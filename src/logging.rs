//! Conversation logging persistence layer
//!
//! Provides file-based logging of chat turns without blocking the UI thread.
//! Logs are stored in XDG_DATA_HOME/flowchat/logs/ as one file per day:
//! logs/YYYY-MM-DD.log

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// A log entry to be written to disk
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub role: String,
    pub message: String,
}

/// Logger manages file-based conversation logging on a background thread
pub struct Logger {
    tx: Sender<LogEntry>,
}

impl Logger {
    /// Create a new logger and spawn the background thread for async I/O
    pub fn new() -> Result<Self, String> {
        let log_dir = get_log_directory()?;

        fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let (tx, rx) = unbounded::<LogEntry>();

        let log_dir_clone = log_dir.clone();
        thread::spawn(move || {
            run_logger_thread(rx, log_dir_clone);
        });

        Ok(Self { tx })
    }

    /// Log a turn (non-blocking, queued for background writing)
    pub fn log(&self, entry: LogEntry) {
        // If send fails, the logger thread has stopped - silently ignore
        let _ = self.tx.send(entry);
    }
}

/// Background thread that handles all file I/O
fn run_logger_thread(rx: Receiver<LogEntry>, log_dir: PathBuf) {
    let mut current: Option<(String, BufWriter<File>)> = None;

    while let Ok(entry) = rx.recv() {
        if let Err(e) = write_log_entry(&mut current, &log_dir, &entry) {
            eprintln!("Logger error: {}", e);
        }
    }

    if let Some((_, mut writer)) = current.take() {
        let _ = writer.flush();
    }
}

/// Write a single log entry to today's file, rolling the handle at midnight
fn write_log_entry(
    current: &mut Option<(String, BufWriter<File>)>,
    log_dir: &std::path::Path,
    entry: &LogEntry,
) -> Result<(), String> {
    let date = Local::now().format("%Y-%m-%d").to_string();

    let needs_open = match current {
        Some((open_date, _)) => *open_date != date,
        None => true,
    };
    if needs_open {
        let path = log_dir.join(format!("{}.log", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;
        *current = Some((date, BufWriter::new(file)));
    }

    // Invariant: `current` was just populated above
    let (_, writer) = current.as_mut().expect("log writer should be open");

    // Format: [HH:MM AM/PM] <role> message (newlines flattened)
    let flat = entry.message.replace('\n', " ");
    writeln!(writer, "[{}] <{}> {}", entry.timestamp, entry.role, flat)
        .map_err(|e| format!("Failed to write log entry: {}", e))?;

    writer
        .flush()
        .map_err(|e| format!("Failed to flush log: {}", e))?;

    Ok(())
}

/// Get the platform-specific log directory using XDG conventions
fn get_log_directory() -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new()
        .ok_or("Failed to determine home directory")?;

    let data_dir = base.data_dir();
    Ok(data_dir.join("flowchat").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_exists() {
        let result = get_log_directory();
        assert!(result.is_ok());
        let path = result.unwrap();
        assert!(path.to_string_lossy().contains("flowchat"));
    }

    #[test]
    fn test_logger_accepts_entries_after_creation() {
        if let Ok(logger) = Logger::new() {
            logger.log(LogEntry {
                timestamp: "12:00 PM".into(),
                role: "user".into(),
                message: "hello\nworld".into(),
            });
        }
    }
}
