//! Log writer module
//!
//! Resolves where each log stream goes: a file when a path is configured, otherwise
//! stdout for the access log and stderr for everything else.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Log output target
pub enum LogTarget {
    Stdout,
    Stderr,
    File(File),
}

impl LogTarget {
    /// File target when `path` is set, `fallback` otherwise
    pub fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(open_log_file(path)?)),
            None => Ok(fallback),
        }
    }

    /// Terminal colors only make sense on the standard streams
    pub const fn is_terminal_stream(&self) -> bool {
        !matches!(self, Self::File(_))
    }

    pub fn into_make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(io::stdout),
            Self::Stderr => BoxMakeWriter::new(io::stderr),
            Self::File(file) => BoxMakeWriter::new(Mutex::new(file)),
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
