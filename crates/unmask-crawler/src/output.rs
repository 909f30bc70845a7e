//! Newline-delimited address file.

use crate::error::{CrawlError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use unmask_core::EmailSet;

/// Destination for the final address list.
///
/// The file is created (and truncated) when the sink is opened, so an
/// unwritable path fails before any crawling starts.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl OutputSink {
    /// Create or truncate the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| CrawlError::Output {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one address per line and flush. Returns the number written.
    pub fn write_all(&mut self, emails: &EmailSet) -> Result<usize> {
        let mut written = 0;
        for address in emails {
            writeln!(self.writer, "{address}").map_err(|e| self.io_error(e))?;
            written += 1;
        }
        self.writer.flush().map_err(|e| self.io_error(e))?;

        tracing::info!(path = %self.path.display(), written, "wrote addresses");
        Ok(written)
    }

    fn io_error(&self, source: std::io::Error) -> CrawlError {
        CrawlError::Output {
            path: self.path.clone(),
            source,
        }
    }
}
