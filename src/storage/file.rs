//! Record File
//!
//! Opens the backing file per operation: append mode for writes, read mode
//! for scans. No handle is kept between operations.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;

use super::record::{self, RECORD_SIZE};

/// Append-only file of fixed-width records
#[derive(Debug, Clone)]
pub struct RecordFile {
    /// Backing file (created on first append)
    path: PathBuf,
    /// Whether appends are fsynced
    sync_strategy: SyncStrategy,
}

impl RecordFile {
    /// Create a handle for the file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, sync_strategy: SyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync_strategy,
        }
    }

    /// Append one record
    ///
    /// Steps:
    /// 1. Encode (pad or truncate to RECORD_SIZE)
    /// 2. Open in append mode, creating the file if absent
    /// 3. Write the record, sync if configured
    pub fn append(&self, value: &str) -> Result<()> {
        if record::is_truncated(value) {
            tracing::debug!(
                "Truncating {}-byte value to {} bytes",
                value.len(),
                RECORD_SIZE
            );
        }
        let record = record::encode(value);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(&record)?;

        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }

        Ok(())
    }

    /// Scan all records for `query` (case-sensitive substring)
    ///
    /// A missing file scans as empty.
    pub fn scan<'q>(&self, query: &'q str) -> Result<Scan<'q>> {
        let reader = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Scan {
            reader,
            query,
            buffer: [0u8; RECORD_SIZE],
            interrupt: None,
            interrupted: false,
        })
    }

    /// Number of complete records in the file
    pub fn len(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() / RECORD_SIZE as u64),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the file holds no complete record
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over the records matching a query, in file order
pub struct Scan<'q> {
    /// None once the file is exhausted (or was never there)
    reader: Option<BufReader<File>>,
    query: &'q str,
    buffer: [u8; RECORD_SIZE],
    /// Polled before every record read
    interrupt: Option<Box<dyn Fn() -> bool + 'q>>,
    interrupted: bool,
}

impl<'q> Scan<'q> {
    /// End the scan early once `check` returns true.
    ///
    /// `check` runs before each record is read, so a long run of
    /// non-matching records is cut short too.
    pub fn interrupt_if<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + 'q,
    {
        self.interrupt = Some(Box::new(check));
        self
    }

    /// Whether the scan ended because the interrupt check fired
    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    fn should_stop(&mut self) -> bool {
        if self.interrupt.as_ref().is_some_and(|check| check()) {
            self.interrupted = true;
            self.reader = None;
        }
        self.interrupted
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.reader.is_none() || self.should_stop() {
                return None;
            }
            let reader = self.reader.as_mut()?;

            match read_record(reader, &mut self.buffer) {
                Ok(true) => {
                    let value = record::decode(&self.buffer);
                    if value.contains(self.query) {
                        return Some(Ok(value));
                    }
                    tracing::trace!("Record skipped for query {:?}", self.query);
                }
                Ok(false) => {
                    // Closes the file
                    self.reader = None;
                    return None;
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Fill `buffer` with the next record.
///
/// Returns false at end of file, including when only a partial record is left.
fn read_record<R: Read>(reader: &mut R, buffer: &mut [u8; RECORD_SIZE]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if filled > 0 && filled < RECORD_SIZE {
        tracing::warn!("Ignoring partial trailing record of {} bytes", filled);
    }

    Ok(filled == RECORD_SIZE)
}
