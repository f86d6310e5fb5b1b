//! Offline listing read from a JSON-lines manifest
//!
//! Each non-blank line holds one object: `{"key": "a/b.txt", "size": 12}`.
//! Lines must already be in listing order.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::SourceError;

use super::ObjectEntry;

/// Streams entries from a JSON-lines manifest.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 is
/// reported as a bad entry on that line rather than as a read failure.
pub struct ManifestSource<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    failed: bool,
}

impl<R: BufRead> ManifestSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            failed: false,
        }
    }
}

impl ManifestSource<Box<dyn BufRead>> {
    /// Open a manifest file, or standard input for `-`.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let reader: Box<dyn BufRead> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            Box::new(BufReader::new(File::open(path)?))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> Iterator for ManifestSource<R> {
    type Item = Result<ObjectEntry, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(SourceError::Io(e)));
                }
            }
            self.line += 1;
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(serde_json::from_slice(&self.buf).map_err(|source| {
                self.failed = true;
                SourceError::Manifest {
                    line: self.line,
                    source,
                }
            }));
        }
    }
}
