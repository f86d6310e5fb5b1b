//! Incremental writer for ncdu export documents
//!
//! `NcduWriter` streams the document as events arrive: nothing but the
//! element currently being serialized is held in memory, so arbitrarily
//! large trees pass through in O(depth) space.

use std::io::{self, Write};

use crate::tree::TreeOutput;

use super::format::{DirInfo, FORMAT_MAJOR, FORMAT_MINOR, FileInfo, Metadata, display_name};

/// Streaming ncdu document writer.
///
/// The root directory is opened on construction. Every directory still open
/// when the writer goes away is closed, either by [`NcduWriter::finish`] or,
/// if that is never reached, by `Drop`, so the sink always ends up holding a
/// balanced document.
pub struct NcduWriter<W: Write> {
    sink: Option<W>,
    depth: usize,
    /// Set once a write fails; nothing more is written afterwards.
    poisoned: bool,
}

impl<W: Write> NcduWriter<W> {
    /// Write the format header and open the root directory.
    pub fn new(sink: W, root_name: &str, metadata: &Metadata) -> io::Result<Self> {
        let mut writer = Self {
            sink: Some(sink),
            depth: 0,
            poisoned: false,
        };
        writer.emit(|out| {
            write!(out, "[{},{},", FORMAT_MAJOR, FORMAT_MINOR)?;
            serde_json::to_writer(&mut *out, metadata)?;
            Ok(())
        })?;
        writer.enter_directory(root_name)?;
        Ok(writer)
    }

    /// Number of directories currently open, the root included.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Open a directory inside the current one. An empty name is written as
    /// [`EMPTY_NAME`](super::EMPTY_NAME).
    pub fn enter_directory(&mut self, name: &str) -> io::Result<()> {
        let name = display_name(name);
        self.emit(|out| {
            out.write_all(b",\n[")?;
            serde_json::to_writer(&mut *out, &DirInfo { name })?;
            Ok(())
        })?;
        self.depth += 1;
        Ok(())
    }

    /// Close the innermost open directory. Does nothing at depth 0.
    pub fn leave_directory(&mut self) -> io::Result<()> {
        if self.depth == 0 {
            return Ok(());
        }
        self.emit(|out| out.write_all(b"]"))?;
        self.depth -= 1;
        Ok(())
    }

    /// Record a file of `size` bytes in the current directory.
    pub fn file_entry(&mut self, name: &str, size: u64) -> io::Result<()> {
        let name = display_name(name);
        self.emit(|out| {
            out.write_all(b",\n")?;
            serde_json::to_writer(&mut *out, &FileInfo { name, dsize: size })?;
            Ok(())
        })
    }

    /// Close all open directories, terminate the document and return the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.close_all()?;
        self.sink.take().ok_or_else(closed_error)
    }

    fn close_all(&mut self) -> io::Result<()> {
        while self.depth > 0 {
            self.leave_directory()?;
        }
        self.emit(|out| {
            out.write_all(b"]")?;
            out.flush()
        })
    }

    fn emit<F>(&mut self, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.poisoned {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "output failed earlier; refusing to write",
            ));
        }
        let sink = self.sink.as_mut().ok_or_else(closed_error)?;
        let result = write(sink);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }
}

fn closed_error() -> io::Error {
    io::Error::other("ncdu writer already finished")
}

impl<W: Write> Drop for NcduWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() && !self.poisoned {
            if let Err(e) = self.close_all() {
                tracing::warn!(error = %e, "failed to close ncdu document");
            }
        }
    }
}

impl<W: Write> TreeOutput for NcduWriter<W> {
    fn enter_directory(&mut self, name: &str) -> io::Result<()> {
        NcduWriter::enter_directory(self, name)
    }

    fn leave_directory(&mut self) -> io::Result<()> {
        NcduWriter::leave_directory(self)
    }

    fn file_entry(&mut self, name: &str, size: u64) -> io::Result<()> {
        NcduWriter::file_entry(self, name, size)
    }
}
