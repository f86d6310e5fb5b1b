//! PathWalker - rebuilds a directory tree from a sorted key listing

use serde::Serialize;
use tracing::{trace, warn};

use crate::error::{Error, Result, SourceError};
use crate::ncdu::display_name;
use crate::source::ObjectEntry;

use super::config::{OrderCheck, WalkerConfig};
use super::path::{common_prefix_len, same_dir, split_key};

/// Callback for tree output - receives directory transitions and files.
pub trait TreeOutput {
    fn enter_directory(&mut self, name: &str) -> std::io::Result<()>;

    fn leave_directory(&mut self) -> std::io::Result<()>;

    fn file_entry(&mut self, name: &str, size: u64) -> std::io::Result<()>;
}

/// Counters accumulated over one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Keys consumed from the listing
    pub objects: u64,
    pub files: u64,
    /// Directories opened, the synthesized root excluded
    pub directories: u64,
    /// Keys ending in `/` that only create a directory
    pub markers: u64,
    pub bytes: u64,
}

/// Streaming walker that turns sorted keys into enter/leave/file events.
///
/// Only the directory path of the previous key is retained, so memory use is
/// O(depth) no matter how many keys pass through. Each key produces exactly
/// the leaves and enters needed to move from the previous key's directory
/// to its own.
pub struct PathWalker {
    config: WalkerConfig,
    /// Directory segments of the last processed key, relative to the root.
    current: Vec<String>,
    last_key: Option<String>,
    stats: WalkStats,
}

impl PathWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            current: Vec::new(),
            last_key: None,
            stats: WalkStats::default(),
        }
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Drain a listing into `output`, stopping at the first error.
    pub fn walk<I, O>(&mut self, entries: I, output: &mut O) -> Result<WalkStats>
    where
        I: IntoIterator<Item = std::result::Result<ObjectEntry, SourceError>>,
        O: TreeOutput,
    {
        for entry in entries {
            let entry = entry?;
            self.process_item(output, &entry.key, entry.size)?;
        }
        Ok(self.stats)
    }

    /// Emit the events for one key.
    pub fn process_item<O: TreeOutput>(
        &mut self,
        output: &mut O,
        key: &str,
        size: u64,
    ) -> Result<()> {
        self.check_order(key)?;

        let (dirs, file_name) = split_key(key);

        if !same_dir(&self.current, &dirs) {
            let common = common_prefix_len(&self.current, &dirs);
            trace!(
                key,
                leave = self.current.len() - common,
                enter = dirs.len() - common,
                "directory transition"
            );

            // current shrinks in step with the writer so both agree on depth
            // even when a write fails halfway
            while self.current.len() > common {
                output.leave_directory()?;
                self.current.pop();
            }
            for segment in &dirs[common..] {
                output.enter_directory(display_name(segment))?;
                self.current.push((*segment).to_string());
                self.stats.directories += 1;
            }
        }

        self.stats.objects += 1;
        if file_name.is_empty() {
            self.stats.markers += 1;
        } else {
            output.file_entry(file_name, size)?;
            self.stats.files += 1;
            self.stats.bytes += size;
        }
        Ok(())
    }

    fn check_order(&mut self, key: &str) -> Result<()> {
        if self.config.order_check == OrderCheck::Trust {
            return Ok(());
        }

        if let Some(previous) = self.last_key.as_deref() {
            if key < previous {
                match self.config.order_check {
                    OrderCheck::Strict => {
                        return Err(Error::Unordered {
                            previous: previous.to_string(),
                            current: key.to_string(),
                        });
                    }
                    OrderCheck::Warn => {
                        warn!(previous, current = key, "listing is not sorted");
                    }
                    OrderCheck::Trust => {}
                }
            }
        }

        match self.last_key.as_mut() {
            Some(last) => {
                last.clear();
                last.push_str(key);
            }
            None => self.last_key = Some(key.to_string()),
        }
        Ok(())
    }
}

impl Default for PathWalker {
    fn default() -> Self {
        Self::new(WalkerConfig::default())
    }
}
