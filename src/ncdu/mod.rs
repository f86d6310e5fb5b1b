//! ncdu export format
//!
//! The document produced here is what `ncdu -o` writes and `ncdu -f` reads:
//!
//! ```text
//! [1, 0, {"progname": .., "progver": .., "timestamp": ..},
//!   [{"name": "root"},
//!     {"name": "file", "dsize": 12},
//!     [{"name": "dir"}, ...]]]
//! ```

mod format;
mod writer;

pub use format::{EMPTY_NAME, FORMAT_MAJOR, FORMAT_MINOR, Metadata, display_name};
pub use writer::NcduWriter;
