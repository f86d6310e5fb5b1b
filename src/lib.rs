//! ncdu-bos - export an object storage bucket listing as an ncdu data file

pub mod error;
pub mod export;
pub mod logging;
pub mod ncdu;
pub mod source;
pub mod summary;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Error, SourceError};
pub use export::{ExportConfig, ExportSummary, export, export_with_metadata};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use ncdu::{EMPTY_NAME, Metadata, NcduWriter};
pub use source::{
    BosClient, BosConfig, Credentials, ListObjects, Listing, ManifestSource, ObjectEntry,
    ObjectPage,
};
pub use summary::{format_size, print_summary};
pub use tree::{OrderCheck, PathWalker, TreeOutput, WalkStats, WalkerConfig};
