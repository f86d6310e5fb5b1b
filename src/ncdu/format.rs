//! Serializable pieces of the ncdu export format

use chrono::Utc;
use serde::Serialize;

/// Major version of the ncdu export format.
pub const FORMAT_MAJOR: u32 = 1;
/// Minor version of the ncdu export format.
pub const FORMAT_MINOR: u32 = 0;

/// Placeholder written for empty path segments; ncdu rejects empty names.
pub const EMPTY_NAME: &str = "<empty>";

/// Metadata object that follows the version pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub progname: String,
    pub progver: String,
    /// Generation time in unix seconds.
    pub timestamp: i64,
}

impl Metadata {
    /// Metadata stamped with the current time.
    pub fn new(progname: impl Into<String>, progver: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
            progver: progver.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Head element of a directory array.
#[derive(Debug, Serialize)]
pub(crate) struct DirInfo<'a> {
    pub name: &'a str,
}

/// A file entry inside a directory array.
#[derive(Debug, Serialize)]
pub(crate) struct FileInfo<'a> {
    pub name: &'a str,
    pub dsize: u64,
}

/// Substitute the placeholder for an empty segment.
pub fn display_name(segment: &str) -> &str {
    if segment.is_empty() { EMPTY_NAME } else { segment }
}
