//! Object listing sources
//!
//! A source yields `(key, size)` pairs in ascending key order. Paged remote
//! listings implement [`ListObjects`] and are flattened by [`Listing`], so
//! the walker never sees page boundaries.

mod auth;
mod bos;
mod manifest;

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SourceError;

pub use auth::{Credentials, sign_request};
pub use bos::{BosClient, BosConfig, DEFAULT_MAX_KEYS};
pub use manifest::ManifestSource;

/// One object in a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

/// A single page returned by a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub entries: Vec<ObjectEntry>,
    pub is_truncated: bool,
    /// Marker to pass to the next call; absent on the last page.
    pub next_marker: Option<String>,
}

/// A paginated listing API.
pub trait ListObjects {
    /// Fetch the page that starts after `marker`, or the first page.
    fn list_page(&mut self, marker: Option<&str>) -> Result<ObjectPage, SourceError>;
}

impl<C: ListObjects + ?Sized> ListObjects for Box<C> {
    fn list_page(&mut self, marker: Option<&str>) -> Result<ObjectPage, SourceError> {
        (**self).list_page(marker)
    }
}

enum Cursor {
    Start,
    After(String),
    Done,
}

/// Flattens a paginated listing into a lazy stream of entries.
///
/// Pages are fetched on demand. The iterator ends after the first error.
pub struct Listing<C: ListObjects> {
    client: C,
    page: std::vec::IntoIter<ObjectEntry>,
    cursor: Cursor,
    pages: usize,
}

impl<C: ListObjects> Listing<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            page: Vec::new().into_iter(),
            cursor: Cursor::Start,
            pages: 0,
        }
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch(&mut self) -> Option<Result<(), SourceError>> {
        let marker = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return None,
            Cursor::Start => None,
            Cursor::After(marker) => Some(marker),
        };

        let page = match self.client.list_page(marker.as_deref()) {
            Ok(page) => page,
            Err(e) => return Some(Err(e)),
        };
        self.pages += 1;
        debug!(
            page = self.pages,
            entries = page.entries.len(),
            truncated = page.is_truncated,
            "fetched listing page"
        );

        if page.is_truncated {
            // BOS omits nextMarker unless a delimiter was given; the last key
            // of the page is then the marker to continue from
            let next = page
                .next_marker
                .filter(|m| !m.is_empty())
                .or_else(|| page.entries.last().map(|e| e.key.clone()));
            match next {
                Some(next) if marker.as_deref() != Some(next.as_str()) => {
                    self.cursor = Cursor::After(next);
                }
                _ => return Some(Err(SourceError::StalledPagination)),
            }
        }

        self.page = page.entries.into_iter();
        Some(Ok(()))
    }
}

impl<C: ListObjects> Iterator for Listing<C> {
    type Item = Result<ObjectEntry, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.page.next() {
                return Some(Ok(entry));
            }
            match self.fetch()? {
                Ok(()) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<C: ListObjects> FusedIterator for Listing<C> {}
