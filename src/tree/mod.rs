//! Directory tree reconstruction
//!
//! Object storage has no directories, only keys. `PathWalker` diffs each
//! key's directory against the previous one and emits the enter/leave events
//! that rebuild the implied tree, using O(depth) memory for a sorted listing
//! of any size.

mod config;
mod path;
mod walker;

pub use config::{OrderCheck, WalkerConfig};
pub use path::{common_prefix_len, split_key};
pub use walker::{PathWalker, TreeOutput, WalkStats};
