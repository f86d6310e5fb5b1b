//! Helpers for splitting object keys into path segments

/// Split an object key into its directory segments and file name.
///
/// A key ending in `/` is a directory marker and has an empty file name.
/// A key without any `/` is a file directly under the root.
pub fn split_key(key: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = key.split('/').collect();
    // split always yields at least one item
    let file_name = segments.pop().unwrap_or_default();
    (segments, file_name)
}

/// Number of leading segments two directory paths have in common.
pub fn common_prefix_len<A, B>(current: &[A], next: &[B]) -> usize
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    current
        .iter()
        .zip(next)
        .take_while(|(a, b)| a.as_ref() == b.as_ref())
        .count()
}

/// Whether two directory paths are segment-wise equal.
pub fn same_dir<A, B>(current: &[A], next: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    current.len() == next.len() && common_prefix_len(current, next) == current.len()
}
