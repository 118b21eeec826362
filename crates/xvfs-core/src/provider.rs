//! Data-provider contract.
//!
//! A data provider answers the three queries every embedded tree supports.
//! Generated tables implement it through [`EmbeddedTable`](crate::EmbeddedTable);
//! hand-written providers can implement it directly.

use crate::error::XvfsResult;
use crate::types::FileStat;

/// Core data-provider trait.
///
/// Paths are always relative to the provider's root, with no leading `/`.
/// The empty string names the root directory. The dispatcher handles
/// mountpoint stripping before calling in.
pub trait DataProvider: Send + Sync {
    /// List the immediate children of a directory, in generation order.
    fn children(&self, path: &str) -> XvfsResult<Vec<&str>>;

    /// Get the kind and size of an entry.
    fn stat(&self, path: &str) -> XvfsResult<FileStat>;

    /// Read file contents.
    ///
    /// Returns up to `max_len` bytes starting at `offset`. Fewer bytes are
    /// returned near the end of the file, and an empty slice at or past EOF.
    fn data(&self, path: &str, offset: u64, max_len: usize) -> XvfsResult<&[u8]>;

    /// Check if a path exists.
    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }
}
