//! Bucket-selection checksum.
//!
//! A running Adler-32 over the bytes of a relative path. The generator and
//! the run-time lookup both hash through this module, so the bucket a name
//! lands in at build time is the bucket probed at run time.
//!
//! This is a bucket selector only. Collisions are expected and every lookup
//! ends in an exact string comparison.

use adler2::Adler32;

/// Streaming Adler-32 accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathChecksum {
    inner: Adler32,
}

impl PathChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes. May be called any number of times.
    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.write_slice(bytes);
    }

    pub fn finish(&self) -> u32 {
        self.inner.checksum()
    }
}

/// Checksum of a whole path.
pub fn checksum(path: &str) -> u32 {
    let mut sum = PathChecksum::new();
    sum.update(path.as_bytes());
    sum.finish()
}

/// Bucket a path hashes into, for a table of `bucket_count` buckets.
///
/// Returns 0 when `bucket_count` is 0 so empty tables never divide by zero.
pub fn bucket_for(path: &str, bucket_count: usize) -> usize {
    if bucket_count == 0 {
        return 0;
    }
    checksum(path) as usize % bucket_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(checksum(""), 1);
        assert_eq!(checksum("a"), 0x0062_0062);
        assert_eq!(checksum("Wikipedia"), 0x11E6_0398);
        assert_eq!(checksum("lib/app/app.tcl"), adler2::adler32_slice(b"lib/app/app.tcl"));
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let text = "lib/app/main.tcl".repeat(1000);
        let mut sum = PathChecksum::new();
        for piece in text.as_bytes().chunks(7) {
            sum.update(piece);
        }
        assert_eq!(sum.finish(), checksum(&text));
    }

    #[test]
    fn test_bucket_range() {
        for name in ["", "a.txt", "b", "b/c.txt", "deeply/nested/path"] {
            assert!(bucket_for(name, 5) < 5);
        }
        assert_eq!(bucket_for("anything", 0), 0);
    }
}
