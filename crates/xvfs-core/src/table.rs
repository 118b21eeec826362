//! Embedded lookup tables.
//!
//! The generator emits a record array plus a bucketed hash index into a data
//! module; [`EmbeddedTable`] is the run-time reader for that module and the
//! [`DataProvider`] every generated filesystem registers with.
//!
//! Each bucket lists record indices whose name hashes into it and ends with
//! [`BUCKET_SENTINEL`]. A lookup hashes the queried name, walks one bucket
//! comparing names exactly, and stops at the sentinel.

use crate::constants::BUCKET_SENTINEL;
use crate::error::{XvfsError, XvfsResult};
use crate::hash;
use crate::provider::DataProvider;
use crate::types::{FileKind, FileStat};

/// Contents of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPayload<'a> {
    /// Full bytes of a regular file.
    File(&'a [u8]),
    /// Immediate child names of a directory, in walk order.
    Directory(&'a [&'a str]),
}

/// One generated entry: a file's bytes or a directory's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRecord<'a> {
    /// Path relative to the tree root; the root itself is `""`.
    pub name: &'a str,
    pub payload: RecordPayload<'a>,
}

impl<'a> PathRecord<'a> {
    pub const fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            payload: RecordPayload::File(data),
        }
    }

    pub const fn directory(name: &'a str, children: &'a [&'a str]) -> Self {
        Self {
            name,
            payload: RecordPayload::Directory(children),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self.payload {
            RecordPayload::File(_) => FileKind::File,
            RecordPayload::Directory(_) => FileKind::Directory,
        }
    }

    pub fn stat(&self) -> FileStat {
        match self.payload {
            RecordPayload::File(data) => FileStat::file(data.len() as u64),
            RecordPayload::Directory(children) => FileStat::directory(children.len() as u64),
        }
    }
}

/// Read-only view over a generated record array and its hash index.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedTable<'a> {
    records: &'a [PathRecord<'a>],
    buckets: &'a [&'a [u32]],
}

impl<'a> EmbeddedTable<'a> {
    /// Wrap generated statics. `const` so generated modules can build the
    /// table in a `static`.
    pub const fn new(records: &'a [PathRecord<'a>], buckets: &'a [&'a [u32]]) -> Self {
        Self { records, buckets }
    }

    pub fn records(&self) -> &'a [PathRecord<'a>] {
        self.records
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Index of the record named `name`, found through the hash index.
    pub fn lookup_index(&self, name: &str) -> Option<usize> {
        let bucket = self.buckets.get(hash::bucket_for(name, self.buckets.len()))?;
        for &idx in bucket.iter() {
            if idx == BUCKET_SENTINEL {
                break;
            }
            let record = self.records.get(idx as usize)?;
            if record.name == name {
                return Some(idx as usize);
            }
        }
        None
    }

    /// Record named `name`, found through the hash index.
    pub fn lookup(&self, name: &str) -> Option<&'a PathRecord<'a>> {
        let records = self.records;
        self.lookup_index(name).map(|idx| &records[idx])
    }

    /// Index of the record named `name`, by scanning every record.
    ///
    /// Reference answer for the hash index; not used on the lookup path.
    pub fn linear_lookup(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|record| record.name == name)
    }

    /// Check the structural invariants of the index.
    ///
    /// Every bucket must end with the sentinel and contain it nowhere else,
    /// every index must name a record whose hash selects that bucket, and
    /// record names must be unique.
    pub fn validate(&self) -> XvfsResult<()> {
        let count = self.buckets.len();
        for (bucket_idx, bucket) in self.buckets.iter().enumerate() {
            let Some((&last, body)) = bucket.split_last() else {
                return Err(XvfsError::internal(format!("bucket {bucket_idx} is empty")));
            };
            if last != BUCKET_SENTINEL {
                return Err(XvfsError::internal(format!(
                    "bucket {bucket_idx} is not terminated"
                )));
            }
            for &idx in body {
                if idx == BUCKET_SENTINEL {
                    return Err(XvfsError::internal(format!(
                        "bucket {bucket_idx} holds the sentinel before its end"
                    )));
                }
                let record = self.records.get(idx as usize).ok_or_else(|| {
                    XvfsError::internal(format!("bucket {bucket_idx} names record {idx}"))
                })?;
                if hash::bucket_for(record.name, count) != bucket_idx {
                    return Err(XvfsError::internal(format!(
                        "record {:?} filed under bucket {bucket_idx}",
                        record.name
                    )));
                }
            }
        }

        let mut names: Vec<&str> = self.records.iter().map(|r| r.name).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(XvfsError::internal(format!(
                "duplicate record name {:?}",
                pair[0]
            )));
        }
        Ok(())
    }

    fn record(&self, path: &str) -> XvfsResult<&'a PathRecord<'a>> {
        self.lookup(path).ok_or_else(|| XvfsError::not_found(path))
    }
}

impl DataProvider for EmbeddedTable<'_> {
    fn children(&self, path: &str) -> XvfsResult<Vec<&str>> {
        match self.record(path)?.payload {
            RecordPayload::Directory(children) => Ok(children.to_vec()),
            RecordPayload::File(_) => Err(XvfsError::not_a_directory(path)),
        }
    }

    fn stat(&self, path: &str) -> XvfsResult<FileStat> {
        Ok(self.record(path)?.stat())
    }

    fn data(&self, path: &str, offset: u64, max_len: usize) -> XvfsResult<&[u8]> {
        match self.record(path)?.payload {
            RecordPayload::File(data) => {
                let len = data.len() as u64;
                if offset >= len {
                    return Ok(&[]);
                }
                let start = offset as usize;
                let end = start.saturating_add(max_len).min(data.len());
                Ok(&data[start..end])
            }
            RecordPayload::Directory(_) => Err(XvfsError::is_a_directory(path)),
        }
    }
}
