//! Directory walking and hash index construction.
//!
//! Records are produced depth first: a directory's entries are visited in
//! name order, each file yields a record as it is read, and each directory
//! yields its record once its whole subtree is done. The root directory is
//! last and named `""`.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use walkdir::WalkDir;

use xvfs_core::constants::BUCKET_SENTINEL;
use xvfs_core::hash::bucket_for;
use xvfs_core::{EmbeddedTable, PathRecord, RecordPayload};

use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};

/// Payload of a record built from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedPayload {
    File(Vec<u8>),
    Directory(Vec<String>),
}

/// One record built from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRecord {
    /// Path relative to the walked root, `/`-separated.
    pub name: String,
    pub payload: GeneratedPayload,
}

/// Records plus hash buckets for one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTable {
    pub records: Vec<GeneratedRecord>,
    /// Record indices per bucket, each ending with [`BUCKET_SENTINEL`].
    pub buckets: Vec<Vec<u32>>,
}

impl GeneratedTable {
    /// Index `records` into `min(records.len(), bucket_cap)` buckets.
    pub fn from_records(records: Vec<GeneratedRecord>, bucket_cap: usize) -> GenResult<Self> {
        if records.len() >= BUCKET_SENTINEL as usize {
            return Err(GenError::TooManyRecords(records.len()));
        }
        let bucket_count = records.len().min(bucket_cap).max(1);
        let mut buckets = vec![Vec::new(); bucket_count];
        for (idx, record) in records.iter().enumerate() {
            buckets[bucket_for(&record.name, bucket_count)].push(idx as u32);
        }
        for bucket in &mut buckets {
            bucket.push(BUCKET_SENTINEL);
        }
        Ok(Self { records, buckets })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Run `f` against a borrowed [`EmbeddedTable`] view of this table.
    pub fn with_table<R>(&self, f: impl FnOnce(EmbeddedTable<'_>) -> R) -> R {
        let children: Vec<Vec<&str>> = self
            .records
            .iter()
            .map(|record| match &record.payload {
                GeneratedPayload::Directory(names) => names.iter().map(String::as_str).collect(),
                GeneratedPayload::File(_) => Vec::new(),
            })
            .collect();
        let records: Vec<PathRecord<'_>> = self
            .records
            .iter()
            .zip(&children)
            .map(|(record, names)| PathRecord {
                name: &record.name,
                payload: match &record.payload {
                    GeneratedPayload::File(data) => RecordPayload::File(data),
                    GeneratedPayload::Directory(_) => RecordPayload::Directory(names),
                },
            })
            .collect();
        let buckets: Vec<&[u32]> = self.buckets.iter().map(Vec::as_slice).collect();
        f(EmbeddedTable::new(&records, &buckets))
    }

    /// Leak the table into a `'static` [`EmbeddedTable`], for hosts that
    /// build trees at run time instead of compiling them in.
    pub fn leak(self) -> EmbeddedTable<'static> {
        let records: Vec<PathRecord<'static>> = self
            .records
            .into_iter()
            .map(|record| {
                let name: &'static str = Box::leak(record.name.into_boxed_str());
                let payload = match record.payload {
                    GeneratedPayload::File(data) => {
                        RecordPayload::File(Box::leak(data.into_boxed_slice()))
                    }
                    GeneratedPayload::Directory(names) => {
                        let names: Vec<&'static str> = names
                            .into_iter()
                            .map(|n| -> &'static str { Box::leak(n.into_boxed_str()) })
                            .collect();
                        RecordPayload::Directory(Box::leak(names.into_boxed_slice()))
                    }
                };
                PathRecord { name, payload }
            })
            .collect();
        let buckets: Vec<&'static [u32]> = self
            .buckets
            .into_iter()
            .map(|b| -> &'static [u32] { Box::leak(b.into_boxed_slice()) })
            .collect();
        EmbeddedTable::new(
            Box::leak(records.into_boxed_slice()),
            Box::leak(buckets.into_boxed_slice()),
        )
    }
}

/// Builds tables from directories on disk.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Walk `root` and index everything beneath it.
    pub fn generate(&self, root: impl AsRef<Path>) -> GenResult<GeneratedTable> {
        let root = root.as_ref();
        self.config.validate()?;
        let meta = fs::metadata(root).map_err(|e| GenError::io(root, e))?;
        if !meta.is_dir() {
            return Err(GenError::NotADirectory(root.to_path_buf()));
        }

        let records = self.walk(root)?;
        let table = GeneratedTable::from_records(records, self.config.bucket_cap)?;
        tracing::info!(
            root = %root.display(),
            records = table.records.len(),
            buckets = table.bucket_count(),
            "generated table"
        );
        Ok(table)
    }

    /// Visit `root` contents first, in file name order, so every directory
    /// arrives after its subtree and the root arrives last.
    fn walk(&self, root: &Path) -> GenResult<Vec<GeneratedRecord>> {
        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .contents_first(true);

        let mut records = Vec::new();
        // Child names collected so far for the open directory at each depth.
        let mut children: Vec<Vec<String>> = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            let depth = entry.depth();
            let name = relative_name(root, entry.path())?;

            let file_type = entry.file_type();
            let payload = if file_type.is_dir() {
                let names = children.get_mut(depth).map(std::mem::take).unwrap_or_default();
                tracing::debug!(name = %name, children = names.len(), "directory");
                GeneratedPayload::Directory(names)
            } else if file_type.is_file() {
                let data = self.read_file(entry.path())?;
                tracing::debug!(name = %name, size = data.len(), "file");
                GeneratedPayload::File(data)
            } else if file_type.is_symlink() {
                tracing::warn!(path = %entry.path().display(), "skipping symbolic link");
                continue;
            } else {
                tracing::warn!(path = %entry.path().display(), "skipping special file");
                continue;
            };

            if depth > 0 {
                let file_name = entry
                    .file_name()
                    .to_str()
                    .ok_or_else(|| GenError::NonUtf8Name(entry.path().to_path_buf()))?;
                if children.len() < depth {
                    children.resize_with(depth, Vec::new);
                }
                children[depth - 1].push(file_name.to_string());
            }
            records.push(GeneratedRecord { name, payload });
        }
        Ok(records)
    }

    /// Read a file in `block_size` steps.
    fn read_file(&self, path: &Path) -> GenResult<Vec<u8>> {
        let mut file = File::open(path).map_err(|e| GenError::io(path, e))?;
        let mut data = Vec::new();
        let mut block = vec![0u8; self.config.block_size];
        loop {
            let n = match file.read(&mut block) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GenError::io(path, e)),
            };
            data.extend_from_slice(&block[..n]);
        }
        Ok(data)
    }
}

/// `path` below `root` as a `/`-separated record name; `""` for the root.
fn relative_name(root: &Path, path: &Path) -> GenResult<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| GenError::io(path, std::io::Error::other("outside the walked root")))?;
    let parts = rel
        .iter()
        .map(|part| part.to_str())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| GenError::NonUtf8Name(path.to_path_buf()))?;
    Ok(parts.join("/"))
}

fn walk_error(root: &Path, err: walkdir::Error) -> GenError {
    let path = err.path().unwrap_or(root).to_path_buf();
    if let Some(ancestor) = err.loop_ancestor() {
        return GenError::SymlinkLoop {
            path,
            ancestor: ancestor.to_path_buf(),
        };
    }
    GenError::io(path, err.into())
}
