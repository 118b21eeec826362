//! Hand-built tables shared by the integration tests.

#![allow(dead_code)]

use xvfs_core::constants::BUCKET_SENTINEL;
use xvfs_core::hash::bucket_for;
use xvfs_core::{EmbeddedTable, PathRecord};

const ROOT_CHILDREN: &[&str] = &["README", "lib"];
const LIB_CHILDREN: &[&str] = &["init.tcl", "util.tcl"];

pub static RECORDS: [PathRecord<'static>; 5] = [
    PathRecord::file("README", b"embedded tree\n"),
    PathRecord::file("lib/init.tcl", b"source [file join [file dirname [info script]] util.tcl]\n"),
    PathRecord::file("lib/util.tcl", b"proc util {} { return ok }\n"),
    PathRecord::directory("lib", LIB_CHILDREN),
    PathRecord::directory("", ROOT_CHILDREN),
];

/// Builds a correctly filed hash index over [`RECORDS`] and leaks it.
pub fn table(bucket_count: usize) -> EmbeddedTable<'static> {
    let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); bucket_count];
    for (idx, record) in RECORDS.iter().enumerate() {
        buckets[bucket_for(record.name, bucket_count)].push(idx as u32);
    }
    let buckets: Vec<&'static [u32]> = buckets
        .into_iter()
        .map(|mut bucket| {
            bucket.push(BUCKET_SENTINEL);
            let leaked: &'static [u32] = Box::leak(bucket.into_boxed_slice());
            leaked
        })
        .collect();
    EmbeddedTable::new(&RECORDS, Box::leak(buckets.into_boxed_slice()))
}
