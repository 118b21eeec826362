//! Shared fixtures for unit tests.

use crate::constants::BUCKET_SENTINEL;
use crate::table::{EmbeddedTable, PathRecord};

const ROOT_CHILDREN: &[&str] = &["a.txt", "b", "main.tcl"];
const B_CHILDREN: &[&str] = &["c.txt"];

static RECORDS: [PathRecord<'static>; 5] = [
    PathRecord::file("a.txt", b"hi"),
    PathRecord::file("b/c.txt", b"x"),
    PathRecord::directory("b", B_CHILDREN),
    PathRecord::file("main.tcl", b"puts hello\n"),
    PathRecord::directory("", ROOT_CHILDREN),
];

// A single bucket: every name collides, so every lookup walks the chain.
static BUCKETS: [&[u32]; 1] = [&[0, 1, 2, 3, 4, BUCKET_SENTINEL]];

/// `a.txt` ("hi"), `b/c.txt` ("x"), `main.tcl`.
pub(crate) fn sample_table() -> EmbeddedTable<'static> {
    EmbeddedTable::new(&RECORDS, &BUCKETS)
}
