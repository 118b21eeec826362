//! Rust source emission.
//!
//! The emitted text is meant to be pulled into a module with `include!`, so
//! it carries no inner attributes or inner doc comments. It defines:
//!
//! - `NAME` and `PROTOCOL_VERSION`
//! - `RECORDS` and `BUCKETS`, the raw generated statics
//! - `TABLE`, an [`EmbeddedTable`](xvfs_core::EmbeddedTable) over them
//! - `lookup(name)`, the hash-index lookup
//! - `fs_info()`, registration info for any registrar

use std::fmt::Write;

use xvfs_core::PROTOCOL_VERSION;
use xvfs_core::constants::BUCKET_SENTINEL;
use xvfs_core::instance::check_name;

use crate::error::{GenError, GenResult};
use crate::generate::{GeneratedPayload, GeneratedTable};

/// Render `table` as Rust source for the instance `name`.
pub fn emit_source(table: &GeneratedTable, name: &str) -> GenResult<String> {
    check_name(name)?;

    let mut out = String::new();
    write_source(&mut out, table, name).map_err(|_| GenError::Emit(name.to_string()))?;
    Ok(out)
}

fn write_source(out: &mut String, table: &GeneratedTable, name: &str) -> std::fmt::Result {
    writeln!(out, "// @generated by xvfs-gen for filesystem {name:?}. Do not edit.")?;
    writeln!(out)?;
    writeln!(out, "/// Filesystem name; mounted at `//xvfs:/{name}`.")?;
    writeln!(out, "pub const NAME: &str = {name:?};")?;
    writeln!(out)?;
    writeln!(out, "/// Protocol version this table was generated for.")?;
    writeln!(out, "pub const PROTOCOL_VERSION: u32 = {PROTOCOL_VERSION};")?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static RECORDS: [::xvfs_core::PathRecord<'static>; {}] = [",
        table.records.len()
    )?;
    for (idx, record) in table.records.iter().enumerate() {
        match &record.payload {
            GeneratedPayload::File(data) => {
                writeln!(
                    out,
                    "    /* {idx} */ ::xvfs_core::PathRecord::file({:?}, {}),",
                    record.name,
                    byte_string(data)
                )?;
            }
            GeneratedPayload::Directory(children) => {
                writeln!(
                    out,
                    "    /* {idx} */ ::xvfs_core::PathRecord::directory({:?}, &{children:?}),",
                    record.name
                )?;
            }
        }
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static BUCKETS: [&[u32]; {}] = [",
        table.buckets.len()
    )?;
    for bucket in &table.buckets {
        write!(out, "    &[")?;
        for idx in bucket.iter().filter(|&&idx| idx != BUCKET_SENTINEL) {
            write!(out, "{idx}, ")?;
        }
        writeln!(out, "::xvfs_core::constants::BUCKET_SENTINEL],")?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static TABLE: ::xvfs_core::EmbeddedTable<'static> = \
         ::xvfs_core::EmbeddedTable::new(&RECORDS, &BUCKETS);"
    )?;
    writeln!(out)?;
    writeln!(out, "/// Index into `RECORDS` of the record named `name`.")?;
    writeln!(out, "pub fn lookup(name: &str) -> Option<usize> {{")?;
    writeln!(out, "    TABLE.lookup_index(name)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Registration info for this filesystem.")?;
    writeln!(out, "pub fn fs_info() -> ::xvfs_core::FsInfo {{")?;
    writeln!(
        out,
        "    ::xvfs_core::FsInfo::new(NAME, TABLE).with_protocol_version(PROTOCOL_VERSION)"
    )?;
    writeln!(out, "}}")?;
    Ok(())
}

/// A `b"..."` literal for `data`. Printable ASCII stays readable; everything
/// else is hex-escaped.
fn byte_string(data: &[u8]) -> String {
    let mut lit = String::with_capacity(data.len() + 3);
    lit.push_str("b\"");
    for &byte in data {
        match byte {
            b'"' => lit.push_str("\\\""),
            b'\\' => lit.push_str("\\\\"),
            b'\n' => lit.push_str("\\n"),
            b'\t' => lit.push_str("\\t"),
            0x20..=0x7e => lit.push(byte as char),
            _ => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                lit.push_str("\\x");
                lit.push(char::from(HEX[usize::from(byte >> 4)]));
                lit.push(char::from(HEX[usize::from(byte & 0x0f)]));
            }
        }
    }
    lit.push('"');
    lit
}
