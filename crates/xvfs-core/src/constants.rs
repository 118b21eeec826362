//! Process-wide xvfs constants.
//!
//! These are baked into every component at build time; a filesystem instance
//! and the dispatcher it joins must agree on all of them.

/// Reserved root under which every xvfs instance is reachable.
///
/// `//xvfs:/<name>/<relative path>` addresses a file in instance `<name>`.
pub const ROOT_MOUNTPOINT: &str = "//xvfs:/";

/// Protocol version of the data-provider contract.
pub const PROTOCOL_VERSION: u32 = 1;

/// Token a shared server dispatcher presents when probed.
pub const SERVER_TOKEN: ServerToken = ServerToken([0xD4, 0xF3, 0x05, 0x96, 0x25, 0xCF, 0xAF, 0xFE]);

/// Terminates every bucket in a generated hash index.
///
/// No table can hold `u32::MAX` records, so this never equals a valid index.
pub const BUCKET_SENTINEL: u32 = u32::MAX;

/// Upper bound on hash buckets in a generated table.
pub const DEFAULT_BUCKET_CAP: usize = 32;

/// Driver type name reported to the host.
pub const DRIVER_TYPE_NAME: &str = "xvfs";

/// Identifying token carried by a server dispatcher's capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerToken(pub [u8; 8]);
