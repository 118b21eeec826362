//! Core xvfs types.
//!
//! Stat results carry both a [`FileKind`] and a host-style `mode` word so
//! drivers can hand them to hosts that test `S_IFDIR`/`S_IFREG` bits.

use bitflags::bitflags;
use strum::{Display, EnumString};

/// Directory bit in [`FileStat::mode`].
pub const S_IFDIR: u32 = 0o040000;
/// Regular-file bit in [`FileStat::mode`].
pub const S_IFREG: u32 = 0o100000;

/// Kind of an embedded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    /// Regular file with a fixed byte payload.
    File,
    /// Directory with an ordered list of children.
    Directory,
}

impl FileKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileKind::Directory)
    }
}

/// Result of a data provider's `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Entry kind.
    pub kind: FileKind,
    /// Size in bytes for files, child count for directories.
    pub size: u64,
    /// Type bits plus permission bits, e.g. `S_IFREG | 0o444`.
    pub mode: u32,
}

impl FileStat {
    /// Stat for a read-only file of `size` bytes.
    pub fn file(size: u64) -> Self {
        Self {
            kind: FileKind::File,
            size,
            mode: S_IFREG | 0o444,
        }
    }

    /// Stat for a read-only directory with `children` entries.
    pub fn directory(children: u64) -> Self {
        Self {
            kind: FileKind::Directory,
            size: children,
            mode: S_IFDIR | 0o555,
        }
    }

    /// Returns true if the directory bit is set.
    pub fn is_dir(&self) -> bool {
        self.mode & S_IFDIR == S_IFDIR
    }

    /// Returns true if the regular-file bit is set.
    pub fn is_file(&self) -> bool {
        self.mode & S_IFREG == S_IFREG
    }
}

bitflags! {
    /// Access check requested through `access`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessMode: u32 {
        /// Existence only.
        const EXISTS = 0;
        /// Search permission; only directories grant it.
        const EXECUTE = 0b001;
        /// Always refused with `ReadOnly`.
        const WRITE = 0b010;
        /// Granted for any existing entry.
        const READ = 0b100;
    }
}

/// Mode a host asks to open a channel with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenMode {
    /// Read-only access.
    pub fn read() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    /// Write access (also enables read).
    pub fn write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// Returns true if this mode would modify the filesystem.
    pub fn wants_write(&self) -> bool {
        self.write || self.append || self.create || self.truncate
    }
}

bitflags! {
    /// Entry types a glob can ask for (`glob -types`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlobTypeMask: u32 {
        const BLOCK = 1 << 0;
        const CHAR = 1 << 1;
        const DIR = 1 << 2;
        const PIPE = 1 << 3;
        const FILE = 1 << 4;
        const LINK = 1 << 5;
        const SOCK = 1 << 6;
        const MOUNT = 1 << 7;
    }
}

bitflags! {
    /// Permissions a glob can ask for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlobPermMask: u32 {
        const READONLY = 1 << 0;
        const HIDDEN = 1 << 1;
        const READ = 1 << 2;
        const WRITE = 1 << 3;
        const EXEC = 1 << 4;
    }
}

/// Type and permission filter applied to directory matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobTypes {
    pub types: GlobTypeMask,
    pub perm: GlobPermMask,
}

impl GlobTypes {
    /// Filter on entry types only.
    pub fn of_type(types: GlobTypeMask) -> Self {
        Self {
            types,
            perm: GlobPermMask::empty(),
        }
    }

    /// Filter on permissions only.
    pub fn with_perm(perm: GlobPermMask) -> Self {
        Self {
            types: GlobTypeMask::empty(),
            perm,
        }
    }
}
