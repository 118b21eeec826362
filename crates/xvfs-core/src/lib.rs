//! # xvfs-core
//!
//! Read-only filesystems embedded in the binary, served to a host through
//! paths under the reserved root `//xvfs:/`.
//!
//! A filesystem instance is a name plus a [`DataProvider`] answering three
//! queries (children, stat, data). Instances reach the host through a
//! [`Registrar`]:
//!
//! - [`StandaloneRegistrar`] - one instance, one host driver
//! - [`ServerDispatcher`] - one driver for the whole root, many instances
//! - [`ClientRegistrar`] - joins an installed dispatcher
//! - [`FlexibleRegistrar`] - joins a dispatcher if one exists, else standalone
//!
//! Reads go through a [`Channel`], a seekable stream over one file's bytes
//! that can post readiness notifications to the host's [`EventQueue`].
//!
//! ## Design Decisions
//!
//! - **No global state**: the driver list, working directory and event
//!   queue live in a [`HostContext`] the caller constructs.
//! - **Static data**: [`EmbeddedTable`] reads the record array and hash
//!   buckets `xvfs-gen` emits, borrowed for `'static`.
//! - **Shared channel state**: a channel's state is freed when the handle
//!   and every queued notification have dropped it, never twice.

pub mod channel;
pub mod constants;
pub mod error;
pub mod event;
pub mod hash;
pub mod host;
pub mod instance;
pub mod matcher;
pub mod provider;
pub mod resolve;
pub mod table;
pub mod topology;
pub mod types;

#[cfg(test)]
mod testing;

pub use channel::{Channel, ChannelTracker, Interest, SeekMode};
pub use constants::{PROTOCOL_VERSION, ROOT_MOUNTPOINT, SERVER_TOKEN, ServerToken};
pub use error::{XvfsError, XvfsResult};
pub use event::{EventPump, EventQueue, LocalEventQueue, QueuedEvent, TokioEventQueue};
pub use host::{FilesystemDriver, HostContext};
pub use instance::{FilesystemInstance, FsInfo};
pub use provider::DataProvider;
pub use table::{EmbeddedTable, PathRecord, RecordPayload};
pub use topology::{
    ClientRegistrar, FlexibleRegistrar, Registrar, ServerCapability, ServerDispatcher,
    StandaloneDriver, StandaloneRegistrar, Topology, probe_server,
};
pub use types::{
    AccessMode, FileKind, FileStat, GlobPermMask, GlobTypeMask, GlobTypes, OpenMode,
};
