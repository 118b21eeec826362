//! Host context and the filesystem driver contract.
//!
//! [`HostContext`] stands in for the host runtime: it owns the list of
//! registered filesystem drivers, the working directory relative paths are
//! resolved against, and the event queue channels post notifications to.
//! The process entry point builds one and passes it to every registration.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::channel::Channel;
use crate::constants::DRIVER_TYPE_NAME;
use crate::error::{XvfsError, XvfsResult};
use crate::event::{EventQueue, LocalEventQueue};
use crate::topology::ServerCapability;
use crate::types::{AccessMode, FileStat, GlobTypes, OpenMode};

/// Bytes requested per channel read in [`HostContext::read_to_end`].
const READ_CHUNK: usize = 64 * 1024;

/// Operations a host routes to a registered filesystem driver.
pub trait FilesystemDriver: Send + Sync {
    /// Short type name reported to the host.
    fn type_name(&self) -> &str {
        DRIVER_TYPE_NAME
    }

    /// Returns true if this driver serves `path`.
    fn claims(&self, host: &HostContext, path: &str) -> bool;

    fn stat(&self, host: &HostContext, path: &str) -> XvfsResult<FileStat>;

    fn access(&self, host: &HostContext, path: &str, mode: AccessMode) -> XvfsResult<()>;

    fn open(&self, host: &HostContext, path: &str, mode: OpenMode) -> XvfsResult<Channel>;

    fn match_in_directory(
        &self,
        host: &HostContext,
        dir: &str,
        pattern: Option<&str>,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>>;

    /// Volumes this driver adds to the host's volume list.
    fn list_volumes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Registration capability for drivers that act as a shared dispatcher.
    fn server_capability(&self) -> Option<ServerCapability> {
        None
    }
}

/// The host side of every xvfs operation.
pub struct HostContext {
    drivers: RwLock<Vec<Arc<dyn FilesystemDriver>>>,
    cwd: RwLock<String>,
    events: Arc<dyn EventQueue>,
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("drivers", &self.drivers.read().len())
            .field("cwd", &*self.cwd.read())
            .finish_non_exhaustive()
    }
}

impl HostContext {
    /// Create a host posting channel events to `events`. The working
    /// directory starts at `/`.
    pub fn new(events: Arc<dyn EventQueue>) -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
            cwd: RwLock::new("/".to_string()),
            events,
        }
    }

    /// Create a host with a [`LocalEventQueue`], returned alongside it so
    /// the caller can drain it.
    pub fn with_local_queue() -> (Self, Arc<LocalEventQueue>) {
        let queue = Arc::new(LocalEventQueue::new());
        (Self::new(queue.clone()), queue)
    }

    pub fn events(&self) -> &Arc<dyn EventQueue> {
        &self.events
    }

    pub fn cwd(&self) -> String {
        self.cwd.read().clone()
    }

    /// Change the working directory. `cwd` must be absolute.
    pub fn set_cwd(&self, cwd: impl Into<String>) {
        *self.cwd.write() = cwd.into();
    }

    /// Add a driver. Drivers registered later take precedence for any path
    /// they claim.
    pub fn register_driver(&self, driver: Arc<dyn FilesystemDriver>) -> XvfsResult<()> {
        let mut drivers = self.drivers.write();
        if drivers.iter().any(|d| Arc::ptr_eq(d, &driver)) {
            tracing::warn!(driver = %driver.type_name(), "driver already registered");
            return Err(XvfsError::host_registration(format!(
                "{} driver already registered",
                driver.type_name()
            )));
        }
        tracing::debug!(driver = %driver.type_name(), count = drivers.len() + 1, "driver registered");
        drivers.push(driver);
        Ok(())
    }

    /// Number of registered drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.read().len()
    }

    /// The newest driver claiming `path`.
    pub fn driver_for_path(&self, path: &str) -> Option<Arc<dyn FilesystemDriver>> {
        // Snapshot so drivers can call back into the host without the lock.
        let drivers = self.drivers.read().clone();
        drivers.into_iter().rev().find(|d| d.claims(self, path))
    }

    fn driver_or_not_found(&self, path: &str) -> XvfsResult<Arc<dyn FilesystemDriver>> {
        self.driver_for_path(path)
            .ok_or_else(|| XvfsError::not_found(path))
    }

    /// Volumes reported by every driver.
    pub fn list_volumes(&self) -> Vec<String> {
        let drivers = self.drivers.read().clone();
        drivers.iter().flat_map(|d| d.list_volumes()).collect()
    }

    pub fn stat(&self, path: &str) -> XvfsResult<FileStat> {
        self.driver_or_not_found(path)?.stat(self, path)
    }

    pub fn access(&self, path: &str, mode: AccessMode) -> XvfsResult<()> {
        self.driver_or_not_found(path)?.access(self, path, mode)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.access(path, AccessMode::EXISTS).is_ok()
    }

    pub fn open(&self, path: &str, mode: OpenMode) -> XvfsResult<Channel> {
        self.driver_or_not_found(path)?.open(self, path, mode)
    }

    /// Glob `pattern` in `dir`. A directory nobody serves, or that does not
    /// exist, has no matches.
    pub fn glob(
        &self,
        dir: &str,
        pattern: &str,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>> {
        let Some(driver) = self.driver_for_path(dir) else {
            return Ok(Vec::new());
        };
        match driver.match_in_directory(self, dir, Some(pattern), types) {
            Err(XvfsError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Read a whole file through a channel.
    pub fn read_to_end(&self, path: &str) -> XvfsResult<Vec<u8>> {
        let mut channel = self.open(path, OpenMode::read())?;
        let mut buf = Vec::with_capacity(usize::try_from(channel.size()).unwrap_or(0));
        loop {
            let chunk = channel.read_chunk(READ_CHUNK)?;
            if chunk.is_empty() {
                return Ok(buf);
            }
            buf.extend_from_slice(chunk);
        }
    }
}
