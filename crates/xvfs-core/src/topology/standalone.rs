//! Single-instance registration.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Registrar, Topology};
use crate::channel::Channel;
use crate::error::{XvfsError, XvfsResult};
use crate::host::{FilesystemDriver, HostContext};
use crate::instance::{FilesystemInstance, FsInfo};
use crate::types::{AccessMode, FileStat, GlobTypes, OpenMode};

/// Host driver serving exactly one instance under its own mountpoint.
#[derive(Debug)]
pub struct StandaloneDriver {
    instance: Arc<FilesystemInstance>,
}

impl StandaloneDriver {
    pub fn new(instance: Arc<FilesystemInstance>) -> Self {
        Self { instance }
    }

    pub fn instance(&self) -> &Arc<FilesystemInstance> {
        &self.instance
    }
}

impl FilesystemDriver for StandaloneDriver {
    fn claims(&self, host: &HostContext, path: &str) -> bool {
        self.instance.claims(host, path)
    }

    fn stat(&self, host: &HostContext, path: &str) -> XvfsResult<FileStat> {
        self.instance.stat(host, path)
    }

    fn access(&self, host: &HostContext, path: &str, mode: AccessMode) -> XvfsResult<()> {
        self.instance.access(host, path, mode)
    }

    fn open(&self, host: &HostContext, path: &str, mode: OpenMode) -> XvfsResult<Channel> {
        self.instance.open(host, path, mode)
    }

    fn match_in_directory(
        &self,
        host: &HostContext,
        dir: &str,
        pattern: Option<&str>,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>> {
        self.instance.match_in_directory(host, dir, pattern, types)
    }
}

/// Registers one instance as its own host driver.
///
/// A second registration under the same name returns the first instance; a
/// different name is rejected, since this registrar owns a single slot.
#[derive(Debug, Default)]
pub struct StandaloneRegistrar {
    slot: Mutex<Option<Arc<FilesystemInstance>>>,
}

impl StandaloneRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered instance, if any.
    pub fn instance(&self) -> Option<Arc<FilesystemInstance>> {
        self.slot.lock().clone()
    }
}

impl Registrar for StandaloneRegistrar {
    fn register(&self, host: &HostContext, info: FsInfo) -> XvfsResult<Arc<FilesystemInstance>> {
        let mut slot = self.slot.lock();
        if let Some(existing) = slot.as_ref() {
            if existing.name() == info.name {
                tracing::debug!(instance = %info.name, "already registered");
                return Ok(Arc::clone(existing));
            }
            tracing::warn!(
                instance = %info.name,
                registered = %existing.name(),
                "standalone registrar already holds an instance"
            );
            return Err(XvfsError::invalid_argument(format!(
                "standalone registrar already serves {:?}",
                existing.name()
            )));
        }

        let instance = Arc::new(FilesystemInstance::new(info).inspect_err(|e| {
            tracing::warn!(error = %e, "standalone registration rejected");
        })?);
        host.register_driver(Arc::new(StandaloneDriver::new(Arc::clone(&instance))))?;

        tracing::info!(
            instance = %instance.name(),
            mountpoint = %instance.mountpoint(),
            "registered standalone filesystem"
        );
        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }

    fn topology(&self) -> Topology {
        Topology::Standalone
    }
}
