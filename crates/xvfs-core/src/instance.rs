//! Filesystem instances.
//!
//! An instance binds one data provider to its mountpoint under
//! [`ROOT_MOUNTPOINT`]. Instances are created once, at registration, and are
//! never mutated or removed afterwards. Every registration topology serves
//! requests through the operations defined here.

use std::borrow::Cow;
use std::sync::Arc;

use crate::channel::Channel;
use crate::constants::{PROTOCOL_VERSION, ROOT_MOUNTPOINT};
use crate::error::{XvfsError, XvfsResult};
use crate::host::HostContext;
use crate::matcher;
use crate::provider::DataProvider;
use crate::resolve;
use crate::types::{AccessMode, FileStat, GlobTypes, OpenMode};

/// What a component hands to a registrar.
#[derive(Clone)]
pub struct FsInfo {
    /// Instance name; the mountpoint is `//xvfs:/<name>`.
    pub name: String,
    /// Protocol version the provider was generated for.
    pub protocol_version: u32,
    pub provider: Arc<dyn DataProvider>,
}

impl std::fmt::Debug for FsInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsInfo")
            .field("name", &self.name)
            .field("protocol_version", &self.protocol_version)
            .finish_non_exhaustive()
    }
}

impl FsInfo {
    /// Registration info at the current protocol version.
    pub fn new(name: impl Into<String>, provider: impl DataProvider + 'static) -> Self {
        Self::from_arc(name, Arc::new(provider))
    }

    pub fn from_arc(name: impl Into<String>, provider: Arc<dyn DataProvider>) -> Self {
        Self {
            name: name.into(),
            protocol_version: PROTOCOL_VERSION,
            provider,
        }
    }

    /// Override the declared protocol version.
    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }
}

/// Reject registrations built against another protocol version.
pub fn check_protocol(info: &FsInfo) -> XvfsResult<()> {
    if info.protocol_version != PROTOCOL_VERSION {
        return Err(XvfsError::ProtocolMismatch {
            expected: PROTOCOL_VERSION,
            found: info.protocol_version,
        });
    }
    Ok(())
}

/// Reject names that cannot form a single mountpoint segment.
pub fn check_name(name: &str) -> XvfsResult<()> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(XvfsError::invalid_argument(format!(
            "invalid filesystem name {name:?}"
        )));
    }
    Ok(())
}

/// One registered embedded filesystem.
pub struct FilesystemInstance {
    name: String,
    mountpoint: String,
    protocol_version: u32,
    provider: Arc<dyn DataProvider>,
}

impl std::fmt::Debug for FilesystemInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemInstance")
            .field("name", &self.name)
            .field("mountpoint", &self.mountpoint)
            .field("protocol_version", &self.protocol_version)
            .finish_non_exhaustive()
    }
}

impl FilesystemInstance {
    /// Build an instance from validated registration info.
    pub fn new(info: FsInfo) -> XvfsResult<Self> {
        check_protocol(&info)?;
        check_name(&info.name)?;
        Ok(Self {
            mountpoint: format!("{ROOT_MOUNTPOINT}{}", info.name),
            name: info.name,
            protocol_version: info.protocol_version,
            provider: info.provider,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mountpoint(&self) -> &str {
        &self.mountpoint
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn provider(&self) -> &dyn DataProvider {
        self.provider.as_ref()
    }

    /// Path relative to this instance's root, or `None` if not ours.
    pub fn relative<'p>(&self, host: &HostContext, path: &'p str) -> Option<Cow<'p, str>> {
        resolve::resolve(path, &self.mountpoint, &host.cwd())
    }

    fn relative_or_not_found<'p>(
        &self,
        host: &HostContext,
        path: &'p str,
    ) -> XvfsResult<Cow<'p, str>> {
        self.relative(host, path)
            .ok_or_else(|| XvfsError::not_found(path))
    }

    /// Returns true if this instance's mountpoint claims `path`.
    pub fn claims(&self, host: &HostContext, path: &str) -> bool {
        self.relative(host, path).is_some()
    }

    pub fn stat(&self, host: &HostContext, path: &str) -> XvfsResult<FileStat> {
        let relative = self.relative_or_not_found(host, path)?;
        self.provider.stat(&relative)
    }

    /// Check access to `path`. Writing is never granted; execute (search)
    /// access is granted on directories only.
    pub fn access(&self, host: &HostContext, path: &str, mode: AccessMode) -> XvfsResult<()> {
        if mode.contains(AccessMode::WRITE) {
            return Err(XvfsError::read_only(path));
        }
        let stat = self.stat(host, path)?;
        if mode.contains(AccessMode::EXECUTE) && !stat.is_dir() {
            return Err(XvfsError::permission_denied(path));
        }
        Ok(())
    }

    /// Open `path` as a read-only channel.
    pub fn open(
        self: &Arc<Self>,
        host: &HostContext,
        path: &str,
        mode: OpenMode,
    ) -> XvfsResult<Channel> {
        if mode.wants_write() {
            return Err(XvfsError::read_only(path));
        }
        let relative = self.relative_or_not_found(host, path)?;
        Channel::open(Arc::clone(self), &relative, Arc::clone(host.events()))
    }

    /// Glob `pattern` inside `dir`, or check `dir` itself when `pattern` is
    /// `None`. See [`matcher::match_in_directory`].
    pub fn match_in_directory(
        &self,
        host: &HostContext,
        dir: &str,
        pattern: Option<&str>,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>> {
        matcher::match_in_directory(self, host, dir, pattern, types)
    }
}
