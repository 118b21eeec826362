//! Shared dispatcher for many instances.
//!
//! The dispatcher claims the whole reserved root and routes each request by
//! the first path segment after it: `//xvfs:/<name>/<path>` goes to the
//! instance registered as `<name>`. The root itself is a synthesized,
//! read-only directory listing the registered instance names.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{Registrar, ServerCapability, Topology};
use crate::channel::Channel;
use crate::constants::{ROOT_MOUNTPOINT, SERVER_TOKEN};
use crate::error::{XvfsError, XvfsResult};
use crate::host::{FilesystemDriver, HostContext};
use crate::instance::{FilesystemInstance, FsInfo, check_protocol};
use crate::matcher;
use crate::resolve;
use crate::types::{AccessMode, FileStat, GlobTypes, OpenMode};

/// Where a request lands.
enum Route {
    /// The reserved root itself.
    Root,
    Instance(Arc<FilesystemInstance>),
}

/// Name-keyed registry of instances behind one host driver.
pub struct ServerDispatcher {
    this: Weak<ServerDispatcher>,
    instances: DashMap<String, Arc<FilesystemInstance>>,
}

impl std::fmt::Debug for ServerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDispatcher")
            .field("instances", &self.instance_names())
            .finish()
    }
}

impl ServerDispatcher {
    /// Create a dispatcher and register it as the host's driver for the
    /// reserved root.
    pub fn install(host: &HostContext) -> XvfsResult<Arc<Self>> {
        let dispatcher = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            instances: DashMap::new(),
        });
        host.register_driver(dispatcher.clone())?;
        tracing::info!(root = %ROOT_MOUNTPOINT, "installed shared xvfs dispatcher");
        Ok(dispatcher)
    }

    /// Registered instance names, sorted.
    pub fn instance_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn instance(&self, name: &str) -> Option<Arc<FilesystemInstance>> {
        self.instances.get(name).map(|e| Arc::clone(e.value()))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn route(&self, host: &HostContext, path: &str) -> XvfsResult<Route> {
        let rest = resolve::resolve(path, ROOT_MOUNTPOINT, &host.cwd())
            .ok_or_else(|| XvfsError::not_found(path))?;
        let (name, _) = resolve::split_first(&rest);
        if name.is_empty() {
            return Ok(Route::Root);
        }
        self.instance(name)
            .map(Route::Instance)
            .ok_or_else(|| XvfsError::not_found(path))
    }

    fn root_stat(&self) -> FileStat {
        FileStat::directory(self.instances.len() as u64)
    }

    fn match_root(
        &self,
        host: &HostContext,
        dir: &str,
        pattern: Option<&str>,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>> {
        let Some(pattern) = pattern else {
            let stat = self.root_stat();
            let passes = types.is_none_or(|t| {
                matcher::perm_passes(t.perm, &stat) && matcher::type_passes(t.types, &stat, || true)
            });
            return Ok(if passes { vec![dir.to_string()] } else { Vec::new() });
        };

        let pattern = matcher::compile_pattern(pattern)?;
        let mut matches = Vec::new();
        for name in self.instance_names() {
            if !matcher::name_matches(&pattern, &name) {
                continue;
            }
            let Some(instance) = self.instance(&name) else {
                continue;
            };
            let full = resolve::join(dir, &name);
            matches.extend(instance.match_in_directory(host, &full, None, types)?);
        }
        Ok(matches)
    }
}

impl Registrar for ServerDispatcher {
    fn register(&self, _host: &HostContext, info: FsInfo) -> XvfsResult<Arc<FilesystemInstance>> {
        check_protocol(&info).inspect_err(|e| {
            tracing::warn!(instance = %info.name, error = %e, "server registration rejected");
        })?;

        match self.instances.entry(info.name.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!(instance = %info.name, "already registered");
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                let instance = Arc::new(FilesystemInstance::new(info)?);
                slot.insert(Arc::clone(&instance));
                tracing::info!(
                    instance = %instance.name(),
                    mountpoint = %instance.mountpoint(),
                    "registered filesystem with shared dispatcher"
                );
                Ok(instance)
            }
        }
    }

    fn topology(&self) -> Topology {
        Topology::Server
    }
}

impl FilesystemDriver for ServerDispatcher {
    fn claims(&self, host: &HostContext, path: &str) -> bool {
        resolve::resolve(path, ROOT_MOUNTPOINT, &host.cwd()).is_some()
    }

    fn stat(&self, host: &HostContext, path: &str) -> XvfsResult<FileStat> {
        match self.route(host, path)? {
            Route::Root => Ok(self.root_stat()),
            Route::Instance(instance) => instance.stat(host, path),
        }
    }

    fn access(&self, host: &HostContext, path: &str, mode: AccessMode) -> XvfsResult<()> {
        match self.route(host, path)? {
            Route::Root if mode.contains(AccessMode::WRITE) => Err(XvfsError::read_only(path)),
            Route::Root => Ok(()),
            Route::Instance(instance) => instance.access(host, path, mode),
        }
    }

    fn open(&self, host: &HostContext, path: &str, mode: OpenMode) -> XvfsResult<Channel> {
        match self.route(host, path)? {
            Route::Root if mode.wants_write() => Err(XvfsError::read_only(path)),
            Route::Root => Err(XvfsError::is_a_directory(path)),
            Route::Instance(instance) => instance.open(host, path, mode),
        }
    }

    fn match_in_directory(
        &self,
        host: &HostContext,
        dir: &str,
        pattern: Option<&str>,
        types: Option<&GlobTypes>,
    ) -> XvfsResult<Vec<String>> {
        match self.route(host, dir)? {
            Route::Root => self.match_root(host, dir, pattern, types),
            Route::Instance(instance) => instance.match_in_directory(host, dir, pattern, types),
        }
    }

    fn server_capability(&self) -> Option<ServerCapability> {
        let registrar: Arc<dyn Registrar> = self.this.upgrade()?;
        Some(ServerCapability {
            token: SERVER_TOKEN,
            registrar,
        })
    }
}
