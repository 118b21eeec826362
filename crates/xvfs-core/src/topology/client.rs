//! Registration through an already-installed shared dispatcher.

use std::sync::Arc;

use super::{Registrar, Topology, probe_server};
use crate::error::{XvfsError, XvfsResult};
use crate::host::HostContext;
use crate::instance::{FilesystemInstance, FsInfo};

/// Delegates every registration to the host's shared dispatcher. Never
/// registers a driver of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientRegistrar;

impl ClientRegistrar {
    pub fn new() -> Self {
        Self
    }
}

impl Registrar for ClientRegistrar {
    fn register(&self, host: &HostContext, info: FsInfo) -> XvfsResult<Arc<FilesystemInstance>> {
        let Some(server) = probe_server(host) else {
            tracing::warn!(instance = %info.name, "no shared xvfs dispatcher to join");
            return Err(XvfsError::host_registration(format!(
                "no shared dispatcher installed for {:?}",
                info.name
            )));
        };
        server.registrar.register(host, info)
    }

    fn topology(&self) -> Topology {
        Topology::Client
    }
}
