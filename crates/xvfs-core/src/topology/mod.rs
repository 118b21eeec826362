//! Registration topologies.
//!
//! A component registers its embedded tree through one [`Registrar`]. Which
//! registrar a component uses is fixed when it is built:
//!
//! - [`StandaloneRegistrar`] - one instance, its own host driver
//! - [`ServerDispatcher`] - a shared driver claiming all of `//xvfs:/`,
//!   routing by the first path segment to any number of instances
//! - [`ClientRegistrar`] - joins a server that must already be installed
//! - [`FlexibleRegistrar`] - joins a server if one is discoverable, else
//!   behaves as standalone
//!
//! Servers are discovered through [`FilesystemDriver::server_capability`] on
//! whichever driver claims the reserved root.
//!
//! [`FilesystemDriver::server_capability`]: crate::host::FilesystemDriver::server_capability

mod client;
mod flexible;
mod server;
mod standalone;

use std::sync::Arc;

use strum::{Display, EnumString};

pub use client::ClientRegistrar;
pub use flexible::FlexibleRegistrar;
pub use server::ServerDispatcher;
pub use standalone::{StandaloneDriver, StandaloneRegistrar};

use crate::constants::{ROOT_MOUNTPOINT, SERVER_TOKEN, ServerToken};
use crate::error::XvfsResult;
use crate::host::HostContext;
use crate::instance::{FilesystemInstance, FsInfo};

/// How a registrar places instances in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Topology {
    Standalone,
    Server,
    Client,
    Flexible,
}

/// Registers filesystem instances with a host.
pub trait Registrar: Send + Sync {
    /// Register `info`, returning the instance that serves it.
    ///
    /// Registering the same name again returns the existing instance.
    fn register(&self, host: &HostContext, info: FsInfo) -> XvfsResult<Arc<FilesystemInstance>>;

    fn topology(&self) -> Topology;
}

/// What a shared dispatcher advertises to components looking for it.
#[derive(Clone)]
pub struct ServerCapability {
    pub token: ServerToken,
    pub registrar: Arc<dyn Registrar>,
}

impl std::fmt::Debug for ServerCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCapability")
            .field("token", &self.token)
            .field("topology", &self.registrar.topology())
            .finish()
    }
}

/// Find a compatible shared dispatcher already serving the reserved root.
pub fn probe_server(host: &HostContext) -> Option<ServerCapability> {
    let driver = host.driver_for_path(ROOT_MOUNTPOINT)?;
    let capability = driver.server_capability()?;
    if capability.token != SERVER_TOKEN {
        tracing::debug!(
            driver = %driver.type_name(),
            "root driver advertises an unknown server token"
        );
        return None;
    }
    Some(capability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_table;

    #[test]
    fn test_probe_without_server() {
        let (host, _queue) = HostContext::with_local_queue();
        assert!(probe_server(&host).is_none());

        // A standalone driver never claims the bare root.
        StandaloneRegistrar::new()
            .register(&host, FsInfo::new("example", sample_table()))
            .unwrap();
        assert!(probe_server(&host).is_none());
    }

    #[test]
    fn test_probe_finds_server() {
        let (host, _queue) = HostContext::with_local_queue();
        ServerDispatcher::install(&host).unwrap();
        let capability = probe_server(&host).unwrap();
        assert_eq!(capability.token, SERVER_TOKEN);
        assert_eq!(capability.registrar.topology(), Topology::Server);
    }

    #[test]
    fn test_topology_names() {
        assert_eq!(Topology::Flexible.to_string(), "flexible");
        assert_eq!("server".parse::<Topology>().unwrap(), Topology::Server);
    }
}
