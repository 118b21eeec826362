//! Registration that joins a shared dispatcher when one exists.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Registrar, StandaloneRegistrar, Topology, probe_server};
use crate::error::XvfsResult;
use crate::host::HostContext;
use crate::instance::{FilesystemInstance, FsInfo};

#[derive(Clone)]
enum Route {
    Server(Arc<dyn Registrar>),
    Standalone,
}

impl Route {
    fn topology(&self) -> Topology {
        match self {
            Route::Server(_) => Topology::Server,
            Route::Standalone => Topology::Standalone,
        }
    }
}

/// Probes for a shared dispatcher on first registration and sticks with the
/// answer: join it if found, otherwise register standalone.
///
/// The decision is recorded by the first registration that succeeds.
#[derive(Default)]
pub struct FlexibleRegistrar {
    route: Mutex<Option<Route>>,
    standalone: StandaloneRegistrar,
}

impl std::fmt::Debug for FlexibleRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexibleRegistrar")
            .field("route", &self.decided())
            .finish_non_exhaustive()
    }
}

impl FlexibleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The topology chosen so far, if any registration has succeeded.
    pub fn decided(&self) -> Option<Topology> {
        self.route.lock().as_ref().map(Route::topology)
    }

    fn probe(host: &HostContext) -> Route {
        match probe_server(host) {
            Some(capability) => {
                tracing::debug!("found shared xvfs dispatcher");
                Route::Server(capability.registrar)
            }
            None => {
                tracing::debug!("no shared xvfs dispatcher, falling back to standalone");
                Route::Standalone
            }
        }
    }
}

impl Registrar for FlexibleRegistrar {
    fn register(&self, host: &HostContext, info: FsInfo) -> XvfsResult<Arc<FilesystemInstance>> {
        let mut decided = self.route.lock();
        let route = match decided.as_ref() {
            Some(route) => route.clone(),
            None => Self::probe(host),
        };

        let result = match &route {
            Route::Server(server) => server.register(host, info),
            Route::Standalone => self.standalone.register(host, info),
        };

        if result.is_ok() && decided.is_none() {
            tracing::info!(topology = %route.topology(), "flexible registration settled");
            *decided = Some(route);
        }
        result
    }

    fn topology(&self) -> Topology {
        Topology::Flexible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROTOCOL_VERSION;
    use crate::error::XvfsError;
    use crate::testing::sample_table;
    use crate::topology::ServerDispatcher;

    #[test]
    fn test_falls_back_to_standalone() {
        let (host, _queue) = HostContext::with_local_queue();
        let registrar = FlexibleRegistrar::new();
        registrar.register(&host, FsInfo::new("example", sample_table())).unwrap();

        assert_eq!(registrar.decided(), Some(Topology::Standalone));
        assert_eq!(host.read_to_end("//xvfs:/example/a.txt").unwrap(), b"hi");
        assert!(probe_server(&host).is_none());
    }

    #[test]
    fn test_joins_existing_server() {
        let (host, _queue) = HostContext::with_local_queue();
        let server = ServerDispatcher::install(&host).unwrap();

        let registrar = FlexibleRegistrar::new();
        registrar.register(&host, FsInfo::new("example", sample_table())).unwrap();

        assert_eq!(registrar.decided(), Some(Topology::Server));
        assert_eq!(server.instance_names(), vec!["example"]);
        assert_eq!(host.driver_count(), 1);
    }

    #[test]
    fn test_decision_is_cached() {
        let (host, _queue) = HostContext::with_local_queue();
        let registrar = FlexibleRegistrar::new();
        registrar.register(&host, FsInfo::new("example", sample_table())).unwrap();

        // A dispatcher appearing later does not change the decision.
        let server = ServerDispatcher::install(&host).unwrap();
        registrar.register(&host, FsInfo::new("example", sample_table())).unwrap();
        assert_eq!(registrar.decided(), Some(Topology::Standalone));
        assert!(server.is_empty());
    }

    #[test]
    fn test_failed_registration_decides_nothing() {
        let (host, _queue) = HostContext::with_local_queue();
        let registrar = FlexibleRegistrar::new();
        let info = FsInfo::new("example", sample_table()).with_protocol_version(PROTOCOL_VERSION + 1);
        assert!(matches!(
            registrar.register(&host, info),
            Err(XvfsError::ProtocolMismatch { .. })
        ));
        assert_eq!(registrar.decided(), None);

        let server = ServerDispatcher::install(&host).unwrap();
        registrar.register(&host, FsInfo::new("example", sample_table())).unwrap();
        assert_eq!(registrar.decided(), Some(Topology::Server));
        assert_eq!(server.len(), 1);
    }
}
