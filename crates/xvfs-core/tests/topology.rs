//! Registration topologies seen from a host.

mod common;

use std::sync::Arc;

use xvfs_core::{
    ClientRegistrar, FlexibleRegistrar, FsInfo, GlobTypeMask, GlobTypes, HostContext, Registrar,
    ServerDispatcher, StandaloneRegistrar, Topology, XvfsError, probe_server,
};

#[test]
fn flexible_components_share_one_dispatcher() {
    let (host, _queue) = HostContext::with_local_queue();
    let server = ServerDispatcher::install(&host).unwrap();
    server
        .register(&host, FsInfo::new("first", common::table(4)))
        .unwrap();

    // Two independently built components, each with its own registrar.
    let second = FlexibleRegistrar::new();
    let third = FlexibleRegistrar::new();
    second.register(&host, FsInfo::new("second", common::table(2))).unwrap();
    third.register(&host, FsInfo::new("third", common::table(1))).unwrap();

    assert_eq!(second.decided(), Some(Topology::Server));
    assert_eq!(third.decided(), Some(Topology::Server));
    assert_eq!(host.driver_count(), 1);
    assert_eq!(server.instance_names(), vec!["first", "second", "third"]);

    let probed = probe_server(&host).unwrap();
    let server_dyn: Arc<dyn Registrar> = server.clone();
    assert!(Arc::ptr_eq(&probed.registrar, &server_dyn));

    for name in ["first", "second", "third"] {
        let path = format!("//xvfs:/{name}/lib/util.tcl");
        assert_eq!(host.read_to_end(&path).unwrap(), b"proc util {} { return ok }\n");
    }
}

#[test]
fn flexible_without_server_is_standalone() {
    let (host, _queue) = HostContext::with_local_queue();
    let registrar = FlexibleRegistrar::new();
    let instance = registrar
        .register(&host, FsInfo::new("solo", common::table(3)))
        .unwrap();

    assert_eq!(registrar.decided(), Some(Topology::Standalone));
    assert_eq!(instance.mountpoint(), "//xvfs:/solo");
    assert!(probe_server(&host).is_none());
    assert_eq!(
        host.glob("//xvfs:/solo", "*", None).unwrap(),
        vec!["//xvfs:/solo/README", "//xvfs:/solo/lib"]
    );
}

#[test]
fn standalone_instances_coexist() {
    let (host, _queue) = HostContext::with_local_queue();
    StandaloneRegistrar::new()
        .register(&host, FsInfo::new("one", common::table(2)))
        .unwrap();
    StandaloneRegistrar::new()
        .register(&host, FsInfo::new("two", common::table(5)))
        .unwrap();

    assert_eq!(host.driver_count(), 2);
    assert!(host.exists("//xvfs:/one/README"));
    assert!(host.exists("//xvfs:/two/lib/init.tcl"));
    assert!(!host.exists("//xvfs:/three/README"));
}

#[test]
fn client_needs_a_server() {
    let (host, _queue) = HostContext::with_local_queue();
    let err = ClientRegistrar::new()
        .register(&host, FsInfo::new("app", common::table(2)))
        .unwrap_err();
    assert!(matches!(err, XvfsError::HostRegistration(_)));

    let server = ServerDispatcher::install(&host).unwrap();
    ClientRegistrar::new()
        .register(&host, FsInfo::new("app", common::table(2)))
        .unwrap();
    assert_eq!(server.len(), 1);
}

#[test]
fn server_root_lists_mounts() {
    let (host, _queue) = HostContext::with_local_queue();
    let server = ServerDispatcher::install(&host).unwrap();
    for name in ["zeta", "alpha"] {
        server.register(&host, FsInfo::new(name, common::table(2))).unwrap();
    }

    let dirs = GlobTypes::of_type(GlobTypeMask::DIR);
    assert_eq!(
        host.glob("//xvfs:/", "*", Some(&dirs)).unwrap(),
        vec!["//xvfs:/alpha", "//xvfs:/zeta"]
    );
    assert_eq!(
        host.glob("//xvfs:/alpha/lib", "*.tcl", None).unwrap(),
        vec!["//xvfs:/alpha/lib/init.tcl", "//xvfs:/alpha/lib/util.tcl"]
    );
}

#[test]
fn doubled_stars_match_like_one() {
    let (host, _queue) = HostContext::with_local_queue();
    StandaloneRegistrar::new()
        .register(&host, FsInfo::new("t", common::table(2)))
        .unwrap();
    assert_eq!(host.glob("//xvfs:/t", "R**", None).unwrap(), vec!["//xvfs:/t/README"]);
    assert_eq!(host.glob("//xvfs:/t/lib", "**.tcl", None).unwrap().len(), 2);

    let (host, _queue) = HostContext::with_local_queue();
    let server = ServerDispatcher::install(&host).unwrap();
    server.register(&host, FsInfo::new("tree", common::table(2))).unwrap();
    assert_eq!(host.glob("//xvfs:/", "t**e", None).unwrap(), vec!["//xvfs:/tree"]);
}
