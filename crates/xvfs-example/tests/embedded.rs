//! The generated `assets/` table, end to end.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use xvfs_core::{
    DataProvider, FlexibleRegistrar, GlobTypeMask, GlobTypes, HostContext, Interest, OpenMode,
    PROTOCOL_VERSION, Registrar, ServerDispatcher, StandaloneRegistrar, TokioEventQueue, Topology,
};
use xvfs_example::{NAME, TABLE, embedded, fs_info, lookup, register};

const MAIN_TCL: &[u8] = include_bytes!("../assets/main.tcl");
const APP_TCL: &[u8] = include_bytes!("../assets/lib/app/app.tcl");
const LOGO: &[u8] = include_bytes!("../assets/lib/logo.bin");

#[test]
fn table_matches_assets() {
    assert_eq!(NAME, "example");
    assert_eq!(embedded::PROTOCOL_VERSION, PROTOCOL_VERSION);
    TABLE.validate().unwrap();

    assert_eq!(TABLE.children("").unwrap(), vec!["README.txt", "lib", "main.tcl"]);
    assert_eq!(TABLE.children("lib").unwrap(), vec!["app", "logo.bin"]);
    assert_eq!(TABLE.children("lib/app").unwrap(), vec!["app.tcl", "pkgIndex.tcl"]);
    assert_eq!(TABLE.data("main.tcl", 0, usize::MAX).unwrap(), MAIN_TCL);
    assert_eq!(TABLE.stat("lib/logo.bin").unwrap().size, LOGO.len() as u64);

    for record in TABLE.records() {
        assert_eq!(lookup(record.name), TABLE.linear_lookup(record.name));
    }
    assert_eq!(lookup("lib/app/missing.tcl"), None);
}

#[test]
fn register_standalone_and_read() {
    let (host, _queue) = HostContext::with_local_queue();
    let instance = register(&host, &StandaloneRegistrar::new()).unwrap();
    assert_eq!(instance.mountpoint(), "//xvfs:/example");

    assert_eq!(host.read_to_end("//xvfs:/example/lib/app/app.tcl").unwrap(), APP_TCL);
    assert_eq!(host.read_to_end("//xvfs:/example/lib/logo.bin").unwrap(), LOGO);
    assert!(host.stat("//xvfs:/example/lib").unwrap().is_dir());
}

#[test]
fn bounded_reads_match_whole_file() {
    let (host, _queue) = HostContext::with_local_queue();
    register(&host, &StandaloneRegistrar::new()).unwrap();

    for step in [1, 3, 100, 1024] {
        let mut channel = host.open("//xvfs:/example/lib/logo.bin", OpenMode::read()).unwrap();
        let mut got = Vec::new();
        loop {
            let chunk = channel.read_chunk(step).unwrap();
            if chunk.is_empty() {
                break;
            }
            got.extend_from_slice(chunk);
        }
        assert_eq!(got, LOGO, "step {step}");
    }
}

#[test]
fn channel_seek_and_reread() {
    let (host, _queue) = HostContext::with_local_queue();
    register(&host, &StandaloneRegistrar::new()).unwrap();

    let mut channel = host.open("//xvfs:/example/main.tcl", OpenMode::read()).unwrap();
    let mut first = Vec::new();
    channel.read_to_end(&mut first).unwrap();
    assert!(channel.is_eof());

    Seek::seek(&mut channel, SeekFrom::Start(4)).unwrap();
    let mut tail = Vec::new();
    channel.read_to_end(&mut tail).unwrap();
    assert_eq!(tail, &MAIN_TCL[4..]);
}

#[test]
fn glob_with_filters() {
    let (host, _queue) = HostContext::with_local_queue();
    register(&host, &StandaloneRegistrar::new()).unwrap();

    assert_eq!(
        host.glob("//xvfs:/example/lib/app", "*.tcl", None).unwrap(),
        vec!["//xvfs:/example/lib/app/app.tcl", "//xvfs:/example/lib/app/pkgIndex.tcl"]
    );
    let files = GlobTypes::of_type(GlobTypeMask::FILE);
    assert_eq!(
        host.glob("//xvfs:/example/lib", "*", Some(&files)).unwrap(),
        vec!["//xvfs:/example/lib/logo.bin"]
    );

    host.set_cwd("//xvfs:/example");
    assert_eq!(host.glob("lib", "a*", None).unwrap(), vec!["lib/app"]);
}

#[test]
fn flexible_joins_existing_server() {
    let (host, _queue) = HostContext::with_local_queue();
    let server = ServerDispatcher::install(&host).unwrap();
    let other = xvfs_core::FsInfo::new("other", TABLE);
    server.register(&host, other).unwrap();

    let registrar = FlexibleRegistrar::new();
    register(&host, &registrar).unwrap();

    assert_eq!(registrar.decided(), Some(Topology::Server));
    assert_eq!(server.instance_names(), vec!["example", "other"]);
    assert_eq!(host.driver_count(), 1);
    assert_eq!(host.read_to_end("//xvfs:/example/main.tcl").unwrap(), MAIN_TCL);
}

#[test]
fn fs_info_carries_protocol() {
    let info = fs_info();
    assert_eq!(info.name, "example");
    assert_eq!(info.protocol_version, PROTOCOL_VERSION);
}

#[tokio::test]
async fn readiness_through_tokio_pump() {
    let (queue, mut pump) = TokioEventQueue::new();
    let host = HostContext::new(Arc::new(queue));
    register(&host, &StandaloneRegistrar::new()).unwrap();

    let mut channel = host.open("//xvfs:/example/README.txt", OpenMode::read()).unwrap();
    let ready = Arc::new(AtomicUsize::new(0));
    let r = ready.clone();
    channel.watch(Interest::READABLE, move || {
        r.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(pump.run_ready(), 1);
    assert_eq!(ready.load(Ordering::SeqCst), 1);

    let mut text = String::new();
    channel.read_to_string(&mut text).unwrap();
    assert!(text.starts_with("Files in this directory"));
    channel.rewind().unwrap();
    assert_eq!(channel.tell(), 0);
}
