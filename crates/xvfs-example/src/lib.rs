//! # xvfs-example
//!
//! The `assets/` tree, compiled in by `build.rs` and served at
//! `//xvfs:/example`.
//!
//! ```ignore
//! let (host, queue) = xvfs_core::HostContext::with_local_queue();
//! xvfs_example::register(&host, &xvfs_core::FlexibleRegistrar::new())?;
//! let script = host.read_to_end("//xvfs:/example/main.tcl")?;
//! ```

use std::sync::Arc;

use xvfs_core::{FilesystemInstance, HostContext, Registrar, XvfsResult};

/// Generated table for `assets/`.
pub mod embedded {
    include!(concat!(env!("OUT_DIR"), "/xvfs_example.rs"));
}

pub use embedded::{NAME, TABLE, fs_info, lookup};

/// Register the embedded tree through `registrar`.
pub fn register(host: &HostContext, registrar: &dyn Registrar) -> XvfsResult<Arc<FilesystemInstance>> {
    let instance = registrar.register(host, fs_info())?;
    tracing::debug!(
        instance = %instance.name(),
        topology = %registrar.topology(),
        "example filesystem registered"
    );
    Ok(instance)
}
