//! `build.rs` integration.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     xvfs_gen::build::embed_directory("assets", "example").expect("embed assets");
//! }
//!
//! // src/lib.rs
//! pub mod embedded {
//!     include!(concat!(env!("OUT_DIR"), "/xvfs_example.rs"));
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_ENV, GeneratorConfig};
use crate::emit::emit_source;
use crate::error::{GenError, GenResult};
use crate::generate::Generator;

/// File name the generated source is written to inside `OUT_DIR`.
pub fn output_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("xvfs_{sanitized}.rs")
}

/// Generate the table for `dir` and write it to `$OUT_DIR`, telling cargo to
/// rerun when the tree or the generator config changes.
///
/// Returns the path written.
pub fn embed_directory(dir: impl AsRef<Path>, name: &str) -> GenResult<PathBuf> {
    let out_dir = std::env::var_os("OUT_DIR").ok_or(GenError::MissingOutDir)?;
    embed_directory_to(dir, name, Path::new(&out_dir))
}

/// Like [`embed_directory`], with an explicit output directory.
pub fn embed_directory_to(dir: impl AsRef<Path>, name: &str, out_dir: &Path) -> GenResult<PathBuf> {
    let dir = dir.as_ref();
    println!("cargo::rerun-if-changed={}", dir.display());
    println!("cargo::rerun-if-env-changed={CONFIG_ENV}");

    let generator = Generator::new(GeneratorConfig::from_env()?);
    let table = generator.generate(dir)?;
    let source = emit_source(&table, name)?;

    let out = out_dir.join(output_file_name(name));
    std::fs::write(&out, source).map_err(|e| GenError::io(&out, e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("example"), "xvfs_example.rs");
        assert_eq!(output_file_name("my-app.v2"), "xvfs_my_app_v2.rs");
    }

    #[test]
    fn test_embed_to_dir() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("main.tcl"), "puts hi\n").unwrap();
        let out = tempfile::tempdir().unwrap();

        let written = embed_directory_to(src.path(), "demo", out.path()).unwrap();
        assert_eq!(written, out.path().join("xvfs_demo.rs"));
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("PathRecord::file(\"main.tcl\", b\"puts hi\\n\")"));
    }
}
