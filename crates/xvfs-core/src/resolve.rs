//! Mountpoint-relative path resolution.
//!
//! Translates a host path into the path a data provider understands. `..`
//! is never interpreted: `//xvfs:/app/../etc` resolves to `../etc`, which no
//! generated table contains.

use std::borrow::Cow;

/// Path of `path` relative to `mountpoint`, or `None` if the mountpoint does
/// not claim it.
///
/// `path` must already be absolute; see [`resolve`] for the cwd-aware form.
pub fn relative<'p>(path: &'p str, mountpoint: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(mountpoint)?;
    if rest.is_empty() {
        return Some("");
    }

    // The byte after the prefix must be a separator, unless the mountpoint
    // itself already ends in one (the reserved root does).
    let mut rest = if mountpoint.ends_with('/') {
        rest
    } else {
        rest.strip_prefix('/')?
    };

    if rest == "." {
        return Some("");
    }
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    Some(rest.trim_end_matches('/'))
}

/// Like [`relative`], but resolves a relative `path` against `cwd` first.
pub fn resolve<'p>(path: &'p str, mountpoint: &str, cwd: &str) -> Option<Cow<'p, str>> {
    if path.starts_with('/') {
        return relative(path, mountpoint).map(Cow::Borrowed);
    }
    let absolute = join(cwd, path);
    relative(&absolute, mountpoint).map(|rel| Cow::Owned(rel.to_string()))
}

/// Join a directory and a child name with exactly one separator.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// First path segment of `rest` and whatever follows it.
///
/// `"example/lib/a.tcl"` splits into `("example", "lib/a.tcl")`.
pub fn split_first(rest: &str) -> (&str, &str) {
    match rest.split_once('/') {
        Some((first, tail)) => (first, tail),
        None => (rest, ""),
    }
}
