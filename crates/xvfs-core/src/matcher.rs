//! Directory matching for glob requests.
//!
//! Children are matched with shell rules (`*`, `?`, `[...]`) and filtered by
//! the requested entry types and permissions. Results keep the order the
//! provider lists children in.

use glob::{MatchOptions, Pattern};

use crate::error::{XvfsError, XvfsResult};
use crate::host::HostContext;
use crate::instance::FilesystemInstance;
use crate::resolve;
use crate::types::{FileStat, GlobPermMask, GlobTypeMask, GlobTypes};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Types that never exist in an embedded tree.
const IMPOSSIBLE_TYPES: GlobTypeMask = GlobTypeMask::BLOCK
    .union(GlobTypeMask::CHAR)
    .union(GlobTypeMask::PIPE)
    .union(GlobTypeMask::SOCK)
    .union(GlobTypeMask::LINK);

/// Match `pattern` against the children of `dir`.
///
/// With no pattern, checks `dir` itself: returns it if it exists and passes
/// `types`, an empty list if it exists but is filtered out, and `NotFound`
/// if it does not exist.
///
/// Returned paths are `dir` joined with each matching child name.
pub fn match_in_directory(
    instance: &FilesystemInstance,
    host: &HostContext,
    dir: &str,
    pattern: Option<&str>,
    types: Option<&GlobTypes>,
) -> XvfsResult<Vec<String>> {
    let Some(pattern) = pattern else {
        let stat = instance.stat(host, dir)?;
        return Ok(if passes(instance, host, dir, &stat, types) {
            vec![dir.to_string()]
        } else {
            Vec::new()
        });
    };

    let relative = instance
        .relative(host, dir)
        .ok_or_else(|| XvfsError::not_found(dir))?;
    let children = instance.provider().children(&relative)?;
    let pattern = compile_pattern(pattern)?;

    let mut matches = Vec::new();
    for child in children {
        if !name_matches(&pattern, child) {
            continue;
        }
        let full = resolve::join(dir, child);
        if verify_type(instance, host, &full, types) {
            matches.push(full);
        }
    }

    tracing::trace!(
        instance = %instance.name(),
        dir = %dir,
        matches = matches.len(),
        "matched directory"
    );
    Ok(matches)
}

/// Compile a shell pattern. A run of `*` means the same as a single `*`;
/// `glob` would otherwise read `**` as a recursive path wildcard.
pub(crate) fn compile_pattern(pattern: &str) -> XvfsResult<Pattern> {
    Pattern::new(&collapse_stars(pattern))
        .map_err(|e| XvfsError::invalid_argument(format!("bad pattern {pattern:?}: {e}")))
}

fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut prev_star = false;
    for c in pattern.chars() {
        if c == '*' && prev_star {
            continue;
        }
        prev_star = c == '*';
        out.push(c);
    }
    out
}

pub(crate) fn name_matches(pattern: &Pattern, name: &str) -> bool {
    pattern.matches_with(name, MATCH_OPTIONS)
}

/// Returns true if `path` exists and satisfies `types`.
pub fn verify_type(
    instance: &FilesystemInstance,
    host: &HostContext,
    path: &str,
    types: Option<&GlobTypes>,
) -> bool {
    match instance.stat(host, path) {
        Ok(stat) => passes(instance, host, path, &stat, types),
        Err(_) => false,
    }
}

fn passes(
    instance: &FilesystemInstance,
    host: &HostContext,
    path: &str,
    stat: &FileStat,
    types: Option<&GlobTypes>,
) -> bool {
    let Some(types) = types else {
        return true;
    };
    if !perm_passes(types.perm, stat) {
        return false;
    }
    type_passes(types.types, stat, || {
        instance
            .relative(host, path)
            .is_some_and(|relative| relative.is_empty())
    })
}

/// Everything is readable and nothing is writable or hidden; execute
/// (search) permission only exists on directories.
pub(crate) fn perm_passes(perm: GlobPermMask, stat: &FileStat) -> bool {
    if perm.is_empty() || perm == GlobPermMask::READONLY {
        return true;
    }
    if perm.intersects(GlobPermMask::WRITE | GlobPermMask::HIDDEN) {
        return false;
    }
    if perm.contains(GlobPermMask::EXEC) && !stat.is_dir() {
        return false;
    }
    true
}

/// Directory and file requests pass if the entry is either requested kind;
/// a mount request passes only for an instance root.
///
/// `-types {d f}` at the host glob level means "directories or files", so
/// the two bits are ORed rather than each required on its own.
pub(crate) fn type_passes(
    types: GlobTypeMask,
    stat: &FileStat,
    is_root: impl FnOnce() -> bool,
) -> bool {
    if types.intersects(IMPOSSIBLE_TYPES) {
        return false;
    }

    let kinds = types & (GlobTypeMask::DIR | GlobTypeMask::FILE);
    if !kinds.is_empty() {
        let kind_ok = (kinds.contains(GlobTypeMask::DIR) && stat.is_dir())
            || (kinds.contains(GlobTypeMask::FILE) && stat.is_file());
        if !kind_ok {
            return false;
        }
    }

    if types.contains(GlobTypeMask::MOUNT) && !is_root() {
        return false;
    }
    true
}
