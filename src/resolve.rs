use crate::errors::{AppError, AppResult};
use std::io;
use std::path::{Path, PathBuf};

/// Resolve an untrusted path string against a project root.
///
/// Two validation stages run in order: lexical normalization (separators,
/// absolute prefixes, dot-segment collapsing) and physical containment (the
/// canonical form of the candidate must stay under the canonical root). The
/// returned path is the lexical join of root and the normalized relative
/// path; it is not guaranteed to exist.
pub fn resolve_under_root(root: &Path, raw: &str) -> AppResult<PathBuf> {
    let relative = normalize_relative(raw)?;
    let candidate = root.join(relative);
    verify_containment(root, &candidate, raw)?;
    Ok(candidate)
}

// lexical stage; pure string processing, no filesystem access
pub fn normalize_relative(raw: &str) -> AppResult<String> {
    if raw.trim().is_empty() {
        return Err(AppError::EmptyPath);
    }
    // Separators are normalized unconditionally; path strings are exchanged
    // as opaque text and carry no host-platform convention.
    let normalized = raw.replace('\\', "/");
    if has_drive_prefix(&normalized) {
        return Err(AppError::AbsolutePathRejected {
            path: raw.to_string(),
        });
    }
    // Leading slashes are stripped and the remainder treated as relative;
    // the containment stage below still applies to the result.
    let relative = normalized.trim_start_matches('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // `..` may only cancel a segment already descended into.
                if segments.pop().is_none() {
                    return Err(AppError::TraversalRejected {
                        path: raw.to_string(),
                    });
                }
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        // `.`, `./`, `a/..` and the like name the root itself, which is not
        // a readable file resource.
        return Err(AppError::EmptyPath);
    }
    Ok(segments.join("/"))
}

// Windows-style absolute prefix (`X:/` after separator normalization),
// detected as a string pattern regardless of host platform.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

// physical stage; canonicalizes the candidate (deepest existing ancestor
// while it does not exist yet) and catches symlinks the lexical pass cannot see
pub fn verify_containment(root: &Path, candidate: &Path, raw: &str) -> AppResult<()> {
    let canonical_root = dunce::canonicalize(root)
        .map_err(|e| AppError::Internal(format!("project root unavailable: {e}")))?;
    let canonical = canonical_prefix(candidate)
        .map_err(|e| AppError::Internal(format!("canonicalize failed: {e}")))?;
    // `Path::starts_with` matches whole components only, so a sibling such
    // as `<root>2` never passes as a prefix of `<root>`.
    if canonical.starts_with(&canonical_root) {
        Ok(())
    } else {
        Err(AppError::TraversalRejected {
            path: raw.to_string(),
        })
    }
}

fn canonical_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut probe = path;
    loop {
        match dunce::canonicalize(probe) {
            Ok(resolved) => return Ok(resolved),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                match probe.parent() {
                    Some(parent) => probe = parent,
                    None => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}
