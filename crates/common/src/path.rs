//! Remote path handling.
//!
//! Every path a caller hands to a bucket is resolved against the bucket's
//! base directory before it reaches a driver. The result never contains
//! `..` or `.` segments or doubled separators, and always starts with the
//! base directory.

const SEPARATOR: char = '/';

/// Resolve `path` against `base_dir`.
///
/// Traversal segments are stripped rather than resolved, so
/// `"a/../b"` becomes `"a/b"`. Idempotent for a fixed `base_dir`.
pub fn normalize(path: &str, base_dir: &str) -> String {
    let cleaned = strip_traversal(path);
    let base = collapse_separators(&strip_traversal(base_dir));
    let base_prefix = with_trailing_separator(&base);

    if cleaned.starts_with(&base_prefix) {
        return collapse_separators(&cleaned);
    }
    if cleaned == base || cleaned == base_prefix {
        return base_prefix;
    }
    collapse_separators(&format!("{}{}", base_prefix, cleaned))
}

/// Drop every `..` and `.` segment, keeping leading and trailing
/// separators intact.
fn strip_traversal(path: &str) -> String {
    path.split(SEPARATOR)
        .filter(|segment| *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_was_separator = false;
    for c in path.chars() {
        if c == SEPARATOR {
            if !previous_was_separator {
                out.push(c);
            }
            previous_was_separator = true;
        } else {
            out.push(c);
            previous_was_separator = false;
        }
    }
    out
}

fn with_trailing_separator(path: &str) -> String {
    if path.is_empty() || path.ends_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{}{}", path, SEPARATOR)
    }
}

/// Parent directory of a normalized path. The parent of a top-level entry
/// (and of the root itself) is `/`.
pub fn parent_of(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) | None => SEPARATOR.to_string(),
        Some(index) => trimmed[..index].to_string(),
    }
}

/// Last segment of a normalized path, ignoring a trailing separator.
pub fn leaf_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Join a directory and a child name with exactly one separator.
pub fn join(dir: &str, name: &str) -> String {
    format!(
        "{}{}{}",
        dir.trim_end_matches(SEPARATOR),
        SEPARATOR,
        name.trim_start_matches(SEPARATOR)
    )
}

pub fn is_root(path: &str) -> bool {
    path.is_empty() || path.chars().all(|c| c == SEPARATOR)
}
