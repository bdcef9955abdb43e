//! Request path resolution
//!
//! Turns the path component of a request target into a decoded pathname and
//! a filesystem path confined to the served root.

use crate::error::PathError;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// A request pathname and the filesystem path it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Normalized, decoded pathname; always starts with `/`
    pub pathname: String,
    /// Served root joined with the pathname's segments
    pub fs_path: PathBuf,
}

impl ResolvedPath {
    pub fn has_trailing_slash(&self) -> bool {
        self.pathname.ends_with('/')
    }

    pub fn is_root(&self) -> bool {
        self.pathname == "/"
    }
}

/// Resolve a URI path (query already removed) against `root`.
pub fn resolve(root: &Path, uri_path: &str) -> Result<ResolvedPath, PathError> {
    let decoded = decode_pathname(uri_path)?;
    let stripped = strip_dot_runs(&decoded);
    let segments = normalize_segments(stripped);

    let mut pathname = String::with_capacity(stripped.len() + 1);
    pathname.push('/');
    pathname.push_str(&segments.join("/"));
    if !segments.is_empty() && stripped.ends_with('/') {
        pathname.push('/');
    }

    let mut fs_path = root.to_path_buf();
    fs_path.extend(&segments);

    Ok(ResolvedPath { pathname, fs_path })
}

/// Percent-decode a pathname, rejecting malformed escapes
pub fn decode_pathname(raw: &str) -> Result<String, PathError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(PathError::MalformedEscape(raw.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| PathError::InvalidUtf8)?;
    if decoded.contains('\0') {
        return Err(PathError::NulByte);
    }
    Ok(decoded.into_owned())
}

/// Strip a run of two or more dots from either end of the pathname
fn strip_dot_runs(pathname: &str) -> &str {
    let leading = pathname.len() - pathname.trim_start_matches('.').len();
    let rest = if leading >= 2 {
        &pathname[leading..]
    } else {
        pathname
    };
    let trailing = rest.len() - rest.trim_end_matches('.').len();
    if trailing >= 2 {
        &rest[..rest.len() - trailing]
    } else {
        rest
    }
}

/// Split into segments, dropping `.` and resolving `..` without ever
/// climbing above the root.
fn normalize_segments(pathname: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in pathname.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

const fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}
