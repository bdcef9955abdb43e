//! Startup check for public exposure
//!
//! A server reachable from other machines may only expose a directory inside
//! the current user's home, and never the SSH key directory.

use std::path::Path;

/// Check `root` (already canonicalized) against the current user's home.
///
/// Returns the reason exposure is refused, if it is.
pub fn check_safe_pubdir(root: &Path) -> Result<(), String> {
    let home = dirs::home_dir().and_then(|h| h.canonicalize().ok().or(Some(h)));
    check_safe_pubdir_with_home(root, home.as_deref())
}

pub fn check_safe_pubdir_with_home(root: &Path, home: Option<&Path>) -> Result<(), String> {
    let Some(home) = home else {
        return Err("no home directory".to_string());
    };

    if !root.starts_with(home) {
        return Err("directory not contained inside your home directory".to_string());
    }

    if root.starts_with(home.join(".ssh")) {
        return Err("directory is inside SSH directory".to_string());
    }

    Ok(())
}
