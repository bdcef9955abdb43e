//! HTTP cache validator module
//!
//! Provides `ETag` and `Last-Modified` values derived from file metadata,
//! plus the pre-expired `Expires` value used on directory responses.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// Date in the past; makes clients revalidate directory responses every time
pub const EXPIRED: &str = "Sun, 11 Mar 1984 12:00:00 GMT";

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate)
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Generate an `ETag` from modification time, inode and size.
///
/// Stat fields only, no content hashing, so an unchanged file always yields
/// the same tag.
pub fn generate_etag(meta: &Metadata) -> String {
    let mtime_ms = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis());
    format_etag(mtime_ms, inode(meta), meta.len())
}

/// Quoted `"<mtime>-<inode>-<size>"`, each field base-36 encoded
pub fn format_etag(mtime_ms: u128, inode: u64, size: u64) -> String {
    format!(
        "\"{}-{}-{}\"",
        to_base36(mtime_ms),
        to_base36(u128::from(inode)),
        to_base36(u128::from(size))
    )
}

#[cfg(unix)]
fn inode(meta: &Metadata) -> u64 {
    std::os::unix::fs::MetadataExt::ino(meta)
}

#[cfg(not(unix))]
const fn inode(_meta: &Metadata) -> u64 {
    0
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_000_000), "lfls");
    }

    #[test]
    fn test_format_etag() {
        assert_eq!(format_etag(0, 0, 0), "\"0-0-0\"");
        assert_eq!(format_etag(1_700_000_000_000, 36, 2), "\"loyw3v28-10-2\"");
    }

    #[test]
    fn test_etag_consistency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hi").unwrap();

        let first = generate_etag(&std::fs::metadata(&path).unwrap());
        let second = generate_etag(&std::fs::metadata(&path).unwrap());
        assert_eq!(first, second);
        assert!(first.starts_with('"'));
        assert!(first.ends_with("-2\""));
    }

    #[test]
    fn test_http_date() {
        assert_eq!(http_date(UNIX_EPOCH), "Thu, 01 Jan 1970 00:00:00 GMT");
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(http_date(t), "Tue, 14 Nov 2023 22:13:20 GMT");
    }
}
