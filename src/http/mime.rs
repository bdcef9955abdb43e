//! MIME type detection module
//!
//! Resolves a file's Content-Type from its extension, a configured default,
//! or a look at its first bytes.

use std::path::Path;

/// Number of leading bytes inspected when guessing text vs. binary
pub const SNIFF_LEN: usize = 4096;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Get MIME Content-Type for a lowercase file extension
///
/// # Examples
/// ```
/// use servedir::http::mime::lookup;
/// assert_eq!(lookup("html"), Some("text/html"));
/// assert_eq!(lookup("mp4"), Some("video/mp4"));
/// assert_eq!(lookup("nope"), None);
/// ```
pub fn lookup(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "ics" => "text/calendar",

        // JavaScript/WASM
        "js" | "mjs" | "cjs" => "application/javascript",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents and archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(content_type)
}

/// Resolve the Content-Type for a file being served.
///
/// Order: extension table, configured default, then byte sniffing.
pub fn content_type_for<'a>(path: &Path, default: Option<&'a str>, content: &[u8]) -> &'a str {
    let by_extension: Option<&'a str> = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| lookup(&e.to_ascii_lowercase()));

    by_extension.or(default).unwrap_or_else(|| {
        if is_probably_utf8_text(content) {
            TEXT_PLAIN_UTF8
        } else {
            OCTET_STREAM
        }
    })
}

/// Guess whether the first [`SNIFF_LEN`] bytes are text.
///
/// Control bytes below 0x09 mark the content as binary. A byte >= 0x80 has
/// to pass all three lead-byte checks at once, which no byte does, so any
/// non-ASCII byte also marks it binary. Content-type choices for existing
/// files depend on exactly this boundary.
pub fn is_probably_utf8_text(content: &[u8]) -> bool {
    content.iter().take(SNIFF_LEN).all(|&b| {
        if b <= 0x08 {
            return false;
        }
        #[allow(clippy::nonminimal_bool)]
        let rejected = b >= 0x80 && ((b >> 5) != 0x6 || (b >> 4) != 0xe || (b >> 3) != 0x1e);
        !rejected
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(lookup("html"), Some("text/html"));
        assert_eq!(lookup("css"), Some("text/css"));
        assert_eq!(lookup("js"), Some("application/javascript"));
        assert_eq!(lookup("json"), Some("application/json"));
        assert_eq!(lookup("png"), Some("image/png"));
        assert_eq!(lookup("txt"), Some("text/plain"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(lookup("xyz"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_extension_case_insensitive() {
        let ct = content_type_for(Path::new("/srv/LOGO.PNG"), None, b"");
        assert_eq!(ct, "image/png");
    }

    #[test]
    fn test_default_mime_type_beats_sniffing() {
        let ct = content_type_for(Path::new("/srv/README"), Some("text/x-readme"), b"\x00\x01");
        assert_eq!(ct, "text/x-readme");
    }

    #[test]
    fn test_extension_beats_default() {
        let ct = content_type_for(Path::new("/srv/a.css"), Some("text/x-readme"), b"");
        assert_eq!(ct, "text/css");
    }

    #[test]
    fn test_sniff_ascii_text() {
        assert!(is_probably_utf8_text(b"hello\tworld\r\n"));
        assert!(is_probably_utf8_text(b""));
        assert_eq!(
            content_type_for(Path::new("/srv/Makefile"), None, b"all:\n\tcc main.c\n"),
            TEXT_PLAIN_UTF8
        );
    }

    #[test]
    fn test_sniff_control_bytes_are_binary() {
        assert!(!is_probably_utf8_text(b"\x00abc"));
        assert!(!is_probably_utf8_text(b"abc\x08"));
        assert!(is_probably_utf8_text(b"abc\x09"));
        assert_eq!(
            content_type_for(Path::new("/srv/blob"), None, b"\x7fELF\x02\x01\x01\x00"),
            OCTET_STREAM
        );
    }

    #[test]
    fn test_sniff_high_bytes_are_binary() {
        // two- and three-byte UTF-8 sequences both fall on the binary side
        assert!(!is_probably_utf8_text("café".as_bytes()));
        assert!(!is_probably_utf8_text("€".as_bytes()));
        assert!(!is_probably_utf8_text(&[0xff]));
    }

    #[test]
    fn test_sniff_only_inspects_prefix() {
        let mut content = vec![b'a'; SNIFF_LEN];
        content.push(0x00);
        assert!(is_probably_utf8_text(&content));

        content[SNIFF_LEN - 1] = 0x00;
        assert!(!is_probably_utf8_text(&content));
    }
}
