//! Directory listing module
//!
//! Renders an HTML index of a directory: one `<li>` per entry, a `..` link
//! below the root, and a breadcrumb heading built from the pathname.

use crate::config::DirlistOptions;
use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs::FileType;
use std::io;
use std::path::Path;
use tokio::fs;

/// Characters left as-is in generated links: unreserved marks plus the
/// sub-delimiters that are harmless inside a path. `?`, `#` and `%` are escaped.
const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// One listed directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Where a symlink points, when it could be read
    pub symlink_target: Option<String>,
}

/// Read `dir` and render its listing for `pathname` (which ends in `/`).
pub async fn create_listing_html(
    dir: &Path,
    pathname: &str,
    opts: DirlistOptions,
) -> io::Result<String> {
    let entries = read_entries(dir, opts.show_hidden).await?;
    Ok(render_listing(pathname, &entries))
}

/// Enumerate entries sorted by name, skipping dotfiles unless asked not to
pub async fn read_entries(dir: &Path, show_hidden: bool) -> io::Result<Vec<DirEntry>> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !show_hidden && name.starts_with('.') {
            continue;
        }

        let kind = entry_kind(entry.file_type().await.ok());
        // An unreadable link is still listed, just without its target
        let symlink_target = if kind == EntryKind::Symlink {
            fs::read_link(entry.path())
                .await
                .ok()
                .map(|t| t.to_string_lossy().into_owned())
        } else {
            None
        };

        entries.push(DirEntry {
            name,
            kind,
            symlink_target,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Entries whose type cannot be read are listed as plain files
fn entry_kind(file_type: Option<FileType>) -> EntryKind {
    match file_type {
        Some(ft) if ft.is_dir() => EntryKind::Directory,
        Some(ft) if ft.is_symlink() => EntryKind::Symlink,
        _ => EntryKind::File,
    }
}

/// Render the listing page
pub fn render_listing(pathname: &str, entries: &[DirEntry]) -> String {
    let mut items = Vec::with_capacity(entries.len() + 1);
    if pathname != "/" {
        items.push(r#"<li><a href="..">..</a></li>"#.to_string());
    }

    for entry in entries {
        let mut label = entry.name.clone();
        if entry.kind == EntryKind::Directory {
            label.push('/');
        }

        let mut item = format!(
            r#"<li><a href="{}">{}</a>"#,
            encode_double_quoted_attribute(&encode_href(&format!("{pathname}{label}"))),
            encode_text(&label)
        );
        if let Some(target) = &entry.symlink_target {
            item.push_str(&format!(
                r#" <span class="symlink" title="symlink">&rarr; {}</span>"#,
                encode_text(target)
            ));
        }
        item.push_str("</li>");
        items.push(item);
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    body {{ font-family:monospace; line-height:1.4; padding:2em }}
    ul {{ list-style:none;padding:0 }}
    a {{ text-decoration: none }}
    a:hover {{ text-decoration: underline }}
    .symlink {{ opacity:0.5 }}
  </style>
  <body>
    <h1>{heading}</h1>
    <ul>
      {items}
    </ul>
  </body>
</html>
"#,
        title = encode_text(pathname),
        heading = breadcrumb(pathname),
        items = items.join("\n      "),
    )
}

/// `/` link followed by one link per path segment
fn breadcrumb(pathname: &str) -> String {
    let mut dir = String::from("/");
    let links: Vec<String> = pathname
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            dir.push_str(segment);
            dir.push('/');
            format!(
                r#"<a href="{}">{}</a>"#,
                encode_double_quoted_attribute(&encode_href(&dir)),
                encode_text(segment)
            )
        })
        .collect();
    format!(r#"<a href="/">/</a>{}"#, links.join("/"))
}

/// Percent-encode a pathname for use in an `href` or `Location`
pub fn encode_href(pathname: &str) -> String {
    utf8_percent_encode(pathname, HREF).to_string()
}
