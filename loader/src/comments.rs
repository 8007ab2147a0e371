//! Line-oriented comment scanner.
//!
//! Consecutive `#` lines directly above a key (or a TOML `[section]`) become
//! that key's comment, stored under its dotted path. A blank line discards
//! pending comment lines.
//!
//! # Example
//!
//! ```
//! use configgen_loader::{DocumentFormat, scan_comments};
//!
//! let text = "# HTTP server\n[server]\n# Listen port\n# (0 picks a free one)\nport = 8080\n";
//! let comments = scan_comments(text, DocumentFormat::Toml);
//! assert_eq!(comments["server"], "HTTP server");
//! assert_eq!(comments["server.port"], "Listen port\n(0 picks a free one)");
//! ```

use std::sync::LazyLock;

use configgen_core::CommentMap;
use regex::Regex;

use crate::DocumentFormat;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s?(.*)$").expect("static regex must compile"));
static TOML_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\[\]]+)\]\s*(#.*)?$").expect("static regex must compile"));
static TOML_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*=").expect("static regex must compile"));
static YAML_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *)([A-Za-z0-9_-]+)\s*:(\s|$)").expect("static regex must compile"));

/// Scans `text` for comments attached to keys.
pub fn scan_comments(text: &str, format: DocumentFormat) -> CommentMap {
    match format {
        DocumentFormat::Toml => scan_toml(text),
        DocumentFormat::Yaml => scan_yaml(text),
    }
}

fn scan_toml(text: &str) -> CommentMap {
    let mut comments = CommentMap::new();
    let mut section: Option<String> = None;
    let mut pending: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = TOML_SECTION_RE.captures(line) {
            let name = caps[1].trim().to_string();
            flush(&mut pending, &mut comments, &name);
            section = Some(name);
            continue;
        }

        if let Some(caps) = COMMENT_RE.captures(line) {
            push_pending(&mut pending, &caps[1]);
            continue;
        }

        if let Some(caps) = TOML_KEY_RE.captures(line) {
            let path = match &section {
                Some(section) => format!("{section}.{}", &caps[1]),
                None => caps[1].to_string(),
            };
            flush(&mut pending, &mut comments, &path);
            continue;
        }

        if line.trim().is_empty() {
            pending.clear();
        }
    }

    comments
}

fn scan_yaml(text: &str) -> CommentMap {
    let mut comments = CommentMap::new();
    // (indent, key) of the enclosing mappings
    let mut stack: Vec<(usize, String)> = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = COMMENT_RE.captures(line) {
            push_pending(&mut pending, &caps[1]);
            continue;
        }

        if let Some(caps) = YAML_KEY_RE.captures(line) {
            let indent = caps[1].len();
            while stack.last().is_some_and(|(level, _)| *level >= indent) {
                stack.pop();
            }
            let key = caps[2].to_string();
            let path = stack
                .iter()
                .map(|(_, k)| k.as_str())
                .chain(std::iter::once(key.as_str()))
                .collect::<Vec<_>>()
                .join(".");
            flush(&mut pending, &mut comments, &path);
            stack.push((indent, key));
            continue;
        }

        if line.trim().is_empty() {
            pending.clear();
        }
    }

    comments
}

fn push_pending(pending: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        pending.push(line.to_string());
    }
}

fn flush(pending: &mut Vec<String>, comments: &mut CommentMap, path: &str) {
    if !pending.is_empty() {
        comments.insert(path.to_string(), pending.join("\n"));
        pending.clear();
    }
}
