//
//  mod.rs
//  sitegraph
//
//  Created by hak (tharun)
//

mod resolve;
mod rules;
mod types;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

pub use resolve::{clean_literal, is_external, resolve, Resolution};
pub use types::{Reference, ReferenceKind};

use crate::inventory::FileKey;

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8192;

/// Extract every reference `content` makes, as seen from `source_key`.
///
/// External targets and things that are not paths are dropped. Targets that
/// climb above the project root are kept as evidence with `resolved: None`;
/// they never become graph edges.
pub fn extract_references(source_key: &str, content: &str) -> Vec<Reference> {
    let extension = extension_of(source_key);
    let rules: Vec<_> = rules::compiled_rules()
        .iter()
        .filter(|rule| rule.applies_to(&extension))
        .collect();

    let mut references = Vec::new();
    // (line, kind, literal): several patterns of one kind may hit the same text
    let mut seen: HashSet<(usize, ReferenceKind, String)> = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        for rule in &rules {
            for pattern in &rule.patterns {
                for literal in rules::captures(pattern, line) {
                    let resolved = match resolve(source_key, literal) {
                        Resolution::Resolved(key) => Some(key),
                        Resolution::Escapes => None,
                        Resolution::External | Resolution::NotAPath => continue,
                    };
                    let literal = literal.trim().to_string();
                    if !seen.insert((line_no, rule.kind, literal.clone())) {
                        continue;
                    }
                    references.push(Reference {
                        source: source_key.to_string(),
                        target: literal,
                        resolved,
                        line: line_no,
                        line_text: line.trim().to_string(),
                        kind: rule.kind,
                    });
                }
            }
        }
    }

    references
}

/// Read a file and extract its references.
///
/// Unreadable or binary files yield no references; extraction is evidence
/// gathering and never fails.
pub fn extract_file(source_key: &FileKey, path: &Path) -> Vec<Reference> {
    match read_text(path) {
        Some(content) => extract_references(source_key, &content),
        None => Vec::new(),
    }
}

/// Read a file as text. Invalid UTF-8 is decoded lossily; binary files
/// (NUL in the leading bytes) and I/O failures yield `None`.
pub fn read_text(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(file = %path.display(), error = %e, "unreadable file, no references");
            return None;
        }
    };
    if bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0) {
        debug!(file = %path.display(), "binary content, no references");
        return None;
    }
    Some(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

fn extension_of(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}
