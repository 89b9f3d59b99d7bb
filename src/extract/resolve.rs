//
//  resolve.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use crate::inventory::FileKey;

/// Prefixes that mark a target as living outside the project.
const EXTERNAL_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "//",
    "mailto:",
    "data:",
    "tel:",
    "javascript:",
];

/// Outcome of turning a literal target into a graph key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Root-relative key inside the project.
    Resolved(FileKey),
    /// Points at another origin; never an edge.
    External,
    /// Climbs above the project root.
    Escapes,
    /// Empty after cleanup, templated, or not file-like.
    NotAPath,
}

/// Strip surrounding whitespace, the query string and the fragment.
pub fn clean_literal(raw: &str) -> &str {
    let trimmed = raw.trim();
    let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    trimmed[..end].trim()
}

pub fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    EXTERNAL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Server-side or template interpolation we cannot evaluate.
fn is_dynamic(target: &str) -> bool {
    target.contains(['$', '<', '>', '{', '}', '+', '`'])
}

/// True when the last path segment carries an extension ("x.php").
fn is_file_like(target: &str) -> bool {
    let name = target.rsplit(['/', '\\']).next().unwrap_or(target);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => name[idx + 1..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Resolve `raw` as written in `source_key` to a project-root-relative key.
///
/// Leading `/` means root-relative; anything else is relative to the
/// directory of `source_key`. Resolution is lexical: `.` is dropped and
/// `..` pops a segment, and popping past the root yields `Escapes`.
pub fn resolve(source_key: &str, raw: &str) -> Resolution {
    if is_external(raw.trim()) {
        return Resolution::External;
    }
    let target = clean_literal(raw);
    if target.is_empty() || is_dynamic(target) || !is_file_like(target) {
        return Resolution::NotAPath;
    }

    let target = target.replace('\\', "/");
    let source = source_key.replace('\\', "/");
    let (mut segments, rest): (Vec<&str>, &str) = match target.strip_prefix('/') {
        Some(rest) => (Vec::new(), rest),
        None => {
            let mut dir: Vec<&str> = source.split('/').collect();
            dir.pop();
            (dir, target.as_str())
        }
    };

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Resolution::Escapes;
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Resolution::NotAPath;
    }
    Resolution::Resolved(segments.join("/"))
}
