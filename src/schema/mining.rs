//
//  mining.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::types::MinedPath;
use crate::inventory::FileKey;

/// Path-like literals that show up inside stored data.
static PATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)https?://[^\s'"<>()]+"#,
        r"(?i)/[a-z0-9_\-/]+\.(?:php|html|htm|js|css)\b",
        r#"(?i)['"]([a-z0-9_\-/]+\.(?:php|html|htm))['"]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("path mining pattern is valid"))
    .collect()
});

/// A stored value that is, in its entirety, a relative path ("legacy/old.php").
static BARE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9_\-./]+\.(?:php|html|htm|js|ts|css)(?:[?#]\S*)?$")
        .expect("bare value pattern is valid")
});

/// Reduce a raw hit to a root-relative literal. Full URLs keep only the
/// path after the host.
pub fn clean_mined(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        // scheme, "", host, path
        text = text.splitn(4, '/').nth(3)?;
    }
    let end = text.find(['?', '#']).unwrap_or(text.len());
    let cleaned = text[..end].trim().trim_matches('/');
    let name = cleaned.rsplit('/').next().unwrap_or(cleaned);
    if cleaned.is_empty() || !name.contains('.') {
        return None;
    }
    Some(cleaned.to_string())
}

/// Every distinct path literal in `text`, tagged with `origin:line`.
pub fn mine_text(origin: &str, text: &str) -> Vec<MinedPath> {
    let mut mined = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let mut seen = BTreeSet::new();
        for pattern in PATH_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                let Some(hit) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                if let Some(literal) = clean_mined(hit.as_str()) {
                    if seen.insert(literal.clone()) {
                        mined.push(MinedPath {
                            literal,
                            origin: format!("{origin}:{}", idx + 1),
                        });
                    }
                }
            }
        }
    }
    mined
}

/// Mine one database value. A value that is itself a path is taken whole;
/// anything else is scanned like dump text.
pub fn mine_value(origin: &str, value: &str) -> Vec<MinedPath> {
    let trimmed = value.trim();
    if BARE_VALUE.is_match(trimmed) {
        return clean_mined(trimmed)
            .map(|literal| MinedPath {
                literal,
                origin: origin.to_string(),
            })
            .into_iter()
            .collect();
    }
    mine_text(origin, value)
}

/// Match a mined literal against inventory keys (in key order): an exact
/// key wins, otherwise the first key where one string ends with the other.
pub fn match_to_inventory<'k>(
    literal: &str,
    keys: impl IntoIterator<Item = &'k FileKey> + Clone,
) -> Option<&'k FileKey> {
    if let Some(exact) = keys.clone().into_iter().find(|k| k.as_str() == literal) {
        return Some(exact);
    }
    keys.into_iter()
        .find(|k| k.ends_with(literal) || literal.ends_with(k.as_str()))
}
