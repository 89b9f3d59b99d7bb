//
//  types.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inventory::FileKey;

/// How a file refers to another artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    Include,
    Hyperlink,
    FormAction,
    Redirect,
    RouteTable,
    AjaxEndpoint,
    ClientNavigation,
    AssetLink,
    StylesheetImport,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 9] = [
        ReferenceKind::Include,
        ReferenceKind::Hyperlink,
        ReferenceKind::FormAction,
        ReferenceKind::Redirect,
        ReferenceKind::RouteTable,
        ReferenceKind::AjaxEndpoint,
        ReferenceKind::ClientNavigation,
        ReferenceKind::AssetLink,
        ReferenceKind::StylesheetImport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Include => "include",
            ReferenceKind::Hyperlink => "hyperlink",
            ReferenceKind::FormAction => "form-action",
            ReferenceKind::Redirect => "redirect",
            ReferenceKind::RouteTable => "route-table",
            ReferenceKind::AjaxEndpoint => "ajax-endpoint",
            ReferenceKind::ClientNavigation => "client-navigation",
            ReferenceKind::AssetLink => "asset-link",
            ReferenceKind::StylesheetImport => "stylesheet-import",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single located piece of evidence that `source` points at `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub source: FileKey,
    /// Target as literally written in the source.
    pub target: String,
    /// Project-root-relative key, or `None` when the target escapes the root.
    pub resolved: Option<FileKey>,
    /// 1-based line number.
    pub line: usize,
    /// The line the reference was found on, trimmed.
    pub line_text: String,
    pub kind: ReferenceKind,
}

impl Reference {
    /// Line text truncated for display.
    pub fn snippet(&self, max_len: usize) -> String {
        if self.line_text.chars().count() <= max_len {
            return self.line_text.clone();
        }
        let cut: String = self.line_text.chars().take(max_len).collect();
        format!("{cut}...")
    }
}
