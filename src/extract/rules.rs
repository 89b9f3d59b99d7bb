//
//  rules.rs
//  sitegraph
//
//  Reference detection rules. One table per ReferenceKind, dispatched through
//  a fixed list. Every pattern captures the target literal; when a pattern
//  has several groups the last participating group wins.
//

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::ReferenceKind;

// ── Rule Types ───────────────────────────────────────────────────────────────

/// Which files a rule runs on, by lowercased extension.
#[derive(Clone, Copy)]
enum Scope {
    Any,
    Only(&'static [&'static str]),
    Except(&'static [&'static str]),
}

impl Scope {
    fn admits(self, extension: &str) -> bool {
        match self {
            Scope::Any => true,
            Scope::Only(exts) => exts.contains(&extension),
            Scope::Except(exts) => !exts.contains(&extension),
        }
    }
}

/// Detection rule for one reference kind.
struct KindRule {
    kind: ReferenceKind,
    scope: Scope,
    patterns: &'static [&'static str],
}

const SCRIPT_EXTS: &[&str] = &[".js", ".ts", ".mjs", ".cjs", ".jsx", ".tsx"];
const DATA_EXTS: &[&str] = &[".js", ".ts", ".mjs", ".cjs", ".jsx", ".tsx", ".json", ".css"];

// ── Kind Tables ──────────────────────────────────────────────────────────────

const INCLUDE: KindRule = KindRule {
    kind: ReferenceKind::Include,
    scope: Scope::Except(DATA_EXTS),
    patterns: &[r#"(?i)\b(?:include|require)(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#],
};

const HYPERLINK: KindRule = KindRule {
    kind: ReferenceKind::Hyperlink,
    scope: Scope::Any,
    patterns: &[r#"(?i)\bhref\s*=\s*['"]([^'"]+)['"]"#],
};

const FORM_ACTION: KindRule = KindRule {
    kind: ReferenceKind::FormAction,
    scope: Scope::Any,
    patterns: &[r#"(?i)\baction\s*=\s*['"]([^'"]+)['"]"#],
};

const REDIRECT: KindRule = KindRule {
    kind: ReferenceKind::Redirect,
    scope: Scope::Any,
    patterns: &[
        // header('Location: login.php')
        r#"(?i)\bheader\s*\(\s*['"]\s*Location:\s*([^'"]+)['"]"#,
        // Location headers assembled elsewhere
        r#"(?i)['"]Location:\s*([^'"\s]+)['"]"#,
    ],
};

const ROUTE_TABLE: KindRule = KindRule {
    kind: ReferenceKind::RouteTable,
    scope: Scope::Any,
    patterns: &[
        // $routes['home'] = 'home.php' (prefers the assigned value)
        r#"(?i)\$routes?\[\s*['"]([^'"]+)['"]\s*\](?:\s*=>?\s*['"]([^'"]+)['"])?"#,
        // Router::get('/users', 'users.php')
        r#"(?i)\bRouter::(?:get|post|put|delete|patch)\s*\(\s*['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#,
        // switch dispatch: case 'about.php':
        r#"(?i)\bcase\s+['"]([^'"]+\.php[^'"]*)['"]\s*:"#,
    ],
};

const AJAX_ENDPOINT: KindRule = KindRule {
    kind: ReferenceKind::AjaxEndpoint,
    scope: Scope::Any,
    patterns: &[
        r#"(?i)\bfetch\s*\(\s*['"`]([^'"`]+)['"`]"#,
        r#"(?i)['"]?\b(?:url|endpoint)['"]?\s*:\s*['"]([^'"]+)['"]"#,
        r#"(?i)\$\.(?:get|post|ajax|getjson|load)\s*\(\s*['"]([^'"]+)['"]"#,
        r#"(?i)\baxios\.(?:get|post|put|delete|patch)\s*\(\s*['"]([^'"]+)['"]"#,
    ],
};

const CLIENT_NAVIGATION: KindRule = KindRule {
    kind: ReferenceKind::ClientNavigation,
    scope: Scope::Any,
    patterns: &[
        r#"(?i)(?:window\.|document\.)?\blocation(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#,
        r#"(?i)\blocation\.(?:assign|replace)\s*\(\s*['"]([^'"]+)['"]"#,
        r#"(?i)\bwindow\.open\s*\(\s*['"]([^'"]+)['"]"#,
    ],
};

const ASSET_LINK: KindRule = KindRule {
    kind: ReferenceKind::AssetLink,
    scope: Scope::Any,
    patterns: &[
        r#"(?i)\bsrc\s*=\s*['"]([^'"]+)['"]"#,
        r#"(?i)<link\b[^>]*\bhref\s*=\s*['"]([^'"]+)['"]"#,
        r#"['"]([^'"\s]+\.json)['"]"#,
        r#"(?i)['"]path['"]\s*:\s*['"]([^'"]+)['"]"#,
    ],
};

/// Module loads. `require('x')` is an include in PHP, so scripts only.
const SCRIPT_MODULES: KindRule = KindRule {
    kind: ReferenceKind::AssetLink,
    scope: Scope::Only(SCRIPT_EXTS),
    patterns: &[
        r#"\brequire\s*\(\s*['"]([^'"]+)['"]"#,
        r#"\bimport\s+[^'";]*?\s+from\s+['"]([^'"]+)['"]"#,
        r#"\bimport\s*\(?\s*['"]([^'"]+)['"]"#,
    ],
};

const STYLESHEET_IMPORT: KindRule = KindRule {
    kind: ReferenceKind::StylesheetImport,
    scope: Scope::Any,
    patterns: &[r#"(?i)@import\s+(?:url\(\s*)?['"]?([^'")\s;]+)"#],
};

const STYLESHEET_URL: KindRule = KindRule {
    kind: ReferenceKind::StylesheetImport,
    scope: Scope::Only(&[".css"]),
    patterns: &[r#"(?i)\burl\(\s*['"]?([^'")\s]+)['"]?\s*\)"#],
};

const RULES: &[&KindRule] = &[
    &INCLUDE,
    &HYPERLINK,
    &FORM_ACTION,
    &REDIRECT,
    &ROUTE_TABLE,
    &AJAX_ENDPOINT,
    &CLIENT_NAVIGATION,
    &ASSET_LINK,
    &SCRIPT_MODULES,
    &STYLESHEET_IMPORT,
    &STYLESHEET_URL,
];

// ── Compiled Rules ───────────────────────────────────────────────────────────

pub(crate) struct CompiledRule {
    pub kind: ReferenceKind,
    scope: Scope,
    pub patterns: Vec<Regex>,
}

impl CompiledRule {
    pub fn applies_to(&self, extension: &str) -> bool {
        self.scope.admits(extension)
    }
}

static COMPILED: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| CompiledRule {
            kind: rule.kind,
            scope: rule.scope,
            patterns: rule
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("reference rule pattern is valid"))
                .collect(),
        })
        .collect()
});

/// All rules in dispatch order.
pub(crate) fn compiled_rules() -> &'static [CompiledRule] {
    &COMPILED
}

/// Every literal a pattern captures on one line.
pub(crate) fn captures<'t>(pattern: &Regex, line: &'t str) -> Vec<&'t str> {
    pattern
        .captures_iter(line)
        .filter_map(|caps| {
            (1..caps.len())
                .rev()
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str())
        })
        .collect()
}
