//
//  dump.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::types::{Column, ForeignKey, SchemaTable};

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bCREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[`"]?\w+[`"]?\.)?[`"]?(\w+)[`"]?\s*\("#,
    )
    .expect("create table pattern is valid")
});

static MENTIONED_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:INSERT\s+INTO|ALTER\s+TABLE)\s+[`"]?(\w+)[`"]?"#)
        .expect("mentioned table pattern is valid")
});

static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[`"]?(\w+)[`"]?\s+(\w+)"#).expect("column pattern is valid")
});

static KEY_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]*)\)").expect("key list pattern is valid"));

static FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)FOREIGN\s+KEY\s*\(\s*[`"]?(\w+)[`"]?\s*\)\s*REFERENCES\s+[`"]?(\w+)[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#,
    )
    .expect("foreign key pattern is valid")
});

static INLINE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bREFERENCES\s+[`"]?(\w+)[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#)
        .expect("inline reference pattern is valid")
});

static INDEX_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:KEY|INDEX)\s+[`"]?(\w+)[`"]?\s*\("#).expect("index pattern is valid")
});

static ENGINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bENGINE\s*=\s*(\w+)").expect("engine pattern is valid"));

static CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:CHARSET|CHARACTER\s+SET)\s*=?\s*(\w+)").expect("charset pattern is valid")
});

/// Parse every `CREATE TABLE` in a SQL dump.
///
/// A table whose body cannot be delimited is skipped. Tables only mentioned
/// by `INSERT INTO` / `ALTER TABLE` produce no definition.
pub fn parse_dump(source_name: &str, text: &str) -> Vec<SchemaTable> {
    let mut tables = Vec::new();
    let mut defined: BTreeSet<String> = BTreeSet::new();

    for caps in CREATE_TABLE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_start = whole.end();
        let Some(body_end) = find_closing_paren(text, body_start) else {
            warn!(table = name.as_str(), source = source_name, "unterminated CREATE TABLE, skipped");
            continue;
        };

        let mut table = SchemaTable::new(name.as_str(), source_name);
        for item in split_top_level(&text[body_start..body_end]) {
            apply_item(&mut table, &item);
        }

        let trailer_end = text[body_end..]
            .find(';')
            .map_or(text.len(), |i| body_end + i);
        let trailer = &text[body_end + 1..trailer_end.max(body_end + 1)];
        table.engine = ENGINE.captures(trailer).map(|c| c[1].to_string());
        table.charset = CHARSET.captures(trailer).map(|c| c[1].to_string());

        defined.insert(table.name.to_lowercase());
        tables.push(table);
    }

    for caps in MENTIONED_TABLE.captures_iter(text) {
        let name = &caps[1];
        if defined.insert(name.to_lowercase()) {
            debug!(table = name, source = source_name, "table mentioned without CREATE TABLE, no definition");
        }
    }

    tables
}

/// Apply one comma-separated item of a CREATE TABLE body.
fn apply_item(table: &mut SchemaTable, item: &str) {
    let mut item = item.trim();
    let upper = item.to_uppercase();

    if upper.starts_with("CONSTRAINT") {
        // CONSTRAINT fk_name FOREIGN KEY (...) REFERENCES ...
        let rest = item["CONSTRAINT".len()..].trim_start();
        item = rest
            .find(char::is_whitespace)
            .map_or("", |i| rest[i..].trim_start());
        apply_item(table, item);
        return;
    }

    if upper.starts_with("PRIMARY KEY") {
        table.primary_keys.extend(key_list(item));
        return;
    }
    if upper.starts_with("FOREIGN KEY") {
        if let Some(caps) = FOREIGN_KEY.captures(item) {
            table.foreign_keys.push(ForeignKey {
                column: caps[1].to_string(),
                references_table: caps[2].to_string(),
                references_column: caps[3].to_string(),
            });
        }
        return;
    }
    if ["KEY", "INDEX", "UNIQUE", "FULLTEXT", "SPATIAL"]
        .iter()
        .any(|kw| upper.starts_with(kw))
    {
        if let Some(caps) = INDEX_NAME.captures(item) {
            table.indexes.push(caps[1].to_string());
        }
        return;
    }
    if upper.starts_with("CHECK") {
        return;
    }

    let Some(caps) = COLUMN.captures(item) else {
        return;
    };
    let name = caps[1].to_string();
    table.columns.push(Column {
        name: name.clone(),
        data_type: caps[2].to_uppercase(),
    });
    if upper.contains("PRIMARY KEY") && !table.primary_keys.contains(&name) {
        table.primary_keys.push(name.clone());
    }
    if let Some(r) = INLINE_REFERENCE.captures(item) {
        table.foreign_keys.push(ForeignKey {
            column: name,
            references_table: r[1].to_string(),
            references_column: r[2].to_string(),
        });
    }
}

/// Column names inside the first parenthesized list of `item`.
fn key_list(item: &str) -> Vec<String> {
    KEY_LIST
        .captures(item)
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|c| c.trim().trim_matches(['`', '"']).to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Byte offset of the `)` closing the paren opened just before `start`,
/// skipping quoted strings.
fn find_closing_paren(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Split a table body at commas that are outside parentheses and quotes.
/// `--` comment lines are dropped.
fn split_top_level(body: &str) -> Vec<String> {
    let cleaned: String = body
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in cleaned.chars() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    items.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        items.push(current);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"
-- MySQL dump
DROP TABLE IF EXISTS `users`;
CREATE TABLE `users` (
  `id` int(11) NOT NULL AUTO_INCREMENT,
  `email` varchar(255) NOT NULL DEFAULT '',
  `bio` text,
  `status` enum('active','banned') DEFAULT 'active',
  PRIMARY KEY (`id`),
  UNIQUE KEY `uniq_email` (`email`),
  KEY `idx_status` (`status`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;

CREATE TABLE IF NOT EXISTS posts (
  id INT PRIMARY KEY,
  user_id INT REFERENCES users(id),
  page VARCHAR(100),
  CONSTRAINT fk_author FOREIGN KEY (user_id) REFERENCES `users` (`id`)
);

INSERT INTO `users` VALUES (1,'a@b.c','see /about.php','active');
INSERT INTO `audit_log` VALUES (1);
"#;

    #[test]
    fn test_parse_mysql_dump() {
        let tables = parse_dump("dump.sql", DUMP);
        assert_eq!(tables.len(), 2);

        let users = &tables[0];
        assert_eq!(users.name, "users");
        let cols: Vec<_> = users
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.as_str()))
            .collect();
        assert_eq!(
            cols,
            vec![("id", "INT"), ("email", "VARCHAR"), ("bio", "TEXT"), ("status", "ENUM")]
        );
        assert_eq!(users.primary_keys, vec!["id"]);
        assert_eq!(users.indexes, vec!["uniq_email", "idx_status"]);
        assert_eq!(users.engine.as_deref(), Some("InnoDB"));
        assert_eq!(users.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(users.source, "dump.sql");
    }

    #[test]
    fn test_inline_and_constraint_keys() {
        let tables = parse_dump("dump.sql", DUMP);
        let posts = &tables[1];
        assert_eq!(posts.primary_keys, vec!["id"]);
        assert_eq!(posts.foreign_keys.len(), 2);
        assert!(posts
            .foreign_keys
            .iter()
            .all(|fk| fk.column == "user_id" && fk.references_table == "users"));
        assert_eq!(posts.engine, None);
    }

    #[test]
    fn test_insert_only_table_has_no_definition() {
        let tables = parse_dump("dump.sql", DUMP);
        assert!(tables.iter().all(|t| t.name != "audit_log"));
    }

    #[test]
    fn test_escaped_quote_in_default() {
        let text = "CREATE TABLE notes (\n  id INT,\n  body VARCHAR(40) DEFAULT 'it\\'s, here',\n  page VARCHAR(20)\n);";
        let tables = parse_dump("x.sql", text);
        let cols: Vec<_> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["id", "body", "page"]);
    }

    #[test]
    fn test_unterminated_table_skipped() {
        let text = "CREATE TABLE good (id INT);\nCREATE TABLE broken (id INT, name VARCHAR(10)";
        let tables = parse_dump("x.sql", text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "good");
    }

    #[test]
    fn test_split_respects_nesting() {
        let items = split_top_level("a DECIMAL(10,2), b ENUM('x,y','z'), c INT");
        assert_eq!(items.len(), 3);
    }
}
