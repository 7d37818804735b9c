//! Frontmatter parsing for `SKILL.md` and agent markdown files.
//!
//! Supports the subset of YAML these files use in practice:
//!
//! - `key: value` scalars, with one pair of surrounding quotes stripped
//! - `key:` followed by indented `child: value` lines (one level of nesting),
//!   or by indented `- item` lines (collected as a comma-separated list)
//! - block scalars introduced by `|`, `>` or their chomped variants, folded
//!   into a single space-joined line
//!
//! Parsing never fails. Anything the parser does not understand is skipped.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";
const DESCRIPTION_LIMIT: usize = 200;
const BLOCK_INDICATORS: &[&str] = &["|", ">", "|-", "|+", ">-", ">+"];

/// Key/value data from the head of a document plus the remaining body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Top-level scalar values.
    pub fields: BTreeMap<String, String>,
    /// One level of nested objects, keyed by parent key.
    pub nested: BTreeMap<String, BTreeMap<String, String>>,
    /// Text after the closing delimiter, or the whole input when there is no
    /// (closed) frontmatter block.
    pub body: String,
    /// Whether a closed frontmatter block was found.
    pub present: bool,
}

/// Result of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Declared `name`, or the fallback.
    pub name: String,
    /// Declared `description`, or the first body paragraph; may be empty.
    pub description: String,
    /// Everything else the header declared.
    pub frontmatter: Frontmatter,
}

/// Parses a document, falling back to `fallback_name` and the first body
/// paragraph when `name` or `description` are not declared.
#[must_use]
pub fn parse(content: &str, fallback_name: &str) -> ParsedDocument {
    let frontmatter = Frontmatter::parse(content);
    let name = frontmatter
        .get("name")
        .map_or_else(|| fallback_name.to_string(), str::to_string);
    let description = frontmatter
        .get("description")
        .map(str::to_string)
        .or_else(|| first_paragraph(&frontmatter.body))
        .unwrap_or_default();

    ParsedDocument {
        name,
        description,
        frontmatter,
    }
}

impl Frontmatter {
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = content.split_inclusive('\n').collect();

        let is_delimiter = |line: &str| line.trim_end_matches(['\n', '\r']) == DELIMITER;
        let closing = match lines.first() {
            Some(first) if is_delimiter(first) => lines
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, line)| is_delimiter(line))
                .map(|(i, _)| i),
            _ => None,
        };

        let Some(closing) = closing else {
            return Self {
                body: content.to_string(),
                ..Self::default()
            };
        };

        let header: Vec<&str> = lines[1..closing]
            .iter()
            .map(|line| line.trim_end_matches(['\n', '\r']))
            .collect();
        let mut parsed = Parser::default().run(&header);
        parsed.body = lines[closing + 1..].concat();
        parsed.present = true;
        parsed
    }

    /// Non-empty top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Top-level value coerced with [`parse_bool`].
    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(parse_bool)
    }

    /// Top-level value coerced with [`parse_list`]; empty when absent.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(parse_list).unwrap_or_default()
    }

    #[must_use]
    pub fn object(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        self.nested.get(key)
    }
}

#[derive(Default)]
enum Open {
    #[default]
    Nothing,
    Object {
        key: String,
        indent: Option<usize>,
        children: BTreeMap<String, String>,
        items: Vec<String>,
    },
    Block {
        key: String,
        indent: Option<usize>,
        parts: Vec<String>,
    },
}

#[derive(Default)]
struct Parser {
    out: Frontmatter,
    open: Open,
}

impl Parser {
    fn run(mut self, lines: &[&str]) -> Frontmatter {
        let mut i = 0;
        while i < lines.len() {
            if self.feed(lines[i]) {
                i += 1;
            }
        }
        self.close();
        self.out
    }

    /// Handles one line. Returns `false` when the line closed an open
    /// construct and must be fed again at top level.
    fn feed(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();

        match &mut self.open {
            Open::Nothing => {
                self.top_level(trimmed);
                true
            }
            Open::Block { indent: fixed, parts, .. } => {
                if trimmed.is_empty() {
                    return true;
                }
                match *fixed {
                    None if indent > 0 => *fixed = Some(indent),
                    Some(n) if indent >= n => {}
                    _ => {
                        self.close();
                        return false;
                    }
                }
                parts.push(trimmed.to_string());
                true
            }
            Open::Object {
                indent: fixed,
                children,
                items,
                ..
            } => {
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return true;
                }
                // `key:` followed by `- item` at the key's own indent
                let is_item = trimmed == "-" || trimmed.starts_with("- ");
                let indentless_item =
                    indent == 0 && is_item && children.is_empty() && matches!(*fixed, None | Some(0));
                match *fixed {
                    _ if indentless_item => *fixed = Some(0),
                    None if indent > 0 => *fixed = Some(indent),
                    Some(n) if n > 0 && indent >= n => {}
                    _ => {
                        self.close();
                        return false;
                    }
                }
                if let Some(item) = trimmed.strip_prefix('-') {
                    let item = strip_quotes(item.trim());
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                } else if let Some((key, value)) = split_key_value(trimmed) {
                    children.insert(key.to_string(), strip_quotes(value).to_string());
                }
                true
            }
        }
    }

    fn top_level(&mut self, trimmed: &str) {
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        let Some((key, value)) = split_key_value(trimmed) else {
            return;
        };
        let key = key.to_string();

        if value.is_empty() {
            self.open = Open::Object {
                key,
                indent: None,
                children: BTreeMap::new(),
                items: Vec::new(),
            };
        } else if BLOCK_INDICATORS.contains(&value) {
            self.open = Open::Block {
                key,
                indent: None,
                parts: Vec::new(),
            };
        } else {
            self.out.fields.insert(key, strip_quotes(value).to_string());
        }
    }

    fn close(&mut self) {
        match std::mem::take(&mut self.open) {
            Open::Nothing => {}
            Open::Block { key, parts, .. } => {
                self.out.fields.insert(key, parts.join(" "));
            }
            Open::Object {
                key,
                children,
                items,
                ..
            } => {
                if !items.is_empty() {
                    self.out.fields.insert(key.clone(), items.join(", "));
                }
                if !children.is_empty() {
                    self.out.nested.insert(key, children);
                }
            }
        }
    }
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// `true|yes|1` and `false|no|0`, case-insensitive.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// `[a, "b"]` or `a, b` → `["a", "b"]`.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|item| strip_quotes(item.trim()).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// First prose paragraph of a markdown body, truncated for display.
///
/// Leading blank lines and headings are skipped; the paragraph ends at the
/// next blank line or heading.
#[must_use]
pub fn first_paragraph(body: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            if parts.is_empty() {
                continue;
            }
            break;
        }
        parts.push(line);
    }

    if parts.is_empty() {
        return None;
    }
    Some(truncate(&parts.join(" "), DESCRIPTION_LIMIT))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    let clean = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    let clean = clean.trim_end_matches(|c: char| c.is_whitespace() || ",;:-".contains(c));
    format!("{clean}...")
}
