//! Directive Parser
//!
//! Reads generator directives from the comment header of a template:
//!
//! ```text
//! @* Generator: Template
//!    TypeVisibility: Internal  DisableLinePragmas: true *@
//! @using System.Globalization
//! ```
//!
//! Every `key: value` pair inside the leading `@* ... *@` comments becomes a
//! directive, and `@using` lines in the same header become ordered imports.
//! The template text itself is never modified.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Selects the code transformer for the file.
pub const GENERATOR_KEY: &str = "Generator";
/// `public` or `internal` visibility for the generated class.
pub const TYPE_VISIBILITY_KEY: &str = "TypeVisibility";
/// Boolean switch turning off `#line` pragmas.
pub const DISABLE_LINE_PRAGMAS_KEY: &str = "DisableLinePragmas";
/// Namespace of the generated class.
pub const NAMESPACE_KEY: &str = "Namespace";
/// Suffix appended to the generated class name.
pub const CLASS_SUFFIX_KEY: &str = "ClassSuffix";

static DIRECTIVE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*:\s*([~\\/\w.\-]+)").expect("valid directive pattern"));

/// A malformed directive that was skipped. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveParseWarning {
    /// 1-based template line.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for DirectiveParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Directives of one template. Keys compare case-insensitively and keep their
/// first spelling; a missing key means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    entries: IndexMap<String, (String, String)>,
    imports: Vec<String>,
    warnings: Vec<DirectiveParseWarning>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let folded = key.to_ascii_lowercase();
        match self.entries.get_mut(&folded) {
            Some((_, existing)) => Some(std::mem::replace(existing, value.into())),
            None => {
                self.entries.insert(folded, (key, value.into()));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Boolean value of `key`; `None` when absent or not `true`/`false`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Namespaces from `@using` lines in the header, in order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn warnings(&self) -> &[DirectiveParseWarning] {
        &self.warnings
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Directives {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut directives = Directives::new();
        for (key, value) in iter {
            directives.insert(key, value);
        }
        directives
    }
}

/// Extracts `Directives` from template text.
pub struct DirectiveParser<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    directives: Directives,
}

impl<'a> DirectiveParser<'a> {
    pub fn parse(text: &'a str) -> Directives {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut parser = DirectiveParser {
            text,
            pos: 0,
            line: 1,
            directives: Directives::new(),
        };
        parser.parse_header();
        parser.directives
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.text[self.pos..self.pos + len];
        self.line += consumed.matches('\n').count();
        self.pos += len;
    }

    fn parse_header(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.advance(rest.len() - trimmed.len());

            if trimmed.starts_with("@*") {
                let Some(end) = trimmed[2..].find("*@") else {
                    self.warn(self.line, "unterminated directive comment");
                    return;
                };
                let body = &trimmed[2..2 + end];
                self.parse_comment(body, self.line);
                self.advance(end + 4);
            } else if let Some(after) = trimmed.strip_prefix("@using") {
                if !after.starts_with([' ', '\t']) {
                    return;
                }
                let line_len = trimmed.find('\n').unwrap_or(trimmed.len());
                let namespace = after[..line_len - "@using".len()]
                    .trim()
                    .trim_end_matches(';')
                    .trim();
                if namespace.is_empty() || namespace.starts_with('(') {
                    return;
                }
                self.directives.imports.push(namespace.to_string());
                self.advance(line_len);
            } else {
                return;
            }
        }
    }

    fn parse_comment(&mut self, body: &str, first_line: usize) {
        for (offset, line) in body.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut matched = false;
            for captures in DIRECTIVE_PAIR.captures_iter(trimmed) {
                matched = true;
                self.directives.insert(&captures[1], &captures[2]);
            }
            if !matched {
                self.warn(
                    first_line + offset,
                    &format!("ignored malformed directive '{}'", trimmed),
                );
            }
        }
    }

    fn warn(&mut self, line: usize, message: &str) {
        self.directives.warnings.push(DirectiveParseWarning {
            line,
            message: message.to_string(),
        });
    }
}
