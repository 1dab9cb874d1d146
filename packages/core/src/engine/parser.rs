//! Markup Parser
//!
//! Splits template text into literal markup and code spans. The supported
//! syntax is the Razor subset the generator understands:
//!
//! - `@@` escapes, `@* comments *@`
//! - implicit expressions `@a.b(c)[d]` and explicit expressions `@( ... )`
//! - code blocks `@{ ... }` with nested `<element>` markup and `@:` text lines
//! - control statements (`@if`, `@foreach`, ...) whose bodies are code blocks
//! - the `@using`, `@inherits`, `@functions` keywords, and `@model` for the MVC parser
//! - `@helper Name(parameters) { ... }` blocks
//!
//! Errors never stop the parse; they are collected next to the nodes.

use super::ParserError;
use crate::config::ParserStrategy;
use once_cell::sync::Lazy;
use regex::Regex;

static CR_OR_CRLF_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());

/// Elements that never take a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Statement keywords whose body is a code block.
const BLOCK_KEYWORDS: [&str; 9] = [
    "if", "foreach", "for", "while", "switch", "lock", "using", "try", "do",
];

/// One-based position in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// A span of template text classified by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Markup written to the output as-is.
    Literal(String),
    /// Expression whose value is written to the output.
    Expression {
        code: String,
        location: SourceLocation,
    },
    /// Statements copied into the render method.
    Code {
        code: String,
        location: SourceLocation,
    },
    Using {
        namespace: String,
        location: SourceLocation,
    },
    Inherits {
        base_type: String,
        location: SourceLocation,
    },
    Model {
        model_type: String,
        location: SourceLocation,
    },
    /// Class-level members.
    Functions {
        code: String,
        location: SourceLocation,
    },
    /// A reusable markup method; `body` holds the nodes of its code block.
    Helper {
        name: String,
        parameters: String,
        body: Vec<MarkupNode>,
        location: SourceLocation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkupMode {
    /// Top level: runs to the end of input.
    Document,
    /// Markup inside code: runs until the outermost element closes.
    Element,
    /// `@:` text: runs to the end of the line.
    Line,
}

struct OpenTag {
    name: String,
    closing: bool,
    literal_start: usize,
}

pub struct MarkupParser {
    chars: Vec<char>,
    pos: usize,
    line_starts: Vec<usize>,
    strategy: ParserStrategy,
    nodes: Vec<MarkupNode>,
    /// Nodes below this index belong to an enclosing scope and are never merged into.
    node_floor: usize,
    errors: Vec<ParserError>,
}

impl MarkupParser {
    pub fn new(text: &str, strategy: ParserStrategy) -> Self {
        let text = CR_OR_CRLF_REGEXP.replace_all(text.trim_start_matches('\u{feff}'), "\n");
        let chars: Vec<char> = text.chars().collect();
        let mut line_starts = vec![0];
        line_starts.extend(
            chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == '\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            chars,
            pos: 0,
            line_starts,
            strategy,
            nodes: Vec::new(),
            node_floor: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> (Vec<MarkupNode>, Vec<ParserError>) {
        self.parse_markup(MarkupMode::Document);
        (self.nodes, self.errors)
    }

    // ---- cursor ----

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn location(&self, pos: usize) -> SourceLocation {
        let line = match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        SourceLocation {
            line: line + 1,
            column: pos - self.line_starts[line] + 1,
        }
    }

    fn error(&mut self, message: impl Into<String>, pos: usize) {
        let location = self.location(pos);
        self.errors.push(ParserError::new(message, location));
    }

    fn identifier_at(&self, pos: usize) -> String {
        match self.chars.get(pos) {
            Some(c) if is_identifier_start(*c) => self.chars[pos..]
                .iter()
                .take_while(|c| is_identifier_part(**c))
                .collect(),
            _ => String::new(),
        }
    }

    fn take_identifier(&mut self) -> String {
        let identifier = self.identifier_at(self.pos);
        self.pos += identifier.chars().count();
        identifier
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Tag name and closing flag when `pos` starts `<name` or `</name`.
    fn tag_at(&self, pos: usize) -> Option<(String, bool)> {
        if self.chars.get(pos) != Some(&'<') {
            return None;
        }
        let mut start = pos + 1;
        let closing = self.chars.get(start) == Some(&'/');
        if closing {
            start += 1;
        }
        if !self.chars.get(start).is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let name = self.chars[start..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || **c == '-' || **c == ':')
            .collect();
        Some((name, closing))
    }

    /// End of the current line (past the newline) when only blanks remain on it.
    fn blank_line_end(&self) -> Option<usize> {
        let mut i = self.pos;
        while let Some(c) = self.chars.get(i) {
            match c {
                ' ' | '\t' => i += 1,
                '\n' => return Some(i + 1),
                _ => return None,
            }
        }
        Some(i)
    }

    // ---- output ----

    fn push_node(&mut self, node: MarkupNode) {
        if let MarkupNode::Literal(text) = &node {
            if text.is_empty() {
                return;
            }
            if self.nodes.len() > self.node_floor {
                if let Some(MarkupNode::Literal(previous)) = self.nodes.last_mut() {
                    previous.push_str(text);
                    return;
                }
            }
        }
        self.nodes.push(node);
    }

    fn flush_literal(&mut self, literal: &mut String) {
        if !literal.is_empty() {
            self.push_node(MarkupNode::Literal(std::mem::take(literal)));
        }
    }

    fn flush_code(&mut self, code: &mut String, start: &mut Option<usize>) {
        let text = std::mem::take(code);
        if let Some(start) = start.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let location = self.location(start);
                self.push_node(MarkupNode::Code {
                    code: trimmed.to_string(),
                    location,
                });
            }
        }
    }

    /// Drops the indentation in front of a block construct that starts a line.
    fn begin_block(&mut self, literal: &mut String) {
        let mut start = self.pos;
        while start > 0 && matches!(self.chars[start - 1], ' ' | '\t') {
            start -= 1;
        }
        if start == 0 || self.chars[start - 1] == '\n' {
            let indent = self.pos - start;
            let len = literal.len();
            if indent <= len
                && literal.as_bytes()[len - indent..]
                    .iter()
                    .all(|b| *b == b' ' || *b == b'\t')
            {
                literal.truncate(len - indent);
            }
        }
        self.flush_literal(literal);
    }

    /// Swallows the rest of the line after a block construct when it is blank.
    fn end_block(&mut self) {
        if let Some(end) = self.blank_line_end() {
            self.pos = end;
        }
    }

    // ---- markup ----

    fn parse_markup(&mut self, mode: MarkupMode) {
        let start = self.pos;
        let mut literal = String::new();
        let mut depth = 0usize;
        let mut root: Option<String> = None;
        let mut open_tag: Option<OpenTag> = None;

        while let Some(c) = self.peek() {
            if c == '@' {
                self.parse_transition(&mut literal);
                continue;
            }

            match mode {
                MarkupMode::Line if c == '\n' => {
                    literal.push('\n');
                    self.pos += 1;
                    break;
                }
                MarkupMode::Element if open_tag.is_none() && c == '<' => {
                    if let Some((name, closing)) = self.tag_at(self.pos) {
                        root.get_or_insert_with(|| name.clone());
                        open_tag = Some(OpenTag {
                            name,
                            closing,
                            literal_start: literal.len(),
                        });
                    }
                }
                MarkupMode::Element if c == '>' && open_tag.is_some() => {
                    let Some(tag) = open_tag.take() else {
                        continue;
                    };
                    let self_closing = self.pos > 0 && self.chars[self.pos - 1] == '/';
                    self.pos += 1;

                    // `<text>` only marks a markup span; it is not output.
                    if tag.name.eq_ignore_ascii_case("text") {
                        literal.truncate(tag.literal_start);
                    } else {
                        literal.push('>');
                    }

                    if tag.closing {
                        depth = depth.saturating_sub(1);
                    } else if !self_closing && !is_void_element(&tag.name) {
                        depth += 1;
                    }

                    if depth == 0 {
                        if let Some(end) = self.blank_line_end() {
                            literal.extend(&self.chars[self.pos..end]);
                            self.pos = end;
                        }
                        break;
                    }
                    continue;
                }
                _ => {}
            }

            literal.push(c);
            self.pos += 1;
        }

        if mode == MarkupMode::Element && (depth > 0 || open_tag.is_some()) && self.peek().is_none()
        {
            let name = root.unwrap_or_default();
            self.error(format!("The '{}' element was not closed", name), start);
        }
        self.flush_literal(&mut literal);
    }

    fn parse_transition(&mut self, literal: &mut String) {
        let at = self.pos;
        let next = self.peek_at(1);

        // e-mail addresses and the like
        if at > 0 && self.chars[at - 1].is_alphanumeric() && next.is_some_and(is_identifier_part) {
            literal.push('@');
            self.pos += 1;
            return;
        }

        match next {
            Some('@') => {
                literal.push('@');
                self.pos += 2;
            }
            Some('*') => {
                self.begin_block(literal);
                self.parse_comment(at);
                self.end_block();
            }
            Some('(') => {
                self.flush_literal(literal);
                self.pos += 1;
                self.parse_explicit_expression(at);
            }
            Some('{') => {
                self.begin_block(literal);
                self.pos += 2;
                self.parse_code_block(at + 1);
                self.end_block();
            }
            Some(c) if is_identifier_start(c) => {
                self.pos += 1;
                self.parse_keyword_or_expression(at, literal);
            }
            _ => {
                self.error("Unexpected character after '@'", at);
                literal.push('@');
                self.pos += 1;
            }
        }
    }

    fn parse_comment(&mut self, at: usize) {
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.peek() == Some('*') && self.peek_at(1) == Some('@') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        self.error("The comment is not terminated; '*@' is missing", at);
    }

    fn parse_explicit_expression(&mut self, at: usize) {
        let location = self.location(at + 2);
        match self.read_balanced('(', ')') {
            Some(code) if code.trim().is_empty() => {
                self.error("The explicit expression is empty", at);
            }
            Some(code) => self.push_node(MarkupNode::Expression {
                code: code.trim().to_string(),
                location,
            }),
            None => self.error(
                "The explicit expression is missing a closing ')' character",
                at,
            ),
        }
    }

    fn parse_keyword_or_expression(&mut self, at: usize, literal: &mut String) {
        let word = self.identifier_at(self.pos);
        match word.as_str() {
            "using" if !self.statement_follows(word.len()) => {
                self.parse_directive(at, literal, "a namespace")
            }
            "inherits" => self.parse_directive(at, literal, "a type name"),
            "model" if self.strategy == ParserStrategy::Mvc => {
                self.parse_directive(at, literal, "a type name")
            }
            "functions" => {
                self.begin_block(literal);
                self.parse_functions(at);
                self.end_block();
            }
            "helper" => {
                self.begin_block(literal);
                self.parse_helper(at);
                self.end_block();
            }
            keyword if BLOCK_KEYWORDS.contains(&keyword) => {
                self.begin_block(literal);
                self.parse_statement_block(at, &word);
                self.end_block();
            }
            _ => {
                self.flush_literal(literal);
                self.parse_implicit_expression(at);
            }
        }
    }

    /// Whether the keyword at the cursor opens a parenthesised statement.
    fn statement_follows(&self, keyword_len: usize) -> bool {
        self.chars[self.pos + keyword_len..]
            .iter()
            .find(|c| !matches!(c, ' ' | '\t'))
            .is_some_and(|c| *c == '(')
    }

    fn parse_directive(&mut self, at: usize, literal: &mut String, expected: &str) {
        self.begin_block(literal);
        let keyword = self.take_identifier();
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }

        let value_start = self.pos;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                break;
            }
            value.push(c);
        }
        let value = value.trim().trim_end_matches(';').trim().to_string();
        if value.is_empty() {
            self.error(
                format!("The '{}' keyword must be followed by {}", keyword, expected),
                at,
            );
            return;
        }

        let location = self.location(value_start);
        let node = match keyword.as_str() {
            "using" => MarkupNode::Using {
                namespace: value,
                location,
            },
            "inherits" => MarkupNode::Inherits {
                base_type: value,
                location,
            },
            _ => MarkupNode::Model {
                model_type: value,
                location,
            },
        };
        self.push_node(node);
    }

    fn parse_functions(&mut self, at: usize) {
        self.take_identifier();
        self.skip_whitespace();
        if self.peek() != Some('{') {
            self.error("The 'functions' keyword must be followed by a '{'", at);
            return;
        }

        let location = self.location(self.pos + 1);
        match self.read_balanced('{', '}') {
            Some(code) => self.push_node(MarkupNode::Functions { code, location }),
            None => self.error(
                "The functions block is missing a closing '}' character",
                at,
            ),
        }
    }

    fn parse_helper(&mut self, at: usize) {
        self.take_identifier();
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }

        let location = self.location(self.pos);
        let name = self.take_identifier();
        if name.is_empty() {
            self.error("The 'helper' keyword must be followed by an identifier", at);
            return;
        }
        if self.peek() != Some('(') {
            self.error(
                format!("The '{}' helper must be followed by a parameter list", name),
                at,
            );
            return;
        }
        let Some(parameters) = self.read_balanced('(', ')') else {
            self.error(
                "The helper parameter list is missing a closing ')' character",
                at,
            );
            return;
        };
        self.skip_whitespace();
        if self.peek() != Some('{') {
            self.error(
                format!("Expected a '{{' after the '{}' helper signature", name),
                at,
            );
            return;
        }

        let brace = self.pos;
        self.pos += 1;
        let mark = self.nodes.len();
        let floor = std::mem::replace(&mut self.node_floor, mark);
        self.parse_code_block(brace);
        self.node_floor = floor;

        let body = self.nodes.split_off(mark);
        self.push_node(MarkupNode::Helper {
            name,
            parameters: parameters.trim().to_string(),
            body,
            location,
        });
    }

    fn parse_implicit_expression(&mut self, at: usize) {
        let location = self.location(self.pos);
        let mut code = self.take_identifier();

        loop {
            match self.peek() {
                Some('.') if self.peek_at(1).is_some_and(is_identifier_start) => {
                    self.pos += 1;
                    code.push('.');
                    code.push_str(&self.take_identifier());
                }
                Some(open @ ('(' | '[')) => {
                    let close = if open == '(' { ')' } else { ']' };
                    match self.read_balanced(open, close) {
                        Some(inner) => {
                            code.push(open);
                            code.push_str(&inner);
                            code.push(close);
                        }
                        None => {
                            self.error(
                                format!(
                                    "The implicit expression is missing a closing '{}' character",
                                    close
                                ),
                                at,
                            );
                            return;
                        }
                    }
                }
                _ => break,
            }
        }

        self.push_node(MarkupNode::Expression { code, location });
    }

    // ---- code ----

    /// Copies a string, character literal or comment starting at the cursor.
    fn copy_code_literal(&mut self, code: &mut String) -> bool {
        let start = self.pos;
        match (self.peek(), self.peek_at(1)) {
            (Some('@'), Some('"')) => {
                self.pos += 2;
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '"' {
                        if self.peek() == Some('"') {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
            }
            (Some(quote @ ('"' | '\'')), _) => {
                self.pos += 1;
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                    if c == '\\' {
                        self.pos += 1;
                    } else if c == quote {
                        break;
                    }
                }
            }
            (Some('/'), Some('/')) => {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
            }
            (Some('/'), Some('*')) => {
                self.pos += 2;
                while self.pos < self.chars.len() {
                    if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
            }
            _ => return false,
        }
        self.pos = self.pos.min(self.chars.len());
        code.extend(&self.chars[start..self.pos]);
        true
    }

    /// Reads up to the `close` matching the `open` at the cursor. Returns the text
    /// in between, or `None` at end of input.
    fn read_balanced(&mut self, open: char, close: char) -> Option<String> {
        self.pos += 1;
        let mut depth = 1usize;
        let mut code = String::new();

        while let Some(c) = self.peek() {
            if self.copy_code_literal(&mut code) {
                continue;
            }
            self.pos += 1;
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(code);
                }
            }
            code.push(c);
        }
        None
    }

    /// Parses code after an opening brace up to its matching closing brace.
    /// Returns the position of the closing brace.
    fn parse_code_block(&mut self, open: usize) -> Option<usize> {
        let mut code = String::new();
        let mut code_start: Option<usize> = None;
        let mut depth = 1usize;
        let mut statement_start = true;

        while let Some(c) = self.peek() {
            if statement_start {
                if c == '<' && self.tag_at(self.pos).is_some() {
                    self.flush_code(&mut code, &mut code_start);
                    self.parse_markup(MarkupMode::Element);
                    continue;
                }
                if c == '@' {
                    match self.peek_at(1) {
                        Some(':') => {
                            self.flush_code(&mut code, &mut code_start);
                            self.pos += 2;
                            self.parse_markup(MarkupMode::Line);
                            continue;
                        }
                        Some(next) if next == '*' || next == '(' || is_identifier_start(next) => {
                            self.flush_code(&mut code, &mut code_start);
                            let mut literal = String::new();
                            self.parse_transition(&mut literal);
                            self.flush_literal(&mut literal);
                            continue;
                        }
                        _ => {}
                    }
                }
            }

            if c.is_whitespace() {
                code.push(c);
                self.pos += 1;
                continue;
            }
            code_start.get_or_insert(self.pos);

            let comment = c == '/';
            if self.copy_code_literal(&mut code) {
                if !comment {
                    statement_start = false;
                }
                continue;
            }

            self.pos += 1;
            match c {
                '{' => {
                    depth += 1;
                    statement_start = true;
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.flush_code(&mut code, &mut code_start);
                        return Some(self.pos - 1);
                    }
                    statement_start = true;
                }
                ';' => statement_start = true,
                _ => statement_start = false,
            }
            code.push(c);
        }

        self.flush_code(&mut code, &mut code_start);
        self.error("The code block is missing a closing '}' character", open);
        None
    }

    /// Reads a statement header up to (not including) its opening brace.
    fn read_statement_header(&mut self, header: &mut String) -> bool {
        let mut parens = 0usize;
        while let Some(c) = self.peek() {
            if self.copy_code_literal(header) {
                continue;
            }
            match c {
                '{' if parens == 0 => return true,
                '(' => parens += 1,
                ')' => parens = parens.saturating_sub(1),
                _ => {}
            }
            header.push(c);
            self.pos += 1;
        }
        false
    }

    fn parse_statement_block(&mut self, at: usize, keyword: &str) {
        loop {
            let header_start = self.pos;
            let mut header = String::new();
            if !self.read_statement_header(&mut header) {
                self.error(
                    format!("Expected a '{{' after the '{}' statement", keyword),
                    at,
                );
                return;
            }

            let brace = self.pos;
            self.pos += 1;
            header.push('{');
            self.push_node(MarkupNode::Code {
                code: header.trim().to_string(),
                location: self.location(header_start),
            });

            let Some(close) = self.parse_code_block(brace) else {
                return;
            };
            self.push_node(MarkupNode::Code {
                code: "}".to_string(),
                location: self.location(close),
            });

            if !self.continues_statement(keyword) {
                break;
            }
        }

        if keyword == "do" {
            self.parse_do_while_condition(at);
        }
    }

    /// Moves to a chained clause (`else`, `catch`, `finally`) when one follows.
    fn continues_statement(&mut self, keyword: &str) -> bool {
        let save = self.pos;
        self.skip_whitespace();
        let next = self.identifier_at(self.pos);
        let chained = match keyword {
            "if" => next == "else",
            "try" => next == "catch" || next == "finally",
            _ => false,
        };
        if !chained {
            self.pos = save;
        }
        chained
    }

    fn parse_do_while_condition(&mut self, at: usize) {
        let save = self.pos;
        self.skip_whitespace();
        if self.identifier_at(self.pos) != "while" {
            self.pos = save;
            self.error("Expected 'while' after the 'do' block", at);
            return;
        }

        let start = self.pos;
        let mut condition = String::new();
        while let Some(c) = self.peek() {
            if self.copy_code_literal(&mut condition) {
                continue;
            }
            condition.push(c);
            self.pos += 1;
            if c == ';' {
                break;
            }
        }
        self.push_node(MarkupNode::Code {
            code: condition.trim().to_string(),
            location: self.location(start),
        });
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}
