//! Text Buffer
//!
//! Indent-aware text accumulator. This is the same algorithm the template
//! preset emits into the generated companion base class (`WriteLiteral`), and
//! the C# emitter uses it to lay out generated source.

use std::fmt;

/// Line break recognised and produced by the buffer.
pub const NEW_LINE: &str = "\n";

/// Growable text buffer with a current indent.
///
/// The indent is written lazily: text that ends with a line break leaves the
/// next line un-indented until the following `write_literal` call, so an
/// indent change between two calls applies to the next line.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    generation_environment: String,
    current_indent: String,
    indent_lengths: Vec<usize>,
    ends_with_newline: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`, inserting the current indent at the start of every line.
    pub fn write_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.generation_environment.is_empty() || self.ends_with_newline {
            self.generation_environment.push_str(&self.current_indent);
            self.ends_with_newline = false;
        }
        if text.ends_with(NEW_LINE) {
            self.ends_with_newline = true;
        }
        if self.current_indent.is_empty() {
            self.generation_environment.push_str(text);
            return;
        }

        let indented = text.replace(NEW_LINE, &format!("{}{}", NEW_LINE, self.current_indent));
        if self.ends_with_newline {
            // The indent after the final line break is deferred to the next write.
            let keep = indented.len() - self.current_indent.len();
            self.generation_environment.push_str(&indented[..keep]);
        } else {
            self.generation_environment.push_str(&indented);
        }
    }

    /// Append the `Display` rendering of `value`. `Display` is locale independent.
    pub fn write(&mut self, value: &dyn fmt::Display) {
        self.write_literal(&value.to_string());
    }

    /// Append `text` followed by a line break.
    pub fn write_line(&mut self, text: &str) {
        self.write_literal(&format!("{}{}", text, NEW_LINE));
    }

    /// Append one line at column zero regardless of the current indent.
    pub fn write_line_unindented(&mut self, text: &str) {
        let indent = std::mem::take(&mut self.current_indent);
        self.write_line(text);
        self.current_indent = indent;
    }

    pub fn push_indent(&mut self, indent: &str) {
        self.current_indent.push_str(indent);
        self.indent_lengths.push(indent.len());
    }

    /// Remove the most recently pushed indent and return it.
    pub fn pop_indent(&mut self) -> Option<String> {
        let len = self.indent_lengths.pop()?;
        let start = self.current_indent.len() - len;
        Some(self.current_indent.split_off(start))
    }

    pub fn current_indent(&self) -> &str {
        &self.current_indent
    }

    pub fn ends_with_newline(&self) -> bool {
        self.ends_with_newline
    }

    pub fn as_str(&self) -> &str {
        &self.generation_environment
    }

    pub fn into_string(self) -> String {
        self.generation_environment
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generation_environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indented(indent: &str) -> TextBuffer {
        let mut buffer = TextBuffer::new();
        buffer.push_indent(indent);
        buffer
    }

    #[test]
    fn should_append_verbatim_without_indent() {
        let mut buffer = TextBuffer::new();
        buffer.write_literal("a\nb\n");
        buffer.write_literal("c");
        assert_eq!(buffer.as_str(), "a\nb\nc");
    }

    #[test]
    fn should_indent_first_write_and_internal_lines() {
        let mut buffer = indented("  ");
        buffer.write_literal("a\nb");
        assert_eq!(buffer.as_str(), "  a\n  b");
        assert!(!buffer.ends_with_newline());
    }

    #[test]
    fn should_defer_indent_after_trailing_line_break() {
        let mut buffer = indented("  ");
        buffer.write_literal("a\n");
        assert_eq!(buffer.as_str(), "  a\n");
        assert!(buffer.ends_with_newline());

        buffer.write_literal("b");
        assert_eq!(buffer.as_str(), "  a\n  b");
    }

    #[test]
    fn should_apply_indent_change_to_deferred_line() {
        let mut buffer = indented("  ");
        buffer.write_literal("a\n");
        buffer.push_indent("  ");
        buffer.write_literal("b\n");
        buffer.pop_indent();
        buffer.write_literal("c");
        assert_eq!(buffer.as_str(), "  a\n    b\n  c");
    }

    #[test]
    fn should_ignore_empty_writes() {
        let mut buffer = indented("  ");
        buffer.write_literal("");
        assert_eq!(buffer.as_str(), "");
        assert!(!buffer.ends_with_newline());
    }

    #[test]
    fn should_match_single_write_when_first_part_has_no_trailing_break() {
        let cases = [
            ("a", "b\n"),
            ("line one\nline", " two\nthree"),
            ("x\n\ny", "\n"),
            ("", "only second\n"),
        ];
        for (a, b) in cases {
            let mut split = indented("\t");
            split.write_literal(a);
            split.write_literal(b);

            let mut joined = indented("\t");
            joined.write_literal(&format!("{}{}", a, b));

            assert_eq!(split.as_str(), joined.as_str(), "a = {:?}, b = {:?}", a, b);
        }
    }

    #[test]
    fn should_write_display_values() {
        let mut buffer = TextBuffer::new();
        buffer.write(&42);
        buffer.write(&1.5);
        assert_eq!(buffer.as_str(), "421.5");
    }

    #[test]
    fn should_write_unindented_lines_at_column_zero() {
        let mut buffer = indented("    ");
        buffer.write_line("a();");
        buffer.write_line_unindented("#line 3 \"x.cshtml\"");
        buffer.write_line("b();");
        assert_eq!(buffer.as_str(), "    a();\n#line 3 \"x.cshtml\"\n    b();\n");
        assert_eq!(buffer.current_indent(), "    ");
    }
}
