//! Text accumulation for generated source
//!
//! [`SourceBuilder`] is a plain ordered buffer. [`MarkedSegment`] adds a set
//! of keys so helper functions and constant-buffer members are written once
//! no matter how often the nodes that need them occur. [`NameGenerator`] hands
//! out identifiers that are unique for one compile.

use std::collections::HashSet;
use std::fmt;

/// Indentation of statements inside a generated function body
pub const INDENT: &str = "    ";

/// Ordered text buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuilder {
    text: String,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text without a line break
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Append text followed by a line break
    pub fn append_line(&mut self, line: &str) -> &mut Self {
        self.text.push_str(line);
        self.text.push('\n');
        self
    }

    /// Append an indented statement line
    pub fn statement(&mut self, statement: &str) -> &mut Self {
        self.text.push_str(INDENT);
        self.append_line(statement)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    /// Splice in everything another builder accumulated
    pub fn append_builder(&mut self, other: &SourceBuilder) -> &mut Self {
        self.text.push_str(&other.text);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for SourceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Append-only buffer that writes each keyed block at most once
#[derive(Debug, Clone, Default)]
pub struct MarkedSegment {
    source: SourceBuilder,
    marks: HashSet<String>,
}

impl MarkedSegment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`, returning `true` if it was not seen before
    pub fn mark(&mut self, key: &str) -> bool {
        if self.marks.contains(key) {
            return false;
        }
        self.marks.insert(key.to_string())
    }

    pub fn has_mark(&self, key: &str) -> bool {
        self.marks.contains(key)
    }

    /// Append `text` unless `key` was already marked
    pub fn mark_and_append(&mut self, key: &str, text: &str) -> bool {
        if !self.mark(key) {
            tracing::trace!(key, "Skipping already emitted block");
            return false;
        }
        self.source.append(text);
        true
    }

    /// Append `line` and a line break unless `key` was already marked
    pub fn mark_and_append_line(&mut self, key: &str, line: &str) -> bool {
        if !self.mark(key) {
            tracing::trace!(key, "Skipping already emitted line");
            return false;
        }
        self.source.append_line(line);
        true
    }

    /// Append unconditionally
    pub fn append_line(&mut self, line: &str) {
        self.source.append_line(line);
    }

    pub fn source(&self) -> &SourceBuilder {
        &self.source
    }

    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Monotonic identifier source shared by slots and locals of one scene
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    counter: usize,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh `{prefix}_{n}` identifier
    pub fn new_variable_name(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_lines() {
        let mut sb = SourceBuilder::new();
        sb.append("float x").append_line(" = 1.0;").statement("return x;");
        assert_eq!(sb.as_str(), "float x = 1.0;\n    return x;\n");
    }

    #[test]
    fn test_append_builder_keeps_order() {
        let mut outer = SourceBuilder::new();
        let mut inner = SourceBuilder::new();
        outer.statement("a;");
        inner.statement("b;");
        inner.statement("c;");
        outer.append_builder(&inner).statement("d;");
        assert_eq!(outer.as_str(), "    a;\n    b;\n    c;\n    d;\n");
    }

    #[test]
    fn test_marked_segment_dedups() {
        let mut seg = MarkedSegment::new();
        assert!(seg.mark_and_append_line("SphereSdf", "float SphereSdf();"));
        assert!(!seg.mark_and_append_line("SphereSdf", "float SphereSdf();"));
        assert!(seg.has_mark("SphereSdf"));
        assert_eq!(seg.as_str().matches("SphereSdf").count(), 1);
    }

    #[test]
    fn test_mark_without_text() {
        let mut seg = MarkedSegment::new();
        assert!(seg.mark("x"));
        assert!(!seg.mark_and_append("x", "text"));
        assert!(seg.is_empty());
    }

    #[test]
    fn test_names_are_unique_across_prefixes() {
        let mut names = NameGenerator::new();
        let a = names.new_variable_name("expr");
        let b = names.new_variable_name("localPos");
        let c = names.new_variable_name("expr");
        assert_eq!(a, "expr_0");
        assert_eq!(b, "localPos_1");
        assert_eq!(c, "expr_2");
    }
}
