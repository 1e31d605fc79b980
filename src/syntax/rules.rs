//! Grammar rules
//!
//! A rule has up to three patterns: `enter` (or just "match" for a plain
//! token), `end` and `escape`. While a rule's region is open, `escape`
//! is tried before `end`.

use super::language::{Syntax, SyntaxId};
use super::pattern::Pattern;

/// Nested grammar reference held by a rule
#[derive(Debug)]
pub enum Subsyntax {
    /// Inline grammar, dropped with the rule
    Owned(Box<Syntax>),
    /// Handle into an external grammar table (see `SyntaxTable`)
    Borrowed(SyntaxId),
}

/// A single grammar rule
#[derive(Debug)]
pub struct Rule {
    pub(crate) enter: Pattern,
    pub(crate) end: Option<Pattern>,
    pub(crate) escape: Option<Pattern>,
    /// Labels per capture segment; never empty
    pub(crate) labels: Vec<String>,
    pub(crate) subsyntax: Option<Subsyntax>,
}

impl Rule {
    /// Create a plain token rule
    pub fn new(enter: Pattern, label: &str) -> Self {
        Self {
            enter,
            end: None,
            escape: None,
            labels: vec![label.to_string()],
            subsyntax: None,
        }
    }

    /// Builder: set the end pattern, turning this into a region rule
    pub fn with_end(mut self, end: Pattern) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder: set the escape pattern
    pub fn with_escape(mut self, escape: Pattern) -> Self {
        self.escape = Some(escape);
        self
    }

    /// Builder: label each capture segment separately
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        if !labels.is_empty() {
            self.labels = labels;
        }
        self
    }

    /// Builder: attach a nested grammar
    pub fn with_subsyntax(mut self, subsyntax: Subsyntax) -> Self {
        self.subsyntax = Some(subsyntax);
        self
    }

    pub fn enter(&self) -> &Pattern {
        &self.enter
    }

    pub fn end(&self) -> Option<&Pattern> {
        self.end.as_ref()
    }

    pub fn escape(&self) -> Option<&Pattern> {
        self.escape.as_ref()
    }

    pub fn subsyntax(&self) -> Option<&Subsyntax> {
        self.subsyntax.as_ref()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label for capture segment `index`, if the rule names one
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Can this rule leave state behind at the end of a line?
    pub fn is_stateful(&self) -> bool {
        self.end.is_some() || self.subsyntax.is_some()
    }
}
