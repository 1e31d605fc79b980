//! Token runs produced by the tokenizer

use super::language::Syntax;
use super::state::LineState;

/// A run of bytes sharing one label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRun<'a> {
    pub label: &'a str,
    pub len: usize,
}

impl<'a> TokenRun<'a> {
    pub fn new(label: &'a str, len: usize) -> Self {
        Self { label, len }
    }
}

/// Result of tokenizing a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine<'a> {
    /// Runs covering the line; `None` for quick passes
    pub runs: Option<Vec<TokenRun<'a>>>,
    /// State at end of line (for next line)
    pub state: LineState,
}

impl<'a> TokenizedLine<'a> {
    /// Runs as `(label, length)` pairs, empty for quick passes
    pub fn pairs(&self) -> Vec<(&'a str, usize)> {
        self.runs
            .iter()
            .flatten()
            .map(|run| (run.label, run.len))
            .collect()
    }
}

/// Collects runs, merging neighbours that end up with the same label
pub(crate) struct Emitter<'a> {
    runs: Option<Vec<TokenRun<'a>>>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(quick: bool) -> Self {
        Self {
            runs: (!quick).then(Vec::new),
        }
    }

    /// Emit `text` under `label`, unless `syntax` overrides it
    pub(crate) fn emit(&mut self, syntax: &'a Syntax, label: &'a str, text: &[u8]) {
        let Some(runs) = self.runs.as_mut() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let label = syntax.symbol(text).unwrap_or(label);
        match runs.last_mut() {
            Some(last) if last.label == label => last.len += text.len(),
            _ => runs.push(TokenRun::new(label, text.len())),
        }
    }

    pub(crate) fn finish(self) -> Option<Vec<TokenRun<'a>>> {
        self.runs
    }
}
