//! Line tokenizer
//!
//! Tokenizes one line at a time. The `LineState` from the previous line
//! says which rules are open at each nesting level, so any line can be
//! tokenized without rescanning the lines before it.
//!
//! Every step moves forward at least one byte, so a call does work
//! proportional to the line length and always terminates.

use tracing::warn;

use super::language::{Syntax, SyntaxTable};
use super::pattern::Pattern;
use super::rules::Rule;
use super::state::{LineState, MAX_DEPTH};
use super::tokens::{Emitter, TokenRun, TokenizedLine};

/// Tokenize `line` with a standalone grammar
///
/// Returns the runs (`None` when `quick`) and the state for the next line.
pub fn tokenize<'a>(
    syntax: &'a Syntax,
    line: &str,
    state: u64,
    quick: bool,
) -> (Option<Vec<TokenRun<'a>>>, u64) {
    let result = syntax.tokenizer().tokenize(line, LineState::new(state), quick);
    (result.runs, result.state.bits())
}

/// Tokenizer bound to a root grammar and the table its borrowed
/// nested grammars live in
#[derive(Clone, Copy)]
pub struct Tokenizer<'a> {
    table: &'a dyn SyntaxTable,
    root: &'a Syntax,
}

impl<'a> Tokenizer<'a> {
    pub fn new(table: &'a dyn SyntaxTable, root: &'a Syntax) -> Self {
        Self { table, root }
    }

    pub fn root(&self) -> &'a Syntax {
        self.root
    }

    /// Tokenize a single line
    ///
    /// Takes the line text and the state from the previous line. A quick
    /// pass only computes the end state.
    pub fn tokenize(&self, line: &str, state: LineState, quick: bool) -> TokenizedLine<'a> {
        self.tokenize_bytes(line.as_bytes(), state, quick)
    }

    pub fn tokenize_bytes(&self, text: &[u8], state: LineState, quick: bool) -> TokenizedLine<'a> {
        let (mut stack, mut state) = self.resume(state);
        let mut emitter = Emitter::new(quick);
        let mut bounds = Vec::new();
        let mut offset = 0;
        let mut pending = 0;

        while offset < text.len() {
            let depth = stack.len() - 1;
            let target = stack[depth];

            // The rule that opened this grammar can close it from anywhere inside.
            if depth > 0 {
                let parent = stack[depth - 1];
                if let Some(rule) = state.active_rule(depth - 1).and_then(|i| parent.rules().get(i)) {
                    let escaped = rule
                        .escape()
                        .is_some_and(|escape| escape.match_at(text, offset, &mut bounds));
                    if !escaped && rule.end().is_some_and(|end| consumed(end, text, offset, &mut bounds)) {
                        emitter.emit(target, open_label(target, state, depth), &text[pending..offset]);
                        pending = emit_captures(&mut emitter, parent, rule, text, offset, &bounds);
                        offset = pending;
                        state = state.truncated(depth - 1);
                        stack.truncate(depth);
                        continue;
                    }
                }
            }

            let Some(index) = state.active_rule(depth) else {
                let count = if quick { target.stateful_len() } else { target.rules().len() };
                let matched = target.rules()[..count]
                    .iter()
                    .enumerate()
                    .find(|(_, rule)| consumed(rule.enter(), text, offset, &mut bounds));
                let Some((index, rule)) = matched else {
                    offset = skip_unmatched(text, offset);
                    continue;
                };

                emitter.emit(target, target.default_label(), &text[pending..offset]);
                pending = offset;
                let nested = Syntax::nested(rule, self.table);
                if rule.end().is_some() && nested.is_none() {
                    // Region: its text is labelled once it closes or the line ends.
                    state = state.with_active(depth, index);
                    offset = match_end(&bounds, offset);
                    continue;
                }

                pending = emit_captures(&mut emitter, target, rule, text, pending, &bounds);
                offset = pending;
                if let Some(nested) = nested {
                    if depth + 1 < MAX_DEPTH {
                        state = state.with_active(depth, index);
                        stack.push(nested);
                    } else {
                        warn!(depth, rule = index, "nested grammar past the line state limit, not entered");
                    }
                }
                continue;
            };

            let rule = &target.rules()[index];
            if rule
                .escape()
                .is_some_and(|escape| escape.match_at(text, offset, &mut bounds))
            {
                // The escaped byte is consumed along with the escape.
                offset = (match_end(&bounds, offset) + 1).min(text.len());
            } else if rule.end().is_some_and(|end| consumed(end, text, offset, &mut bounds)) {
                pending = emit_captures(&mut emitter, target, rule, text, pending, &bounds);
                offset = pending;
                state = state.truncated(depth);
            } else {
                offset += 1;
            }
        }

        let depth = stack.len() - 1;
        let target = stack[depth];
        emitter.emit(target, open_label(target, state, depth), &text[pending..]);

        TokenizedLine {
            runs: emitter.finish(),
            state,
        }
    }

    /// Grammars for each open level, and the state with anything
    /// inconsistent with the grammar cleared
    pub fn resume(&self, state: LineState) -> (Vec<&'a Syntax>, LineState) {
        let mut stack = vec![self.root];
        let mut kept = 0;
        for level in 0..MAX_DEPTH {
            let syntax = stack[level];
            let Some(rule) = state.active_rule(level).and_then(|i| syntax.rules().get(i)) else {
                break;
            };
            match Syntax::nested(rule, self.table) {
                Some(nested) if level + 1 < MAX_DEPTH => {
                    stack.push(nested);
                    kept = level + 1;
                }
                Some(_) => break,
                None => {
                    if rule.end().is_some() {
                        kept = level + 1;
                    }
                    break;
                }
            }
        }
        (stack, state.truncated(kept))
    }
}

/// Match that consumes at least one byte
fn consumed(pattern: &Pattern, text: &[u8], offset: usize, bounds: &mut Vec<usize>) -> bool {
    pattern.match_at(text, offset, bounds) && bounds.last().is_some_and(|&end| end > offset)
}

/// End of the whole match, which is always the last boundary
fn match_end(bounds: &[usize], offset: usize) -> usize {
    bounds.last().map_or(offset, |&end| end.max(offset))
}

/// Label of the region open at `depth`, or the grammar default
fn open_label<'a>(syntax: &'a Syntax, state: LineState, depth: usize) -> &'a str {
    state
        .active_rule(depth)
        .and_then(|index| syntax.rules().get(index))
        .and_then(|rule| rule.label(0))
        .unwrap_or(syntax.default_label())
}

/// Emit one run per capture segment starting at `start`; returns the end
fn emit_captures<'a>(
    emitter: &mut Emitter<'a>,
    syntax: &'a Syntax,
    rule: &'a Rule,
    text: &[u8],
    start: usize,
    bounds: &[usize],
) -> usize {
    let mut last = start;
    for (segment, &end) in bounds.iter().enumerate() {
        let end = end.max(last);
        let label = rule.label(segment).unwrap_or(syntax.default_label());
        emitter.emit(syntax, label, &text[last..end]);
        last = end;
    }
    last
}

/// Skip a run of alphanumerics, or a single byte
fn skip_unmatched(text: &[u8], offset: usize) -> usize {
    let word = text[offset..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    offset + word.max(1)
}
