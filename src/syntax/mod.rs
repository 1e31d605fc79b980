//! Grammars and line tokenization
//!
//! This module provides:
//! - Lua-style and regex patterns (`Pattern`)
//! - Compiled grammars and the builder that produces them
//! - The per-line tokenizer and its packed line state
//! - A registry of named grammars and a per-document state cache

mod builder;
mod builtin;
mod language;
mod manager;
mod pattern;
mod rules;
mod state;
mod tokenizer;
mod tokens;

pub use builder::{
    build, Builder, GrammarSpec, LabelSpec, NestedSpec, NoResolver, PatternSpec, Resolver, RuleSpec,
    DEFAULT_LABEL,
};
pub use language::{Detached, Syntax, SyntaxId, SyntaxTable};
pub use manager::{HighlightCache, SyntaxRegistry};
pub use pattern::{Pattern, RegexPattern};
pub use rules::{Rule, Subsyntax};
pub use state::{LineState, MAX_DEPTH, MAX_RULE_INDEX};
pub use tokenizer::{tokenize, Tokenizer};
pub use tokens::{TokenRun, TokenizedLine};
