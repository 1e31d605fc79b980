//! syntok - incremental syntax tokenizer for editors
//!
//! Grammars are ordered rules of Lua-style or regex patterns. Lines are
//! tokenized one at a time into labelled runs, and a packed 64-bit state
//! carries open comments, strings and nested grammars to the next line.
//!
//! ```
//! use syntok::{LineState, SyntaxRegistry};
//!
//! let mut registry = SyntaxRegistry::with_builtins()?;
//! let id = registry.load("c")?;
//! let tokenizer = registry.tokenizer(id).expect("loaded grammar");
//!
//! let first = tokenizer.tokenize("x = 1; /* open", LineState::NORMAL, false);
//! let second = tokenizer.tokenize("closed */", first.state, false);
//! assert_eq!(second.pairs(), vec![("comment", 9)]);
//! # Ok::<(), syntok::SyntaxError>(())
//! ```

pub mod config;
pub mod error;
pub mod syntax;

pub use config::Config;
pub use error::{Result, SyntaxError};
pub use syntax::{
    tokenize, GrammarSpec, HighlightCache, LineState, Pattern, Rule, Syntax, SyntaxId, SyntaxRegistry,
    Tokenizer, TokenRun, TokenizedLine,
};
