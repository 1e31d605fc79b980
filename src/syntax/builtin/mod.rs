//! Built-in grammars
//!
//! Written in the same TOML format as user grammar files.

mod c;
mod markdown;
mod python;
mod toml_lang;

use super::builder::GrammarSpec;
use crate::error::Result;

const SOURCES: [&str; 4] = [c::GRAMMAR, python::GRAMMAR, toml_lang::GRAMMAR, markdown::GRAMMAR];

/// Descriptions of every built-in grammar
pub fn all_grammars() -> Result<Vec<GrammarSpec>> {
    SOURCES.iter().map(|source| GrammarSpec::from_toml(source)).collect()
}
