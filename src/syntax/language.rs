//! Compiled grammars
//!
//! A `Syntax` is built once and then only read, so one instance can be
//! shared by any number of tokenizer calls on any number of threads.

use super::rules::{Rule, Subsyntax};
use super::state::MAX_RULE_INDEX;
use super::tokenizer::Tokenizer;
use crate::error::{Result, SyntaxError};

/// Handle to a grammar stored in a `SyntaxTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxId(pub(crate) usize);

impl SyntaxId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lookup for `Subsyntax::Borrowed` handles
pub trait SyntaxTable {
    fn syntax(&self, id: SyntaxId) -> Option<&Syntax>;
}

/// Table with no grammars, for tokenizing a grammar on its own
///
/// Borrowed nested grammars don't resolve against it, so rules that
/// reference one behave as if they declared no nested grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl SyntaxTable for Detached {
    fn syntax(&self, _id: SyntaxId) -> Option<&Syntax> {
        None
    }
}

/// A compiled grammar
#[derive(Debug)]
pub struct Syntax {
    name: Option<String>,
    default_label: String,
    rules: Vec<Rule>,
    /// Rules past this index can't change the line state
    stateful_len: usize,
    /// Exact-match overrides, sorted by key bytes
    symbols: Vec<(String, String)>,
    longest_symbol: usize,
}

impl Syntax {
    /// Create a grammar from ordered rules and an override table
    ///
    /// Fails when a rule index would not fit in a line state field.
    pub fn new(
        name: Option<String>,
        default_label: &str,
        rules: Vec<Rule>,
        symbols: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let limit = MAX_RULE_INDEX as usize + 1;
        if rules.len() > limit {
            return Err(SyntaxError::spec(
                limit,
                format!("{} rules, at most {limit} fit in a line state", rules.len()),
            ));
        }
        let stateful_len = rules
            .iter()
            .rposition(Rule::is_stateful)
            .map_or(0, |index| index + 1);
        let mut symbols: Vec<_> = symbols.into_iter().collect();
        symbols.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        symbols.dedup_by(|a, b| a.0 == b.0);
        let longest_symbol = symbols.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        Ok(Self {
            name,
            default_label: default_label.to_string(),
            rules,
            stateful_len,
            symbols,
            longest_symbol,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Label for text no rule classified
    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Count of leading rules that can carry state across lines
    pub fn stateful_len(&self) -> usize {
        self.stateful_len
    }

    /// Override label for text matching a symbol exactly
    pub fn symbol(&self, text: &[u8]) -> Option<&str> {
        if text.len() > self.longest_symbol {
            return None;
        }
        self.symbols
            .binary_search_by(|(key, _)| key.as_bytes().cmp(text))
            .ok()
            .map(|index| self.symbols[index].1.as_str())
    }

    /// Tokenizer over this grammar alone
    pub fn tokenizer(&self) -> Tokenizer<'_> {
        Tokenizer::new(&Detached, self)
    }

    /// Resolve the nested grammar of `rule` through `table`
    pub fn nested<'a>(rule: &'a Rule, table: &'a dyn SyntaxTable) -> Option<&'a Syntax> {
        match rule.subsyntax()? {
            Subsyntax::Owned(syntax) => Some(syntax),
            Subsyntax::Borrowed(id) => table.syntax(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::pattern::Pattern;

    fn sample() -> Syntax {
        let rules = vec![
            Rule::new(Pattern::lua("//.*"), "comment"),
            Rule::new(Pattern::lua("/%*"), "comment").with_end(Pattern::lua("%*/")),
            Rule::new(Pattern::lua("%d+"), "number"),
        ];
        let symbols = [
            ("while".to_string(), "keyword".to_string()),
            ("if".to_string(), "keyword".to_string()),
            ("NULL".to_string(), "literal".to_string()),
        ];
        Syntax::new(Some("sample".to_string()), "normal", rules, symbols).unwrap()
    }

    #[test]
    fn test_stateful_len() {
        assert_eq!(sample().stateful_len(), 2);
        let plain = Syntax::new(None, "normal", vec![Rule::new(Pattern::lua("x"), "x")], []).unwrap();
        assert_eq!(plain.stateful_len(), 0);
    }

    #[test]
    fn test_rule_count_fits_line_state() {
        let rules = |count: usize| -> Vec<Rule> { (0..count).map(|_| Rule::new(Pattern::lua("x"), "x")).collect() };
        let full = Syntax::new(None, "normal", rules(255), []).unwrap();
        assert_eq!(full.rules().len(), 255);

        match Syntax::new(None, "normal", rules(256), []) {
            Err(SyntaxError::Spec { rule, .. }) => assert_eq!(rule, 255),
            other => panic!("expected a rule count error, got {other:?}"),
        }
    }

    #[test]
    fn test_symbol_lookup() {
        let syntax = sample();
        assert_eq!(syntax.symbol(b"if"), Some("keyword"));
        assert_eq!(syntax.symbol(b"NULL"), Some("literal"));
        assert_eq!(syntax.symbol(b"ifx"), None);
        assert_eq!(syntax.symbol(b"whilewhile"), None);
        assert_eq!(syntax.symbol(b""), None);
    }

    #[test]
    fn test_detached_does_not_resolve_borrowed() {
        let rule = Rule::new(Pattern::lua("x"), "x").with_subsyntax(Subsyntax::Borrowed(SyntaxId(0)));
        assert!(Syntax::nested(&rule, &Detached).is_none());

        let inner = Syntax::new(None, "normal", Vec::new(), []).unwrap();
        let rule = Rule::new(Pattern::lua("x"), "x").with_subsyntax(Subsyntax::Owned(Box::new(inner)));
        assert!(Syntax::nested(&rule, &Detached).is_some());
    }

    #[test]
    fn test_syntax_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Syntax>();
    }
}
