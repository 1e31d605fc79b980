//! Grammar descriptions and the builder that compiles them
//!
//! Grammars are described declaratively (usually in TOML):
//!
//! ```text
//! name = "c"
//! extensions = ["c", "h"]
//!
//! [[rules]]
//! pattern = ["/%*", "%*/"]        # enter, end, escape
//! type = "comment"
//!
//! [[rules]]
//! regex = '(fn)(\s+)\w+'          # regex for enter/end, never escape
//! type = ["keyword", "default", "function"]
//!
//! [[rules]]
//! pattern = ["```c", "```"]
//! type = "string"
//! syntax = "c"                    # by name, or an inline table
//!
//! [symbols]
//! if = "keyword"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use super::language::{Syntax, SyntaxId};
use super::pattern::Pattern;
use super::rules::{Rule, Subsyntax};
use super::state::MAX_DEPTH;
use crate::error::{Result, SyntaxError};

/// Label for unclassified text when neither grammar nor builder sets one
pub const DEFAULT_LABEL: &str = "default";

/// Declarative grammar description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// File extensions, without the dot
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub default_label: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    /// Exact text to label overrides
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

impl GrammarSpec {
    /// Parse a grammar description from TOML
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Description of one rule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default)]
    pub pattern: Option<PatternSpec>,
    #[serde(default)]
    pub regex: Option<PatternSpec>,
    #[serde(rename = "type", default)]
    pub label: Option<LabelSpec>,
    #[serde(default)]
    pub syntax: Option<NestedSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Single(String),
    /// Enter, end and escape
    Slots(Vec<String>),
}

impl PatternSpec {
    fn sources(&self) -> Vec<&str> {
        match self {
            PatternSpec::Single(source) => vec![source.as_str()],
            PatternSpec::Slots(sources) => sources.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    Single(String),
    PerCapture(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NestedSpec {
    /// Grammar resolved by name, not owned by the rule
    Named(String),
    /// Grammar built along with the rule
    Inline(Box<GrammarSpec>),
}

/// Resolves named grammar references while building
///
/// Implementations are expected to memoize, returning the same handle for
/// a name that is still being built, so grammars can refer to themselves
/// or to each other.
pub trait Resolver {
    fn resolve(&mut self, name: &str) -> Result<Option<SyntaxId>>;
}

/// Resolver that knows no grammars
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&mut self, _name: &str) -> Result<Option<SyntaxId>> {
        Ok(None)
    }
}

/// Compile `spec` with the default label settings
pub fn build(spec: &GrammarSpec, resolver: &mut dyn Resolver) -> Result<Syntax> {
    Builder::new(resolver).build(spec)
}

/// Compiles grammar descriptions into `Syntax` values
pub struct Builder<'r> {
    resolver: &'r mut dyn Resolver,
    default_label: String,
}

impl<'r> Builder<'r> {
    pub fn new(resolver: &'r mut dyn Resolver) -> Self {
        Self {
            resolver,
            default_label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Builder: label used when a grammar doesn't set `default_label`
    pub fn with_default_label(mut self, label: &str) -> Self {
        self.default_label = label.to_string();
        self
    }

    pub fn build(&mut self, spec: &GrammarSpec) -> Result<Syntax> {
        let label = self.default_label.clone();
        self.build_level(spec, &label, 0)
    }

    fn build_level(&mut self, spec: &GrammarSpec, inherited: &str, depth: usize) -> Result<Syntax> {
        let default_label = spec.default_label.as_deref().unwrap_or(inherited);
        if depth == MAX_DEPTH {
            warn!(
                grammar = spec.name.as_deref().unwrap_or("<inline>"),
                depth, "inline grammar nested deeper than the line state can track"
            );
        }

        let rules = spec
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| self.build_rule(index, rule, default_label, depth))
            .collect::<Result<Vec<_>>>()?;
        Syntax::new(spec.name.clone(), default_label, rules, spec.symbols.clone())
    }

    fn build_rule(&mut self, index: usize, spec: &RuleSpec, default_label: &str, depth: usize) -> Result<Rule> {
        let (sources, regex) = match (&spec.pattern, &spec.regex) {
            (Some(pattern), None) => (pattern.sources(), false),
            (None, Some(pattern)) => (pattern.sources(), true),
            (Some(_), Some(_)) => return Err(SyntaxError::spec(index, "both `pattern` and `regex` given")),
            (None, None) => return Err(SyntaxError::spec(index, "no `pattern` or `regex` given")),
        };
        if sources.is_empty() || sources.len() > 3 {
            return Err(SyntaxError::spec(
                index,
                format!("expected 1 to 3 patterns, found {}", sources.len()),
            ));
        }

        // The escape slot is always a Lua pattern.
        let compile = |source: &str| if regex { Pattern::regex(source) } else { Ok(Pattern::lua(source)) };
        let enter = compile(sources[0])?;
        let end = sources.get(1).map(|source| compile(*source)).transpose()?;
        let escape = sources.get(2).map(|source| Pattern::lua(*source));

        let labels = match &spec.label {
            None => return Err(SyntaxError::spec(index, "no `type` given")),
            Some(LabelSpec::Single(label)) => vec![label.clone()],
            Some(LabelSpec::PerCapture(labels)) if labels.is_empty() => {
                return Err(SyntaxError::spec(index, "empty `type` list"))
            }
            Some(LabelSpec::PerCapture(labels)) => labels.clone(),
        };
        if labels.len() > 1 {
            let most = enter
                .boundary_count()
                .max(end.as_ref().map_or(0, Pattern::boundary_count));
            if labels.len() > most {
                return Err(SyntaxError::spec(
                    index,
                    format!("{} labels but the patterns produce at most {} captures", labels.len(), most),
                ));
            }
        }

        let subsyntax = match &spec.syntax {
            None => None,
            Some(NestedSpec::Named(name)) => {
                let id = self
                    .resolver
                    .resolve(name)?
                    .ok_or_else(|| SyntaxError::spec(index, format!("unresolved grammar `{name}`")))?;
                Some(Subsyntax::Borrowed(id))
            }
            Some(NestedSpec::Inline(nested)) => {
                let syntax = self
                    .build_level(nested, default_label, depth + 1)
                    .map_err(|err| nested_error(index, err))?;
                Some(Subsyntax::Owned(Box::new(syntax)))
            }
        };

        let mut rule = Rule::new(enter, &labels[0]).with_labels(labels);
        rule.end = end;
        rule.escape = escape;
        rule.subsyntax = subsyntax;
        Ok(rule)
    }
}

/// Report structural errors of an inline grammar against the enclosing rule
fn nested_error(index: usize, err: SyntaxError) -> SyntaxError {
    match err {
        SyntaxError::Spec { rule, reason } => {
            SyntaxError::spec(index, format!("inline grammar rule {rule}: {reason}"))
        }
        other => other,
    }
}
