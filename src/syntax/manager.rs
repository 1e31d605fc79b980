//! Grammar registry and line-state caching
//!
//! `SyntaxRegistry` owns every named grammar. Descriptions are registered
//! up front and compiled on first use, so grammars can refer to each other
//! (and to themselves) by name in any order. `HighlightCache` keeps the
//! end-of-line states of one document so edits only re-tokenize what
//! they touch.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::builder::{Builder, GrammarSpec, Resolver, DEFAULT_LABEL};
use super::builtin;
use super::language::{Syntax, SyntaxId, SyntaxTable};
use super::state::LineState;
use super::tokenizer::Tokenizer;
use super::tokens::TokenizedLine;
use crate::config::Config;
use crate::error::{Result, SyntaxError};

/// Named grammars, compiled on demand
pub struct SyntaxRegistry {
    /// Registered descriptions by grammar name
    specs: HashMap<String, GrammarSpec>,
    /// Compiled grammars; `None` while a build is in progress
    slots: Vec<Option<Syntax>>,
    /// Name to slot, for loaded (or loading) grammars
    index: HashMap<String, SyntaxId>,
    /// Extension to grammar name mapping
    extension_map: HashMap<String, String>,
    default_label: String,
}

impl SyntaxRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
            slots: Vec::new(),
            index: HashMap::new(),
            extension_map: HashMap::new(),
            default_label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Create a registry with the built-in grammars
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_builtins()?;
        Ok(registry)
    }

    /// Create a registry as described by the user configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new().with_default_label(&config.default_label);
        if config.builtin_grammars {
            registry.register_builtins()?;
        }
        for dir in &config.grammar_dirs {
            registry.register_dir(dir)?;
        }
        Ok(registry)
    }

    /// Builder: label for unclassified text in grammars that don't set one
    pub fn with_default_label(mut self, label: &str) -> Self {
        self.default_label = label.to_string();
        self
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn register_builtins(&mut self) -> Result<()> {
        for spec in builtin::all_grammars()? {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Register a grammar description, returning its name
    ///
    /// Registering a name again replaces its description. The next `load`
    /// builds the new one; handles to the old build stay valid.
    pub fn register(&mut self, spec: GrammarSpec) -> Result<String> {
        let name = spec.name.clone().ok_or(SyntaxError::MissingName)?;
        for ext in &spec.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        self.index.remove(&name);
        self.specs.insert(name.clone(), spec);
        Ok(name)
    }

    /// Register a grammar from TOML text
    pub fn register_toml(&mut self, text: &str) -> Result<String> {
        self.register(GrammarSpec::from_toml(text)?)
    }

    /// Register a grammar from a TOML file
    pub fn register_file(&mut self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)?;
        self.register_toml(&text)
    }

    /// Register every `*.toml` file in `dir`, in file name order
    pub fn register_dir(&mut self, dir: &Path) -> Result<Vec<String>> {
        let mut paths = fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"));
        paths.sort();
        debug!(dir = %dir.display(), files = paths.len(), "registering grammar files");
        paths.iter().map(|path| self.register_file(path)).collect()
    }

    /// Handle for the grammar called `name`, building it on first use
    ///
    /// If the build fails, every grammar built as part of this call is
    /// discarded again.
    pub fn load(&mut self, name: &str) -> Result<SyntaxId> {
        if let Some(&id) = self.index.get(name) {
            return Ok(id);
        }
        let mark = self.slots.len();
        let result = self.build(name);
        if result.is_err() {
            self.slots.truncate(mark);
            self.index.retain(|_, id| id.index() < mark);
        }
        result
    }

    fn build(&mut self, name: &str) -> Result<SyntaxId> {
        let spec = self
            .specs
            .get(name)
            .cloned()
            .ok_or_else(|| SyntaxError::UnknownGrammar(name.to_string()))?;

        // Reserve the slot first so references back to `name` resolve to it.
        let id = SyntaxId(self.slots.len());
        self.slots.push(None);
        self.index.insert(name.to_string(), id);
        debug!(grammar = name, id = id.index(), "building grammar");

        let label = self.default_label.clone();
        let syntax = Builder::new(self).with_default_label(&label).build(&spec)?;
        self.slots[id.index()] = Some(syntax);
        Ok(id)
    }

    /// Load the grammar for `path`, detected by extension
    pub fn load_for_path(&mut self, path: &Path) -> Result<Option<SyntaxId>> {
        let Some(name) = self.detect_language(path).map(str::to_string) else {
            return Ok(None);
        };
        self.load(&name).map(Some)
    }

    /// Handle for an already loaded grammar
    pub fn get(&self, name: &str) -> Option<SyntaxId> {
        self.index.get(name).copied()
    }

    /// Tokenizer over the grammar `id`
    pub fn tokenizer(&self, id: SyntaxId) -> Option<Tokenizer<'_>> {
        Some(Tokenizer::new(self, self.syntax(id)?))
    }

    /// Detect grammar name from filename
    pub fn detect_language(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// Registered grammar names, sorted
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.specs.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for SyntaxRegistry {
    fn resolve(&mut self, name: &str) -> Result<Option<SyntaxId>> {
        if self.index.contains_key(name) || self.specs.contains_key(name) {
            self.load(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl SyntaxTable for SyntaxRegistry {
    fn syntax(&self, id: SyntaxId) -> Option<&Syntax> {
        self.slots.get(id.index())?.as_ref()
    }
}

/// End-of-line states for one document
///
/// Entry `i` is the state after line `i`. Entries are only ever appended
/// in order, so every cached state was derived from the ones before it.
#[derive(Debug, Clone, Default)]
pub struct HighlightCache {
    states: Vec<LineState>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines with a cached end state
    pub fn cached_lines(&self) -> usize {
        self.states.len()
    }

    /// Drop cached states from `line` onwards (after an edit)
    pub fn invalidate_from(&mut self, line: usize) {
        self.states.truncate(line);
    }

    pub fn invalidate_all(&mut self) {
        self.states.clear();
    }

    /// State at the start of `line`, re-deriving missing states
    pub fn state_before<S: AsRef<str>>(&mut self, tokenizer: &Tokenizer<'_>, lines: &[S], line: usize) -> LineState {
        let target = line.min(lines.len());
        if self.states.len() < target {
            debug!(from = self.states.len(), to = target, "re-deriving line states");
            for index in self.states.len()..target {
                let state = index
                    .checked_sub(1)
                    .map_or(LineState::NORMAL, |prev| self.states[prev]);
                let result = tokenizer.tokenize(lines[index].as_ref(), state, true);
                self.states.push(result.state);
            }
        }
        target
            .checked_sub(1)
            .map_or(LineState::NORMAL, |prev| self.states[prev])
    }

    /// Tokenize `line` in full, refreshing its cached end state
    pub fn highlight<'a, S: AsRef<str>>(
        &mut self,
        tokenizer: &Tokenizer<'a>,
        lines: &[S],
        line: usize,
    ) -> Option<TokenizedLine<'a>> {
        let text = lines.get(line)?;
        let state = self.state_before(tokenizer, lines, line);
        let result = tokenizer.tokenize(text.as_ref(), state, false);
        match self.states.get(line) {
            None => self.states.push(result.state),
            Some(&cached) if cached != result.state => {
                self.states.truncate(line);
                self.states.push(result.state);
            }
            Some(_) => {}
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_detect_language() {
        let registry = SyntaxRegistry::with_builtins().unwrap();

        assert_eq!(registry.detect_language(Path::new("main.c")), Some("c"));
        assert_eq!(registry.detect_language(Path::new("MAIN.H")), Some("c"));
        assert_eq!(registry.detect_language(Path::new("test.py")), Some("python"));
        assert_eq!(registry.detect_language(Path::new("Cargo.toml")), Some("toml"));
        assert_eq!(registry.detect_language(Path::new("README.md")), Some("markdown"));
        assert_eq!(registry.detect_language(Path::new("no_extension")), None);
    }

    #[test]
    fn test_list_languages() {
        let registry = SyntaxRegistry::with_builtins().unwrap();
        assert_eq!(registry.list_languages(), vec!["c", "markdown", "python", "toml"]);
    }

    #[test]
    fn test_load_is_memoized() {
        let mut registry = SyntaxRegistry::with_builtins().unwrap();
        assert_eq!(registry.get("c"), None);
        let first = registry.load("c").unwrap();
        let second = registry.load("c").unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.get("c"), Some(first));
    }

    #[test]
    fn test_load_for_path() {
        let mut registry = SyntaxRegistry::with_builtins().unwrap();
        let id = registry.load_for_path(Path::new("notes.md")).unwrap().unwrap();
        assert_eq!(registry.syntax(id).and_then(Syntax::name), Some("markdown"));
        // the fenced blocks pulled in their grammars too
        assert!(registry.get("c").is_some());
        assert!(registry.get("python").is_some());
        assert_eq!(registry.load_for_path(Path::new("notes.txt")).unwrap(), None);
    }

    #[test]
    fn test_unknown_grammar() {
        let mut registry = SyntaxRegistry::new();
        assert!(matches!(
            registry.load("cobol"),
            Err(SyntaxError::UnknownGrammar(name)) if name == "cobol"
        ));
    }

    #[test]
    fn test_missing_name() {
        let mut registry = SyntaxRegistry::new();
        let err = registry
            .register_toml("[[rules]]\npattern = 'x'\ntype = 'x'\n")
            .unwrap_err();
        assert!(matches!(err, SyntaxError::MissingName));
    }

    #[test]
    fn test_self_reference() {
        let mut registry = SyntaxRegistry::new();
        registry
            .register_toml(
                r#"
name = "parens"

[[rules]]
pattern = ["%(", "%)"]
type = "paren"
syntax = "parens"
"#,
            )
            .unwrap();
        let id = registry.load("parens").unwrap();
        let tokenizer = registry.tokenizer(id).unwrap();

        let line = tokenizer.tokenize("(a(b)c)", LineState::NORMAL, false);
        assert_eq!(
            line.pairs(),
            vec![
                ("paren", 1),
                ("default", 1),
                ("paren", 1),
                ("default", 1),
                ("paren", 1),
                ("default", 1),
                ("paren", 1),
            ]
        );
        assert_eq!(line.state, LineState::NORMAL);

        let open = tokenizer.tokenize("((", LineState::NORMAL, false);
        assert_eq!(open.state, LineState::encode(&[(0, 0), (1, 0)]));
    }

    #[test]
    fn test_mutual_recursion() {
        let mut registry = SyntaxRegistry::new();
        registry
            .register_toml(
                r#"
name = "outer"

[[rules]]
pattern = ["<", ">"]
type = "tag"
syntax = "inner"
"#,
            )
            .unwrap();
        registry
            .register_toml(
                r#"
name = "inner"

[[rules]]
pattern = ["{", "}"]
type = "brace"
syntax = "outer"
"#,
            )
            .unwrap();

        let outer = registry.load("outer").unwrap();
        let inner = registry.get("inner").unwrap();
        assert_ne!(outer, inner);

        let tokenizer = registry.tokenizer(outer).unwrap();
        let line = tokenizer.tokenize("<x{y}>", LineState::NORMAL, false);
        assert_eq!(
            line.pairs(),
            vec![
                ("tag", 1),
                ("default", 1),
                ("brace", 1),
                ("default", 1),
                ("brace", 1),
                ("tag", 1),
            ]
        );
        assert_eq!(line.state, LineState::NORMAL);
    }

    #[test]
    fn test_failed_load_rolls_back() {
        let mut registry = SyntaxRegistry::new();
        registry
            .register_toml(
                r#"
name = "host"

[[rules]]
pattern = ["<%?", "%?>"]
type = "keyword"
syntax = "guest"
"#,
            )
            .unwrap();
        registry
            .register_toml(
                r#"
name = "guest"

[[rules]]
regex = "(unclosed"
type = "x"
"#,
            )
            .unwrap();

        assert!(matches!(registry.load("host"), Err(SyntaxError::Compile { .. })));
        assert_eq!(registry.get("host"), None);
        assert_eq!(registry.get("guest"), None);

        registry
            .register_toml(
                r#"
name = "guest"

[[rules]]
regex = "[0-9]+"
type = "number"
"#,
            )
            .unwrap();
        let host = registry.load("host").unwrap();
        assert_eq!(host.index(), 0);
        assert_eq!(registry.get("guest").map(SyntaxId::index), Some(1));
    }

    #[test]
    fn test_register_dir() {
        let dir = std::env::temp_dir().join(format!("syntok-grammars-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.toml"), "name = 'second'\nextensions = ['two']\n").unwrap();
        fs::write(dir.join("a.toml"), "name = 'first'\nextensions = ['one']\n").unwrap();
        fs::write(dir.join("notes.txt"), "not a grammar").unwrap();

        let mut registry = SyntaxRegistry::new();
        let names = registry.register_dir(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(names.unwrap(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(registry.detect_language(Path::new("x.two")), Some("second"));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            default_label: "plain".to_string(),
            builtin_grammars: false,
            grammar_dirs: Vec::<PathBuf>::new(),
        };
        let mut registry = SyntaxRegistry::from_config(&config).unwrap();
        assert!(registry.list_languages().is_empty());

        registry
            .register_toml("name = 'words'\n[[rules]]\npattern = '%d+'\ntype = 'number'\n")
            .unwrap();
        let id = registry.load("words").unwrap();
        assert_eq!(registry.syntax(id).map(Syntax::default_label), Some("plain"));
    }

    const DOCUMENT: [&str; 4] = ["int a; /* start", "still comment", "end */ int b;", "x"];

    #[test]
    fn test_state_before_derives_states() {
        let mut registry = SyntaxRegistry::with_builtins().unwrap();
        let id = registry.load("c").unwrap();
        let tokenizer = registry.tokenizer(id).unwrap();
        let mut cache = HighlightCache::new();

        assert_eq!(cache.state_before(&tokenizer, &DOCUMENT, 0), LineState::NORMAL);
        assert_eq!(cache.cached_lines(), 0);

        let comment = LineState::NORMAL.with_active(0, 1);
        assert_eq!(cache.state_before(&tokenizer, &DOCUMENT, 2), comment);
        assert_eq!(cache.cached_lines(), 2);
        assert_eq!(cache.state_before(&tokenizer, &DOCUMENT, 3), LineState::NORMAL);
        assert_eq!(cache.state_before(&tokenizer, &DOCUMENT, 99), LineState::NORMAL);
        assert_eq!(cache.cached_lines(), 4);
    }

    #[test]
    fn test_highlight_after_edit() {
        let mut registry = SyntaxRegistry::with_builtins().unwrap();
        let id = registry.load("c").unwrap();
        let tokenizer = registry.tokenizer(id).unwrap();
        let mut cache = HighlightCache::new();
        let mut lines: Vec<String> = DOCUMENT.iter().map(|s| s.to_string()).collect();

        let line = cache.highlight(&tokenizer, &lines, 1).unwrap();
        assert_eq!(line.pairs(), vec![("comment", 13)]);

        // close the comment early
        lines[1] = "still */ x".to_string();
        cache.invalidate_from(1);
        let line = cache.highlight(&tokenizer, &lines, 1).unwrap();
        assert_eq!(line.state, LineState::NORMAL);
        assert_eq!(line.pairs()[0], ("comment", 8));
        assert_eq!(cache.cached_lines(), 2);

        assert!(cache.highlight(&tokenizer, &lines, 4).is_none());
    }
}
