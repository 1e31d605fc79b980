//! TOML grammar

pub(super) const GRAMMAR: &str = r#"
name = "toml"
extensions = ["toml"]

[[rules]]
pattern = '#.*'
type = "comment"

[[rules]]
pattern = ['"""', '"""', '\']
type = "string"

[[rules]]
pattern = ["'''", "'''"]
type = "string"

[[rules]]
pattern = ['"', '"', '\']
type = "string"

[[rules]]
pattern = ["'", "'"]
type = "string"

[[rules]]
pattern = '^%s*%[%[[^%]]+%]%]'
type = "keyword"

[[rules]]
pattern = '^%s*%[[^%]]+%]'
type = "keyword"

[[rules]]
pattern = '%d%d%d%d%-%d%d%-%d%d[T ]?[%d:%.]*Z?'
type = "number"

[[rules]]
pattern = '[%+%-]?%d[%d_%.eE]*'
type = "number"

[[rules]]
pattern = '[%w_%-%.]+()%s*='
type = ["function", "operator"]

[[rules]]
pattern = '[%[%]{},=]'
type = "operator"

[[rules]]
pattern = '[%a_][%w_%-]*'
type = "symbol"

[symbols]
true = "literal"
false = "literal"
inf = "literal"
nan = "literal"
"#;
