//! Markdown grammar
//!
//! Fenced blocks tagged `c` or `python` are tokenized with those grammars.

pub(super) const GRAMMAR: &str = r#"
name = "markdown"
extensions = ["md", "markdown", "mkd"]

[[rules]]
pattern = ['^```c%s*$', '^```']
type = "string"
syntax = "c"

[[rules]]
pattern = ['^```python%s*$', '^```']
type = "string"
syntax = "python"

[[rules]]
pattern = ['^```', '^```']
type = "string"

[[rules]]
pattern = ['<!%-%-', '%-%->']
type = "comment"

[[rules]]
pattern = '^#+%s.*'
type = "keyword"

[[rules]]
pattern = '^%s*[%*%-+]%s'
type = "operator"

[[rules]]
pattern = '`[^`]*`'
type = "string"

[[rules]]
pattern = '%*%*[^%*]+%*%*'
type = "keyword2"

[[rules]]
pattern = '%*[^%*%s][^%*]*%*'
type = "keyword2"

[[rules]]
pattern = '%[()[^%]]*()%]%([^%)]*%)'
type = ["operator", "function", "operator"]

[[rules]]
pattern = 'https?://%S+'
type = "function"
"#;
