//! Python grammar

pub(super) const GRAMMAR: &str = r#"
name = "python"
extensions = ["py", "pyw", "pyi"]

[[rules]]
pattern = '#.*'
type = "comment"

[[rules]]
pattern = ['^%s*"""', '"""']
type = "comment"

[[rules]]
pattern = ['[ruU]?"""', '"""', '\']
type = "string"

[[rules]]
pattern = ["[ruU]?'''", "'''", '\']
type = "string"

[[rules]]
pattern = ['[ruU]?"', '"', '\']
type = "string"

[[rules]]
pattern = ["[ruU]?'", "'", '\']
type = "string"

[[rules]]
pattern = '0x%x+'
type = "number"

[[rules]]
pattern = '%d+[%d%.eE_]*j?'
type = "number"

[[rules]]
pattern = '%.%d+j?'
type = "number"

[[rules]]
pattern = '@[%a_][%w_%.]*'
type = "keyword2"

[[rules]]
pattern = '[%+%-=/%*%^%%<>!~|&]'
type = "operator"

[[rules]]
pattern = 'def%s()[%a_][%w_]*'
type = ["keyword", "function"]

[[rules]]
pattern = 'class%s()[%a_][%w_]*'
type = ["keyword", "keyword2"]

[[rules]]
pattern = '[%a_][%w_]*%f[(]'
type = "function"

[[rules]]
pattern = '[%a_][%w_]*'
type = "symbol"

[symbols]
and = "keyword"
as = "keyword"
assert = "keyword"
async = "keyword"
await = "keyword"
break = "keyword"
continue = "keyword"
del = "keyword"
elif = "keyword"
else = "keyword"
except = "keyword"
finally = "keyword"
for = "keyword"
from = "keyword"
global = "keyword"
if = "keyword"
import = "keyword"
in = "keyword"
is = "keyword"
lambda = "keyword"
nonlocal = "keyword"
not = "keyword"
or = "keyword"
pass = "keyword"
raise = "keyword"
return = "keyword"
try = "keyword"
while = "keyword"
with = "keyword"
yield = "keyword"
self = "keyword2"
int = "keyword2"
str = "keyword2"
float = "keyword2"
list = "keyword2"
dict = "keyword2"
True = "literal"
False = "literal"
None = "literal"
"#;
