//! C/C++ grammar
//!
//! Region rules come first: the numeric, operator and identifier rules
//! after them never consume a `/`, quote or apostrophe, so a quick pass
//! over the leading rules ends every line in the same state as a full one.

pub(super) const GRAMMAR: &str = r#"
name = "c"
extensions = ["c", "h", "cpp", "hpp", "cc", "cxx"]

[[rules]]
pattern = '//.*'
type = "comment"

[[rules]]
pattern = ['/%*', '%*/']
type = "comment"

[[rules]]
pattern = ['"', '"', '\']
type = "string"

[[rules]]
pattern = ["'", "'", '\']
type = "string"

[[rules]]
pattern = '0x%x+'
type = "number"

[[rules]]
pattern = '%d+[%d%.eE]*f?'
type = "number"

[[rules]]
pattern = '%.?%d+f?'
type = "number"

[[rules]]
pattern = '[%+%-=/%*%^%%<>!~|&]'
type = "operator"

[[rules]]
pattern = '##'
type = "operator"

[[rules]]
pattern = 'struct%s()[%a_][%w_]*'
type = ["keyword", "keyword2"]

[[rules]]
pattern = 'union%s()[%a_][%w_]*'
type = ["keyword", "keyword2"]

[[rules]]
pattern = '[%a_][%w_]*%f[(]'
type = "function"

[[rules]]
pattern = '#%s*[%a_][%w_]*'
type = "keyword"

[[rules]]
pattern = '[%a_][%w_]*'
type = "symbol"

[symbols]
if = "keyword"
then = "keyword"
else = "keyword"
do = "keyword"
while = "keyword"
for = "keyword"
break = "keyword"
continue = "keyword"
return = "keyword"
goto = "keyword"
switch = "keyword"
case = "keyword"
default = "keyword"
struct = "keyword"
union = "keyword"
enum = "keyword"
typedef = "keyword"
sizeof = "keyword"
static = "keyword"
extern = "keyword"
inline = "keyword"
const = "keyword"
volatile = "keyword"
register = "keyword"
auto = "keyword"
void = "keyword2"
char = "keyword2"
short = "keyword2"
int = "keyword2"
long = "keyword2"
float = "keyword2"
double = "keyword2"
signed = "keyword2"
unsigned = "keyword2"
bool = "keyword2"
size_t = "keyword2"
true = "literal"
false = "literal"
NULL = "literal"
"#;
