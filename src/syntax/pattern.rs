//! Pattern matching for grammar rules
//!
//! Two pattern flavours are supported:
//!
//! - `Pattern::Lua`: a Lua-style pattern evaluated by a single
//!   left-to-right pass with exactly one remembered greedy retry point.
//!   A later greedy quantifier overwrites the retry point of an earlier
//!   one, so ambiguous patterns can fail where a full backtracking engine
//!   would succeed. Grammars are written against this behaviour.
//! - `Pattern::Regex`: delegated to the `regex-automata` meta engine
//!   (the engine behind `regex`), searched anchored at the offset.
//!
//! Both report a match as a list of boundaries: absolute byte positions in
//! the text, one per closing capture group and a final one at the end of
//! the whole match. A match is only attempted at the given offset.
//!
//! Lua pattern notes:
//! - `%a %w %l %u %c` also accept any byte >= 0x80, so multibyte UTF-8
//!   characters count as letters. A matched class advances by a whole
//!   UTF-8 character.
//! - Classes take escapes but no ranges; `[` inside a class and a `]`
//!   outside one are literals.
//! - Parentheses only mark boundaries. They are not stack-tracked, so
//!   nested groups give boundaries in the order the `)` are reached.
//! - Running out of input while only optional elements (`*`, `-`, `?`)
//!   remain is still a match.

use regex_automata::util::syntax;
use regex_automata::{meta, Anchored, Input};

use crate::error::{Result, SyntaxError};

/// A compiled rule pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Lua-style pattern source
    Lua(String),
    /// Compiled regular expression
    Regex(RegexPattern),
}

/// A compiled regular expression with its source
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    regex: meta::Regex,
}

impl Pattern {
    /// Create a Lua-style pattern
    pub fn lua(source: &str) -> Self {
        Pattern::Lua(source.to_string())
    }

    /// Compile a regular expression pattern
    pub fn regex(source: &str) -> Result<Self> {
        meta::Builder::new()
            .configure(meta::Config::new().utf8_empty(false))
            .syntax(syntax::Config::new().unicode(true).utf8(false))
            .build(source)
            .map(|regex| {
                Pattern::Regex(RegexPattern {
                    source: source.to_string(),
                    regex,
                })
            })
            .map_err(|err| SyntaxError::Compile {
                pattern: source.to_string(),
                message: err.to_string(),
                offset: error_offset(source),
            })
    }

    /// Pattern source text
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Lua(source) => source,
            Pattern::Regex(re) => &re.source,
        }
    }

    /// Number of boundaries a match of this pattern produces
    pub fn boundary_count(&self) -> usize {
        match self {
            Pattern::Lua(source) => lua_group_count(source.as_bytes()) + 1,
            Pattern::Regex(re) => re.regex.captures_len(),
        }
    }

    /// Match at `offset`, returning the boundaries on success
    pub fn find_at(&self, text: &[u8], offset: usize) -> Option<Vec<usize>> {
        let mut boundaries = Vec::new();
        self.match_at(text, offset, &mut boundaries)
            .then_some(boundaries)
    }

    /// Match at `offset`, writing the boundaries into `boundaries`
    ///
    /// `boundaries` is cleared first. Returns whether the pattern matched.
    pub fn match_at(&self, text: &[u8], offset: usize, boundaries: &mut Vec<usize>) -> bool {
        boundaries.clear();
        if offset > text.len() {
            return false;
        }
        match self {
            Pattern::Lua(source) => {
                let matched = LuaMatcher::new(source.as_bytes(), text).run(offset, boundaries);
                if !matched {
                    boundaries.clear();
                }
                matched
            }
            Pattern::Regex(re) => regex_match(&re.regex, text, offset, boundaries),
        }
    }
}

fn regex_match(re: &meta::Regex, text: &[u8], offset: usize, boundaries: &mut Vec<usize>) -> bool {
    // Anchored: a failed try stops at `offset` instead of scanning the line.
    let input = Input::new(text).range(offset..).anchored(Anchored::Yes);
    let mut captures = re.create_captures();
    re.search_captures(&input, &mut captures);
    let Some(whole) = captures.get_match() else {
        return false;
    };
    let mut last = offset;
    for group in 1..captures.group_len() {
        let end = captures.get_group(group).map_or(last, |span| span.end).max(last);
        boundaries.push(end);
        last = end;
    }
    boundaries.push(whole.end().max(last));
    true
}

fn error_offset(source: &str) -> usize {
    match regex_syntax::Parser::new().parse(source) {
        Err(regex_syntax::Error::Parse(err)) => err.span().start.offset,
        Err(regex_syntax::Error::Translate(err)) => err.span().start.offset,
        _ => 0,
    }
}

/// Count the `)` markers outside of classes
fn lua_group_count(pattern: &[u8]) -> usize {
    let mut count = 0;
    let mut in_class = false;
    let mut i = 0;
    while i < pattern.len() {
        match pattern[i] {
            b'%' => i += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b')' if !in_class => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t'..=b'\r')
}

/// First UTF-8 character start at or after `i`
fn char_start_from(text: &[u8], mut i: usize) -> usize {
    while i < text.len() && text[i] & 0xC0 == 0x80 {
        i += 1;
    }
    i
}

/// Index one pattern element past `i`, or None for elements that can't be empty
fn element_end(pattern: &[u8], i: usize) -> Option<usize> {
    match pattern[i] {
        b'%' if pattern.get(i + 1).is_some_and(|c| c.eq_ignore_ascii_case(&b'f')) => None,
        b'%' => Some(i + 2),
        b'[' => {
            let mut j = i + 1;
            if pattern.get(j) == Some(&b'^') {
                j += 1;
            }
            while j < pattern.len() {
                match pattern[j] {
                    b'%' => j += 2,
                    b']' => return Some(j + 1),
                    _ => j += 1,
                }
            }
            None
        }
        _ => Some(i + 1),
    }
}

struct LuaMatcher<'p, 't> {
    pattern: &'p [u8],
    text: &'t [u8],
}

impl<'p, 't> LuaMatcher<'p, 't> {
    fn new(pattern: &'p [u8], text: &'t [u8]) -> Self {
        Self { pattern, text }
    }

    fn at(&self, i: usize) -> u8 {
        self.pattern.get(i).copied().unwrap_or(0)
    }

    /// Does the first element of the pattern match the byte at `offset`?
    fn probe(pattern: &[u8], text: &[u8], offset: usize) -> bool {
        LuaMatcher::new(pattern, text).evaluate(offset, None, true)
    }

    fn run(&self, offset: usize, boundaries: &mut Vec<usize>) -> bool {
        self.evaluate(offset, Some(boundaries), false)
    }

    /// Single pass over the pattern.
    ///
    /// In probe mode the result is whether the first element matches at
    /// `offset`; nothing is recorded.
    fn evaluate(&self, offset: usize, mut boundaries: Option<&mut Vec<usize>>, probe: bool) -> bool {
        let text = self.text;
        let end = text.len();
        let mut sp = 0;
        let mut pend = self.pattern.len();
        let mut ti = offset;

        let mut open_square = 0u32;
        let mut inverted = false;
        let mut frontier: Option<(usize, usize)> = None;
        let mut rewound = false;
        let mut class_start = 0;
        let mut retry: Option<usize> = None;
        let mut restores = 0usize;
        let restore_limit = (self.pattern.len() + 1) * (end - offset + 1);

        let mut min = 1usize;
        let mut max = 1usize;
        let mut count = 0usize;
        let mut matches = false;
        let mut finished = false;
        let mut repeating = false;
        let mut must_terminate = false;

        if self.at(0) == b'^' {
            if offset != 0 {
                return false;
            }
            sp += 1;
        }
        if pend > sp && self.pattern[pend - 1] == b'$' {
            must_terminate = true;
            pend -= 1;
        }

        while sp < pend {
            if ti == end {
                if finished {
                    if count >= min {
                        break;
                    }
                    return false;
                }
                if let Some(point) = retry.take() {
                    if restores < restore_limit {
                        restores += 1;
                        ti = point;
                        sp += 1;
                        repeating = false;
                        continue;
                    }
                }
                if !probe && self.optional_tail(sp, pend, repeating, ti, boundaries.as_deref_mut()) {
                    sp = pend;
                    break;
                }
                return false;
            }
            repeating = false;

            if open_square > 0 && matches && (self.at(sp) != b']' || self.at(sp - 1) == b'%') {
                sp += 1;
                continue;
            }
            if self.at(sp) != b']' && open_square == 0 {
                class_start = sp;
            }

            match self.at(sp) {
                0 => return false,
                b'.' => {
                    matches = true;
                    sp += 1;
                }
                b'(' if open_square == 0 => {
                    sp += 1;
                    continue;
                }
                b')' if open_square == 0 => {
                    if let Some(out) = boundaries.as_deref_mut() {
                        out.push(ti);
                    }
                    sp += 1;
                    class_start = sp;
                    continue;
                }
                b'[' if open_square == 0 => {
                    open_square = 1;
                    class_start = sp;
                    sp += 1;
                    if self.at(sp) == b'^' {
                        inverted = true;
                        sp += 1;
                    }
                    continue;
                }
                b']' if open_square > 0 => {
                    open_square -= 1;
                    sp += 1;
                }
                b'%' => {
                    let kind = self.at(sp + 1);
                    let lower = kind.to_ascii_lowercase();
                    let c = text[ti];
                    matches = match lower {
                        0 => return false,
                        b'a' => c.is_ascii_alphabetic() || c >= 0x80,
                        b'w' => c.is_ascii_alphanumeric() || c >= 0x80,
                        b'l' => c.is_ascii_lowercase() || c >= 0x80,
                        b'u' => c.is_ascii_uppercase() || c >= 0x80,
                        b'd' => c.is_ascii_digit(),
                        b'g' => c.is_ascii_graphic(),
                        b'c' => c.is_ascii_control() || c >= 0x80,
                        b'p' => c.is_ascii_punctuation(),
                        b's' => is_space(c),
                        b'x' => c.is_ascii_hexdigit(),
                        b'z' => c == 0,
                        b'f' => {
                            frontier = Some((sp, ti));
                            sp += 2;
                            continue;
                        }
                        _ => kind == c,
                    };
                    if lower != kind {
                        matches = !matches;
                    }
                    sp += 2;
                }
                literal => {
                    matches = literal == text[ti];
                    sp += 1;
                }
            }

            if open_square > 0 {
                continue;
            }
            if inverted {
                matches = !matches;
            }
            if probe {
                return matches;
            }

            let recent = matches;
            if matches {
                count += 1;
                matches = false;
            }

            if let Some((fp, ft)) = frontier.take() {
                let negated = self.at(fp + 3) == b'^';
                let set = self.pattern.get(fp + 2..).unwrap_or(&[]);
                if ti == 0 && negated {
                    return false;
                }
                let outside_before = ti == 0 || !Self::probe(set, text, ti - 1);
                let inside_here = Self::probe(set, text, ti);
                if !outside_before || !inside_here {
                    return false;
                }
                // Zero width: the next advance lands back on `ft`.
                ti = ft;
                rewound = true;
            }

            let mut greedy = false;
            match self.at(sp) {
                b'-' => {
                    min = 0;
                    max = usize::MAX;
                    sp += 1;
                }
                b'*' => {
                    min = 0;
                    max = usize::MAX;
                    sp += 1;
                    greedy = true;
                }
                b'+' => {
                    min = 1;
                    max = usize::MAX;
                    sp += 1;
                    greedy = true;
                }
                b'?' => {
                    min = 0;
                    max = 1;
                    sp += 1;
                    greedy = true;
                }
                _ => {}
            }
            finished = sp == pend;

            if recent && count < max {
                let rest = self.pattern.get(sp..).unwrap_or(&[]);
                let next_matches = Self::probe(rest, text, ti);
                if greedy || !next_matches {
                    if next_matches {
                        retry = Some(ti);
                    }
                    sp = class_start;
                    repeating = true;
                } else {
                    // Lazy: the following element takes this character.
                    sp += 1;
                    finished = sp == pend;
                }
                ti = self.advance(ti, &mut rewound);
                continue;
            }

            if count < min || count > max {
                return false;
            }
            min = 1;
            max = 1;
            if count > 0 && recent {
                ti = self.advance(ti, &mut rewound);
            }
            count = 0;
            class_start = sp;
            inverted = false;
        }

        if must_terminate && ti != end {
            return false;
        }
        match boundaries {
            Some(out) => {
                out.push(ti);
                true
            }
            None => false,
        }
    }

    fn advance(&self, ti: usize, rewound: &mut bool) -> usize {
        if std::mem::take(rewound) {
            char_start_from(self.text, ti)
        } else {
            char_start_from(self.text, ti + 1)
        }
    }

    /// Out of input: can every remaining element match empty?
    ///
    /// When `repeating`, the element at `from` already matched at least once
    /// and is skipped along with its quantifier.
    fn optional_tail(
        &self,
        from: usize,
        pend: usize,
        repeating: bool,
        ti: usize,
        boundaries: Option<&mut Vec<usize>>,
    ) -> bool {
        let pattern = &self.pattern[..pend];
        let mut i = from;
        if repeating {
            let Some(next) = element_end(pattern, i) else {
                return false;
            };
            i = next;
            if matches!(self.at(i), b'-' | b'*' | b'+' | b'?') {
                i += 1;
            }
        }
        let mut closes = 0;
        while i < pend {
            match pattern[i] {
                b'(' => i += 1,
                b')' => {
                    closes += 1;
                    i += 1;
                }
                _ => {
                    let Some(next) = element_end(pattern, i) else {
                        return false;
                    };
                    if !matches!(self.at(next), b'-' | b'*' | b'?') {
                        return false;
                    }
                    i = next + 1;
                }
            }
        }
        if let Some(out) = boundaries {
            out.extend(std::iter::repeat(ti).take(closes));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lua(pattern: &str, text: &str, offset: usize) -> Option<Vec<usize>> {
        Pattern::lua(pattern).find_at(text.as_bytes(), offset)
    }

    #[test]
    fn test_digits() {
        assert_eq!(lua("%d+", "123abc", 0), Some(vec![3]));
        assert_eq!(lua("%d+", "abc", 0), None);
        assert_eq!(lua("%d+", "ab12", 2), Some(vec![4]));
    }

    #[test]
    fn test_lazy_to_end_of_line() {
        assert_eq!(lua("^#.-$", "# hello", 0), Some(vec![7]));
        assert_eq!(lua("^#", "a #", 2), None);
    }

    #[test]
    fn test_lazy_stops_at_first_terminator() {
        assert_eq!(lua("\".-\"", "\"ab\"c\"", 0), Some(vec![4]));
    }

    #[test]
    fn test_end_anchor() {
        assert_eq!(lua("%d+$", "12a", 0), None);
        assert_eq!(lua("%d+$", "a12", 1), Some(vec![3]));
    }

    #[test]
    fn test_captures() {
        assert_eq!(lua("(%w+)%s*=", "key = 1", 0), Some(vec![3, 5]));
        assert_eq!(
            lua("struct%s()[%a_][%w_]*", "struct foo;", 0),
            Some(vec![7, 10])
        );
    }

    #[test]
    fn test_multibyte_letters() {
        // 'é' is two bytes and counts as one letter
        assert_eq!(lua("%a+", "héllo world", 0), Some(vec![6]));
        assert_eq!(lua("%d", "é", 0), None);
    }

    #[test]
    fn test_inverted_class() {
        assert_eq!(lua("[^\"]+", "abc\"", 0), Some(vec![3]));
        assert_eq!(lua("%S+", "ab cd", 0), Some(vec![2]));
    }

    #[test]
    fn test_frontier() {
        assert_eq!(lua("%f[%w]%w+", "  foo", 2), Some(vec![5]));
        assert_eq!(lua("%f[%w]%w+", "xfoo", 1), None);
        assert_eq!(lua("[%a_][%w_]*%f[(]", "foo(x)", 0), Some(vec![3]));
        assert_eq!(lua("[%a_][%w_]*%f[(]", "foo x", 0), None);
    }

    #[test]
    fn test_greedy_retry_point() {
        // The most recent 'x' is the retry point.
        assert_eq!(lua(".*x", "axbx", 0), Some(vec![4]));
        assert_eq!(lua(".*x", "axb", 0), Some(vec![2]));
    }

    #[test]
    fn test_optional_tail_at_end_of_input() {
        assert_eq!(lua("[%a_][%w_]*", "x", 0), Some(vec![1]));
        assert_eq!(lua("[%a_][%w_]*", "x1", 0), Some(vec![2]));
        assert_eq!(lua("%d+%s*", "12", 0), Some(vec![2]));
        assert_eq!(lua("ab", "a", 0), None);
    }

    #[test]
    fn test_escaped_magic_characters() {
        assert_eq!(lua("/%*", "/* c", 0), Some(vec![2]));
        assert_eq!(lua("%*/", "*/", 0), Some(vec![2]));
        assert_eq!(lua("%.", "x", 0), None);
    }

    #[test]
    fn test_boundary_count() {
        assert_eq!(Pattern::lua("%d+").boundary_count(), 1);
        assert_eq!(Pattern::lua("(%w+)%s*()=").boundary_count(), 3);
        assert_eq!(Pattern::lua("[()]").boundary_count(), 1);
        assert_eq!(Pattern::regex(r"(fn)(\s+)\w+").unwrap().boundary_count(), 3);
    }

    #[test]
    fn test_regex_is_anchored_at_offset() {
        let re = Pattern::regex("[0-9]+").unwrap();
        assert_eq!(re.find_at(b"ab 42", 3), Some(vec![5]));
        assert_eq!(re.find_at(b"ab 42", 2), None);
        assert_eq!(re.find_at(b"ab 42", 5), None);
    }

    #[test]
    fn test_regex_does_not_match_later_in_line() {
        // a match further right must not count as a match at the offset
        let re = Pattern::regex(r"\d+").unwrap();
        assert_eq!(re.find_at(b"x 1", 0), None);
        assert_eq!(re.find_at(b"x 1", 2), Some(vec![3]));

        // leftmost-first alternation, looking behind the offset for `\b`
        let word = Pattern::regex(r"\b(a|ab)").unwrap();
        assert_eq!(word.find_at(b"ab", 0), Some(vec![1, 1]));
        assert_eq!(word.find_at(b"xab", 1), None);
    }

    #[test]
    fn test_regex_group_boundaries() {
        let re = Pattern::regex(r"(fn)(\s+)\w+").unwrap();
        assert_eq!(re.find_at(b"fn main()", 0), Some(vec![2, 3, 7]));

        let optional = Pattern::regex(r"(a)?(b)").unwrap();
        assert_eq!(optional.find_at(b"b", 0), Some(vec![0, 1, 1]));
    }

    #[test]
    fn test_regex_compile_error() {
        match Pattern::regex("ab(c") {
            Err(SyntaxError::Compile { pattern, offset, .. }) => {
                assert_eq!(pattern, "ab(c");
                assert_eq!(offset, 2);
            }
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_past_end() {
        assert_eq!(lua("a", "a", 2), None);
    }
}
