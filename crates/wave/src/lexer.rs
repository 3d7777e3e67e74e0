//! Line-oriented lexical feature pass.
//!
//! Every sub-metric is computed from the counts produced here; nothing in the
//! scorer looks at the raw text again.

use serde::{Deserialize, Serialize};

/// Keywords that introduce a named callable unit.
pub const CALLABLE_KEYWORDS: &[&str] = &["fn", "function", "def", "func", "sub", "proc"];

/// Keywords that introduce a declared identifier.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "fn",
    "function",
    "def",
    "func",
    "let",
    "var",
    "const",
    "class",
    "struct",
    "enum",
    "trait",
    "interface",
    "type",
];

/// Tokens that may sit between a declaration keyword and its name.
const DECLARATION_MODIFIERS: &[&str] = &["mut", "async", "ref"];

/// Keywords of arrow-function bindings (`const name = (..) => ..`).
const BINDING_KEYWORDS: &[&str] = &["const", "let", "var"];

/// Markers that declare intent explicitly. Matched case-insensitively.
pub const INTENT_MARKERS: &[&str] = &[
    "@intent",
    "intent:",
    "@purpose",
    "purpose:",
    "rationale:",
    "@why",
    "why:",
];

/// Cross-reference markers counted on top of [`INTENT_MARKERS`].
pub const REFERENCE_MARKERS: &[&str] = &["@see", "@link", "ref:", "see also", "http://", "https://"];

/// Block comments recognised anywhere on a line, with their closers.
const BLOCK_COMMENTS: &[(&str, &str)] = &[("/*", "*/"), ("<!--", "-->")];

/// Docstring fences, treated as comments only when they open a line.
const DOCSTRING_FENCES: &[(&str, &str)] = &[("\"\"\"", "\"\"\""), ("'''", "'''")];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Code,
}

/// A named callable unit and the number of non-blank lines it spans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableUnit {
    pub name: String,
    /// 1-based line of the declaration.
    pub line: usize,
    pub line_count: usize,
}

/// Open/close counts for one bracket type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterCount {
    pub open: usize,
    pub close: usize,
}

impl DelimiterCount {
    pub fn is_balanced(&self) -> bool {
        self.open == self.close
    }
}

/// Delimiter counts over code (string literals and comments excluded).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterBalance {
    pub parens: DelimiterCount,
    pub brackets: DelimiterCount,
    pub braces: DelimiterCount,
}

impl DelimiterBalance {
    pub fn is_balanced(&self) -> bool {
        self.parens.is_balanced() && self.brackets.is_balanced() && self.braces.is_balanced()
    }

    /// Names of the bracket pairs whose counts differ, in fixed order.
    pub fn unbalanced(&self) -> Vec<String> {
        [
            ("()", self.parens),
            ("[]", self.brackets),
            ("{}", self.braces),
        ]
        .into_iter()
        .filter(|(_, count)| !count.is_balanced())
        .map(|(pair, count)| format!("{} ({} open / {} close)", pair, count.open, count.close))
        .collect()
    }

    fn scan(&mut self, code: &str) {
        for c in code.chars() {
            match c {
                '(' => self.parens.open += 1,
                ')' => self.parens.close += 1,
                '[' => self.brackets.open += 1,
                ']' => self.brackets.close += 1,
                '{' => self.braces.open += 1,
                '}' => self.braces.close += 1,
                _ => {}
            }
        }
    }
}

/// Named counts extracted from a text/code string in one pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LexicalFeatures {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub callable_units: Vec<CallableUnit>,
    pub identifiers: Vec<String>,
    pub delimiters: DelimiterBalance,
    /// Distinct intent markers found, in [`INTENT_MARKERS`] order.
    pub intent_markers: Vec<String>,
    /// Distinct reference markers found (intent markers included).
    pub reference_markers: Vec<String>,
}

impl LexicalFeatures {
    /// Tokenize `content` and collect every feature the scorer needs.
    pub fn extract(content: &str) -> Self {
        let mut features = LexicalFeatures::default();
        let mut kinds = Vec::new();
        let mut unit_starts: Vec<(String, usize)> = Vec::new();
        let mut block_close: Option<&'static str> = None;

        for raw in content.lines() {
            let line = raw.trim();

            if line.is_empty() {
                kinds.push(match block_close {
                    Some(_) => LineKind::Comment,
                    None => LineKind::Blank,
                });
                continue;
            }

            if block_close.is_none() && is_line_comment(line) {
                kinds.push(LineKind::Comment);
                continue;
            }

            let (code, still_open) = strip_literals_and_comments(line, block_close);
            block_close = still_open;

            // Only comment text was left on this line.
            if code.trim().is_empty() {
                kinds.push(LineKind::Comment);
                continue;
            }

            kinds.push(LineKind::Code);
            features.delimiters.scan(&code);

            let tokens = tokenize(&code);
            if let Some(name) = callable_name(&tokens, &code) {
                unit_starts.push((name, kinds.len() - 1));
            }
            features.identifiers.extend(declared_identifiers(&tokens));
        }

        features.total_lines = kinds.len();
        features.blank_lines = kinds.iter().filter(|k| **k == LineKind::Blank).count();
        features.comment_lines = kinds.iter().filter(|k| **k == LineKind::Comment).count();
        features.code_lines = kinds.iter().filter(|k| **k == LineKind::Code).count();
        features.callable_units = measure_units(&unit_starts, &kinds);

        let lowered = content.to_lowercase();
        features.intent_markers = markers_in(&lowered, INTENT_MARKERS.iter().copied());
        features.reference_markers = markers_in(
            &lowered,
            INTENT_MARKERS.iter().chain(REFERENCE_MARKERS.iter()).copied(),
        );

        features
    }

    /// Non-blank lines.
    pub fn nonblank_lines(&self) -> usize {
        self.code_lines + self.comment_lines
    }

    /// Comment lines over non-blank lines, in `[0, 1]`.
    pub fn comment_ratio(&self) -> f64 {
        match self.nonblank_lines() {
            0 => 0.0,
            n => self.comment_lines as f64 / n as f64,
        }
    }

    pub fn has_intent_marker(&self) -> bool {
        !self.intent_markers.is_empty()
    }
}

/// SQL/Lua style `-- ` comments. `#` and `//` are handled while stripping.
fn is_line_comment(line: &str) -> bool {
    line == "--" || line.starts_with("-- ")
}

/// `#` starts a comment unless it opens an attribute (`#[..]`, `#![..]`) or
/// is glued to the previous token (`r#"..."#`).
fn is_hash_comment(prev: Option<char>, rest: &str) -> bool {
    prev.map_or(true, char::is_whitespace) && !rest.starts_with("#[") && !rest.starts_with("#![")
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `'` at this position is a Rust lifetime or label rather than a
/// quoted literal.
fn is_lifetime(prev: Option<char>, rest: &str) -> bool {
    let run: String = rest.chars().take_while(|c| is_ident_char(*c)).collect();
    if run.is_empty() {
        return false;
    }
    if rest[run.len()..].starts_with('\'') {
        return false;
    }
    matches!(prev, Some('&') | Some('<')) || run == "static" || run.chars().count() <= 2
}

/// Blank out string/char literal bodies and drop comments, keeping only
/// characters that belong to code.
///
/// `block_close` is the closer of a block comment left open by an earlier
/// line. Returns the code and the closer still pending at the end of this
/// line, if any.
fn strip_literals_and_comments(
    line: &str,
    mut block_close: Option<&'static str>,
) -> (String, Option<&'static str>) {
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    let mut prev: Option<char> = None;

    if block_close.is_none() {
        if let Some((open, close)) = DOCSTRING_FENCES.iter().find(|(open, _)| line.starts_with(open)) {
            i = open.len();
            block_close = Some(*close);
        }
    }

    while i < line.len() {
        let rest = &line[i..];

        if let Some(close) = block_close {
            match rest.find(close) {
                Some(end) => {
                    i += end + close.len();
                    block_close = None;
                    out.push(' ');
                    prev = Some(' ');
                    continue;
                }
                None => break,
            }
        }

        if rest.starts_with("//") {
            break;
        }
        if let Some((open, close)) = BLOCK_COMMENTS.iter().find(|(open, _)| rest.starts_with(open)) {
            i += open.len();
            block_close = Some(*close);
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        if c == '#' && is_hash_comment(prev, rest) {
            break;
        }

        if c == '"' || c == '`' || c == '\'' {
            let body = &rest[1..];
            let literal = c != '\'' || !is_lifetime(prev, body);
            if literal {
                if let Some(len) = literal_len(body, c) {
                    out.push(c);
                    out.push(c);
                    i += len + 2;
                    prev = Some(c);
                    continue;
                }
            }
        }

        out.push(c);
        prev = Some(c);
        i += c.len_utf8();
    }

    (out, block_close)
}

/// Byte length of a quoted literal body (escape-aware), or `None` when the
/// quote is not closed on this line.
fn literal_len(body: &str, quote: char) -> Option<usize> {
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            c if c == quote => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split code into identifier runs and single punctuation tokens.
fn tokenize(code: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, c) in code.char_indices() {
        if is_ident_char(c) {
            if start.is_none() {
                start = Some(idx);
            }
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(&code[s..idx]);
        }
        if !c.is_whitespace() {
            tokens.push(&code[idx..idx + c.len_utf8()]);
        }
    }
    if let Some(s) = start {
        tokens.push(&code[s..]);
    }

    tokens
}

fn is_name(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
}

fn is_keyword(token: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&token) || DECLARATION_MODIFIERS.contains(&token)
}

/// Name following a declaration keyword at `idx`, skipping modifiers.
fn name_after(tokens: &[&str], idx: usize) -> Option<String> {
    let mut j = idx + 1;
    while tokens.get(j).is_some_and(|t| DECLARATION_MODIFIERS.contains(t)) {
        j += 1;
    }
    let candidate = tokens.get(j)?;
    if is_name(candidate) && !is_keyword(candidate) {
        Some((*candidate).to_string())
    } else {
        None
    }
}

fn callable_name(tokens: &[&str], code: &str) -> Option<String> {
    for (idx, token) in tokens.iter().enumerate() {
        if CALLABLE_KEYWORDS.contains(token) {
            if let Some(name) = name_after(tokens, idx) {
                return Some(name);
            }
        }
    }

    if code.contains("=>") {
        for (idx, token) in tokens.iter().enumerate() {
            if BINDING_KEYWORDS.contains(token) && tokens.get(idx + 2) == Some(&"=") {
                if let Some(name) = name_after(tokens, idx) {
                    return Some(name);
                }
            }
        }
    }

    None
}

fn declared_identifiers(tokens: &[&str]) -> Vec<String> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| DECLARATION_KEYWORDS.contains(*t))
        .filter_map(|(idx, _)| name_after(tokens, idx))
        .collect()
}

/// A unit spans from its declaration to the line before the next unit.
fn measure_units(starts: &[(String, usize)], kinds: &[LineKind]) -> Vec<CallableUnit> {
    starts
        .iter()
        .enumerate()
        .map(|(n, (name, start))| {
            let end = starts.get(n + 1).map(|(_, s)| *s).unwrap_or(kinds.len());
            let line_count = kinds[*start..end]
                .iter()
                .filter(|k| **k != LineKind::Blank)
                .count();
            CallableUnit {
                name: name.clone(),
                line: start + 1,
                line_count,
            }
        })
        .collect()
}

fn markers_in<'a>(lowered: &str, markers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for marker in markers {
        if lowered.contains(marker) && !found.iter().any(|f| f == marker) {
            found.push(marker.to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUST_SAMPLE: &str = r#"// @intent: parse configuration files
// Purpose: keep the loader small.

fn load_config(path: &str) -> Result<String, Error> {
    let contents = read(path)?;
    Ok(contents)
}

/* block comment
   spanning lines */
fn validate_entry<'a>(entry: &'a str) -> bool {
    let trimmed = entry.trim();
    !trimmed.is_empty()
}
"#;

    #[test]
    fn classifies_lines() {
        let f = LexicalFeatures::extract(RUST_SAMPLE);
        assert_eq!(f.total_lines, 14);
        assert_eq!(f.comment_lines, 4);
        assert_eq!(f.blank_lines, 2);
        assert_eq!(f.code_lines, 8);
    }

    #[test]
    fn finds_callable_units_and_lengths() {
        let f = LexicalFeatures::extract(RUST_SAMPLE);
        let names: Vec<&str> = f.callable_units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["load_config", "validate_entry"]);
        assert_eq!(f.callable_units[0].line, 4);
        // four code lines + two comment lines before the next declaration
        assert_eq!(f.callable_units[0].line_count, 6);
        assert_eq!(f.callable_units[1].line_count, 4);
    }

    #[test]
    fn collects_declared_identifiers() {
        let f = LexicalFeatures::extract(RUST_SAMPLE);
        assert_eq!(
            f.identifiers,
            vec!["load_config", "contents", "validate_entry", "trimmed"]
        );
    }

    #[test]
    fn lifetimes_do_not_break_balance() {
        let f = LexicalFeatures::extract(RUST_SAMPLE);
        assert!(f.delimiters.is_balanced(), "{:?}", f.delimiters);
    }

    #[test]
    fn delimiters_inside_strings_are_ignored() {
        let f = LexicalFeatures::extract("let s = \"((( [[\";\nlet c = '{';\n");
        assert!(f.delimiters.is_balanced());
    }

    #[test]
    fn trailing_comments_are_ignored_for_delimiters() {
        let f = LexicalFeatures::extract("let x = compute(1); // unmatched (\nx = 2  # also {\n");
        assert!(f.delimiters.is_balanced());
    }

    #[test]
    fn detects_unbalanced_delimiters() {
        let f = LexicalFeatures::extract("fn broken() {\n    call(1, 2;\n");
        assert!(!f.delimiters.is_balanced());
        let unbalanced = f.delimiters.unbalanced();
        assert_eq!(unbalanced.len(), 2);
        assert!(unbalanced[0].starts_with("()"));
        assert!(unbalanced[1].starts_with("{}"));
    }

    #[test]
    fn dereference_lines_are_code() {
        let src = "// @intent: bump the counter\nfn bump_counter(counter: &mut u32) {\n    *counter = (*counter + 1;\n}\n";
        let f = LexicalFeatures::extract(src);
        assert_eq!(f.code_lines, 3);
        assert_eq!(f.comment_lines, 1);
        assert_eq!(f.delimiters.unbalanced(), vec!["() (2 open / 1 close)"]);

        let f = LexicalFeatures::extract("fn scale(ptr: &mut f64) {\n    *ptr = (x;\n}\n");
        assert!(!f.delimiters.parens.is_balanced());
    }

    #[test]
    fn block_comment_opened_mid_line() {
        let src = "fn load_items() {\n    let total = 1; /* note: the loader\n       (see the legacy path\n    */\n}\n";
        let f = LexicalFeatures::extract(src);
        assert_eq!(f.code_lines, 3);
        assert_eq!(f.comment_lines, 2);
        assert!(f.delimiters.is_balanced(), "{:?}", f.delimiters);
        assert_eq!(f.identifiers, vec!["load_items", "total"]);
    }

    #[test]
    fn code_after_closed_block_comment() {
        let f = LexicalFeatures::extract("/* hdr */ fn parse_header() {\n}\n");
        assert_eq!(f.code_lines, 2);
        assert_eq!(f.comment_lines, 0);
        assert_eq!(f.callable_units[0].name, "parse_header");
        assert!(f.delimiters.is_balanced());
    }

    #[test]
    fn doc_block_continuations_are_comments() {
        let src = "/**\n * Parses (input.\n *\n */\nfn parse_input() {}\n";
        let f = LexicalFeatures::extract(src);
        assert_eq!(f.comment_lines, 4);
        assert_eq!(f.code_lines, 1);
        assert!(f.delimiters.is_balanced());
    }

    #[test]
    fn dash_comments_need_a_space() {
        let f = LexicalFeatures::extract("-- select rows\n--counter;\n");
        assert_eq!(f.comment_lines, 1);
        assert_eq!(f.code_lines, 1);
    }

    #[test]
    fn python_and_js_callables() {
        let src = "def handle_request(req):\n    return req\n\nconst sumAll = (xs) => xs.reduce(add);\nfunction (anon) { }\n";
        let f = LexicalFeatures::extract(src);
        let names: Vec<&str> = f.callable_units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["handle_request", "sumAll"]);
    }

    #[test]
    fn modifiers_are_skipped() {
        let f = LexicalFeatures::extract("let mut counter = 0;\nconst fn build() {}\n");
        assert_eq!(f.identifiers, vec!["counter", "build"]);
        assert_eq!(f.callable_units.len(), 1);
    }

    #[test]
    fn hash_attributes_are_code() {
        let f = LexicalFeatures::extract("#[derive(Debug)]\n# a shell comment\n");
        assert_eq!(f.code_lines, 1);
        assert_eq!(f.comment_lines, 1);
    }

    #[test]
    fn docstring_blocks_are_comments() {
        let src = "def run():\n    \"\"\"\n    Why: explain.\n    \"\"\"\n    return 1\n";
        let f = LexicalFeatures::extract(src);
        assert_eq!(f.comment_lines, 3);
        assert_eq!(f.code_lines, 2);
    }

    #[test]
    fn markers_are_case_insensitive_and_distinct() {
        let f = LexicalFeatures::extract("// INTENT: x\n// intent: y\n// @see https://example.com\n");
        assert_eq!(f.intent_markers, vec!["intent:"]);
        assert_eq!(f.reference_markers, vec!["intent:", "@see", "https://"]);
    }

    #[test]
    fn comment_ratio_of_empty_input_is_zero() {
        let f = LexicalFeatures::extract("");
        assert_eq!(f.total_lines, 0);
        assert_eq!(f.comment_ratio(), 0.0);
    }
}
