// Wed Aug 5 2026 - Alex

use crate::rules::engine::{RuleEngine, RuleSet, StringMatch};
use crate::rules::pattern::Pattern;
use crate::rules::RuleError;
use aho_corasick::AhoCorasick;
use std::sync::Arc;

/// Self-contained rule compiler and matcher.
///
/// Covers the rule-source subset this tool emits for inline patterns plus
/// plain rule files: text strings with `nocase`/`wide`/`ascii`/`fullword`
/// modifiers, hex strings with wildcards and jumps, and regex strings.
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine for NativeEngine {
    fn compile(&self, source: &str) -> Result<Arc<dyn RuleSet>, RuleError> {
        let parsed = parse_source(source)?;
        let mut rules = Vec::with_capacity(parsed.len());
        for pr in &parsed {
            let strings = pr
                .strings
                .iter()
                .map(compile_string)
                .collect::<Result<Vec<_>, _>>()?;
            log::debug!("compiled rule {} with {} string(s)", pr.name, strings.len());
            rules.push(CompiledRule {
                strings,
                condition: pr.condition.clone(),
            });
        }
        Ok(Arc::new(NativeRules { rules }))
    }
}

struct NativeRules {
    rules: Vec<CompiledRule>,
}

impl RuleSet for NativeRules {
    fn matches(&self, data: &[u8]) -> Vec<StringMatch> {
        let mut out = Vec::new();
        for rule in &self.rules {
            let hits: Vec<Vec<(usize, usize)>> =
                rule.strings.iter().map(|s| s.find_all(data)).collect();
            if !rule.satisfied(&hits) {
                continue;
            }
            for (cs, string_hits) in rule.strings.iter().zip(&hits) {
                for &(start, end) in string_hits {
                    out.push(StringMatch {
                        offset: start,
                        name: format!("${}", cs.identifier),
                        value: data[start..end].to_vec(),
                    });
                }
            }
        }
        out
    }
}

struct CompiledRule {
    strings: Vec<CompiledString>,
    condition: Condition,
}

impl CompiledRule {
    fn satisfied(&self, hits: &[Vec<(usize, usize)>]) -> bool {
        let matched = hits.iter().filter(|h| !h.is_empty()).count();
        match &self.condition {
            Condition::Any => matched > 0,
            Condition::All => !self.strings.is_empty() && matched == self.strings.len(),
            Condition::Count(n) => matched >= *n,
            Condition::Strings(ids) => ids.iter().all(|id| {
                self.strings
                    .iter()
                    .zip(hits)
                    .any(|(cs, h)| cs.identifier == *id && !h.is_empty())
            }),
        }
    }
}

struct CompiledString {
    identifier: String,
    matcher: Matcher,
    fullword: bool,
}

enum Matcher {
    Literal(AhoCorasick),
    Hex(Pattern),
    Regex(regex::bytes::Regex),
}

impl CompiledString {
    fn find_all(&self, data: &[u8]) -> Vec<(usize, usize)> {
        let mut hits: Vec<(usize, usize)> = match &self.matcher {
            Matcher::Literal(ac) => ac
                .find_overlapping_iter(data)
                .map(|m| (m.start(), m.end()))
                .collect(),
            Matcher::Hex(p) => p
                .find_all_in(data)
                .into_iter()
                .map(|s| (s, s + p.len()))
                .collect(),
            Matcher::Regex(re) => re.find_iter(data).map(|m| (m.start(), m.end())).collect(),
        };
        if self.fullword {
            hits.retain(|&(s, e)| word_bounded(data, s, e));
        }
        hits.sort_unstable();
        hits
    }
}

fn word_bounded(data: &[u8], start: usize, end: usize) -> bool {
    let before = start.checked_sub(1).and_then(|i| data.get(i).copied());
    let after = data.get(end).copied();
    !before.map_or(false, is_word_byte) && !after.map_or(false, is_word_byte)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn widen(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|&b| [b, 0u8]).collect()
}

fn compile_string(ps: &ParsedString) -> Result<CompiledString, RuleError> {
    let m = ps.mods;
    let matcher = match &ps.value {
        StringValue::Text(bytes) => {
            if bytes.is_empty() {
                return Err(RuleError::Compile(format!(
                    "empty string value for ${}",
                    ps.identifier
                )));
            }
            let mut variants: Vec<Vec<u8>> = Vec::new();
            if m.wide {
                variants.push(widen(bytes));
                if m.ascii {
                    variants.push(bytes.clone());
                }
            } else {
                variants.push(bytes.clone());
            }
            let ac = AhoCorasick::builder()
                .ascii_case_insensitive(m.nocase)
                .build(&variants)
                .map_err(|e| RuleError::Compile(format!("${}: {}", ps.identifier, e)))?;
            Matcher::Literal(ac)
        }
        StringValue::Hex(body) => {
            if m.nocase || m.wide || m.ascii || m.fullword {
                return Err(RuleError::Compile(format!(
                    "modifiers are not allowed on hex string ${}",
                    ps.identifier
                )));
            }
            Matcher::Hex(parse_hex_pattern(body)?)
        }
        StringValue::Regex(src) => {
            if m.wide {
                return Err(RuleError::Compile(format!(
                    "wide is not supported on regex string ${}",
                    ps.identifier
                )));
            }
            let re = regex::bytes::RegexBuilder::new(src)
                .case_insensitive(m.nocase)
                .unicode(false)
                .build()?;
            Matcher::Regex(re)
        }
    };
    Ok(CompiledString {
        identifier: ps.identifier.clone(),
        matcher,
        fullword: m.fullword,
    })
}

// ---- parsing ----

#[derive(Debug)]
struct ParsedRule {
    name: String,
    strings: Vec<ParsedString>,
    condition: Condition,
}

#[derive(Debug)]
struct ParsedString {
    identifier: String,
    value: StringValue,
    mods: Modifiers,
}

#[derive(Debug)]
enum StringValue {
    Text(Vec<u8>),
    Hex(String),
    Regex(String),
}

#[derive(Debug, Clone, Copy, Default)]
struct Modifiers {
    nocase: bool,
    wide: bool,
    ascii: bool,
    fullword: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Any,
    All,
    Count(usize),
    Strings(Vec<String>),
}

struct Cursor<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skip whitespace and `//` / `/* */` comments.
    fn skip_ws(&mut self) {
        loop {
            while self.peek().map_or(false, |b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.starts_with("//") {
                while self.peek().map_or(false, |b| b != b'\n') {
                    self.pos += 1;
                }
            } else if self.starts_with("/*") {
                self.pos += 2;
                while !self.at_end() && !self.starts_with("*/") {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
            } else {
                return;
            }
        }
    }

    /// Whitespace only; used where a `/regex/` value may follow.
    fn skip_spaces(&mut self) {
        while self.peek().map_or(false, |b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn starts_with(&self, lit: &str) -> bool {
        self.bytes[self.pos..].starts_with(lit.as_bytes())
    }

    fn eat(&mut self, lit: &str) -> bool {
        if self.starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.starts_with(kw) {
            let after = self.bytes.get(self.pos + kw.len()).copied();
            if !after.map_or(false, is_word_byte) {
                self.pos += kw.len();
                return true;
            }
        }
        false
    }

    fn peek_ident(&self) -> Option<&'s str> {
        let start = self.pos;
        let mut end = start;
        match self.bytes.get(end) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => end += 1,
            _ => return None,
        }
        while self.bytes.get(end).map_or(false, |b| is_word_byte(*b)) {
            end += 1;
        }
        std::str::from_utf8(&self.bytes[start..end]).ok()
    }

    fn ident(&mut self) -> Option<&'s str> {
        let id = self.peek_ident()?;
        self.pos += id.len();
        Some(id)
    }

    /// Raw text up to (not including) the next `stop` byte.
    fn take_until(&mut self, stop: u8) -> Result<String, RuleError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == stop {
                let text = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error(&format!("expected '{}'", stop as char)))
    }

    fn error(&self, msg: &str) -> RuleError {
        RuleError::Compile(format!("{} at byte {}", msg, self.pos))
    }
}

fn parse_source(source: &str) -> Result<Vec<ParsedRule>, RuleError> {
    let mut cur = Cursor::new(source);
    let mut rules = Vec::new();

    loop {
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        while cur.eat_keyword("private") || cur.eat_keyword("global") {
            cur.skip_ws();
        }
        if !cur.eat_keyword("rule") {
            return Err(cur.error("expected 'rule'"));
        }
        cur.skip_ws();
        let name = cur
            .ident()
            .ok_or_else(|| cur.error("expected rule name"))?
            .to_string();
        cur.skip_ws();
        if cur.eat(":") {
            loop {
                cur.skip_ws();
                if cur.peek() == Some(b'{') {
                    break;
                }
                if cur.ident().is_none() {
                    return Err(cur.error("expected tag"));
                }
            }
        }
        cur.skip_ws();
        if !cur.eat("{") {
            return Err(cur.error("expected '{'"));
        }

        let mut strings = Vec::new();
        let mut condition = None;
        loop {
            cur.skip_ws();
            if cur.eat("}") {
                break;
            }
            if cur.eat_keyword("meta") {
                expect_colon(&mut cur)?;
                parse_meta(&mut cur)?;
            } else if cur.eat_keyword("strings") {
                expect_colon(&mut cur)?;
                strings = parse_strings(&mut cur)?;
            } else if cur.eat_keyword("condition") {
                expect_colon(&mut cur)?;
                let text = cur.take_until(b'}')?;
                condition = Some(parse_condition(&text));
            } else {
                return Err(cur.error("expected meta, strings or condition section"));
            }
        }

        let condition = condition.ok_or_else(|| cur.error("rule missing condition"))?;
        rules.push(ParsedRule {
            name,
            strings,
            condition,
        });
    }

    if rules.is_empty() {
        return Err(RuleError::Compile("no rules in source".to_string()));
    }
    Ok(rules)
}

fn expect_colon(cur: &mut Cursor) -> Result<(), RuleError> {
    cur.skip_ws();
    if cur.eat(":") {
        Ok(())
    } else {
        Err(cur.error("expected ':'"))
    }
}

fn parse_meta(cur: &mut Cursor) -> Result<(), RuleError> {
    loop {
        cur.skip_ws();
        match cur.peek_ident() {
            None => return Ok(()),
            Some("strings") | Some("condition") => return Ok(()),
            Some(_) => {}
        }
        cur.ident();
        cur.skip_ws();
        if !cur.eat("=") {
            return Err(cur.error("expected '=' after meta key"));
        }
        cur.skip_ws();
        match cur.peek() {
            Some(b'"') => {
                parse_quoted(cur)?;
            }
            Some(b) if b.is_ascii_digit() || b == b'-' => {
                cur.bump();
                while cur.peek().map_or(false, |b| b.is_ascii_digit()) {
                    cur.bump();
                }
            }
            _ => {
                if !(cur.eat_keyword("true") || cur.eat_keyword("false")) {
                    return Err(cur.error("expected meta value"));
                }
            }
        }
    }
}

fn parse_strings(cur: &mut Cursor) -> Result<Vec<ParsedString>, RuleError> {
    let mut out = Vec::new();
    loop {
        cur.skip_ws();
        if cur.peek() != Some(b'$') {
            break;
        }
        cur.bump();
        let identifier = cur.ident().unwrap_or("").to_string();
        cur.skip_ws();
        if !cur.eat("=") {
            return Err(cur.error("expected '=' in string definition"));
        }
        cur.skip_spaces();
        let value = match cur.peek() {
            Some(b'"') => StringValue::Text(parse_quoted(cur)?),
            Some(b'{') => StringValue::Hex(parse_hex_body(cur)?),
            Some(b'/') => StringValue::Regex(parse_regex_body(cur)?),
            _ => return Err(cur.error("expected string, hex or regex value")),
        };
        let mods = parse_modifiers(cur)?;
        out.push(ParsedString {
            identifier,
            value,
            mods,
        });
    }
    Ok(out)
}

fn parse_quoted(cur: &mut Cursor) -> Result<Vec<u8>, RuleError> {
    cur.bump();
    let mut out = Vec::new();
    loop {
        match cur.bump() {
            None => return Err(cur.error("unterminated string")),
            Some(b'"') => return Ok(out),
            Some(b'\\') => match cur.bump() {
                Some(b'n') => out.push(b'\n'),
                Some(b'r') => out.push(b'\r'),
                Some(b't') => out.push(b'\t'),
                Some(b'"') => out.push(b'"'),
                Some(b'\\') => out.push(b'\\'),
                Some(b'x') => {
                    let hi = cur.bump();
                    let lo = cur.bump();
                    match (hi, lo) {
                        (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {
                            let hex = [h, l];
                            let text = std::str::from_utf8(&hex).unwrap_or("00");
                            out.push(u8::from_str_radix(text, 16).unwrap_or(0));
                        }
                        _ => return Err(cur.error("invalid \\x escape")),
                    }
                }
                _ => return Err(cur.error("invalid escape sequence")),
            },
            Some(b) => out.push(b),
        }
    }
}

fn parse_hex_body(cur: &mut Cursor) -> Result<String, RuleError> {
    cur.bump();
    let body = cur.take_until(b'}')?;
    cur.bump();
    Ok(body)
}

fn parse_regex_body(cur: &mut Cursor) -> Result<String, RuleError> {
    cur.bump();
    let mut out = String::new();
    loop {
        match cur.bump() {
            None => return Err(cur.error("unterminated regex")),
            Some(b'/') => return Ok(out),
            Some(b'\\') => {
                out.push('\\');
                match cur.bump() {
                    None => return Err(cur.error("unterminated regex")),
                    Some(b) => out.push(b as char),
                }
            }
            Some(b) => out.push(b as char),
        }
    }
}

fn parse_modifiers(cur: &mut Cursor) -> Result<Modifiers, RuleError> {
    let mut mods = Modifiers::default();
    loop {
        cur.skip_ws();
        match cur.peek_ident() {
            Some("nocase") => {
                cur.ident();
                mods.nocase = true;
            }
            Some("wide") => {
                cur.ident();
                mods.wide = true;
            }
            Some("ascii") => {
                cur.ident();
                mods.ascii = true;
            }
            Some("fullword") => {
                cur.ident();
                mods.fullword = true;
            }
            Some("private") => {
                cur.ident();
            }
            Some(kw @ ("xor" | "base64" | "base64wide")) => {
                return Err(RuleError::Compile(format!(
                    "unsupported string modifier '{}'",
                    kw
                )));
            }
            _ => return Ok(mods),
        }
    }
}

fn parse_condition(text: &str) -> Condition {
    let t = text.trim();
    if t.eq_ignore_ascii_case("any of them") {
        return Condition::Any;
    }
    if t.eq_ignore_ascii_case("all of them") {
        return Condition::All;
    }
    if let Some(num) = t.to_ascii_lowercase().strip_suffix(" of them") {
        if let Ok(n) = num.trim().parse::<usize>() {
            return Condition::Count(n);
        }
    }
    if t.starts_with('$') {
        let parts: Vec<&str> = t.split(" and ").map(str::trim).collect();
        if parts
            .iter()
            .all(|p| p.starts_with('$') && p.len() > 1 && !p.contains(' '))
        {
            return Condition::Strings(parts.iter().map(|p| p[1..].to_string()).collect());
        }
    }
    // Anything richer gates nothing; the rule reports whatever matched.
    Condition::Any
}

fn parse_hex_pattern(hex: &str) -> Result<Pattern, RuleError> {
    let mut bytes = Vec::new();
    let mut mask = Vec::new();
    let mut chars = hex.chars().filter(|c| !c.is_whitespace()).peekable();

    while let Some(c) = chars.next() {
        match c {
            '?' => {
                if chars.peek() == Some(&'?') {
                    chars.next();
                }
                bytes.push(0);
                mask.push(false);
            }
            '[' => {
                let mut range = String::new();
                let mut closed = false;
                for rc in chars.by_ref() {
                    if rc == ']' {
                        closed = true;
                        break;
                    }
                    range.push(rc);
                }
                if !closed {
                    return Err(RuleError::Compile("unterminated jump in hex string".to_string()));
                }
                // Jumps collapse to their minimum length.
                let count: usize = range
                    .split('-')
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| RuleError::Compile(format!("invalid jump [{}]", range)))?;
                for _ in 0..count {
                    bytes.push(0);
                    mask.push(false);
                }
            }
            '(' => {
                // Alternatives collapse to their first branch.
                let mut first = String::new();
                let mut depth = 1;
                let mut in_first = true;
                for ac in chars.by_ref() {
                    match ac {
                        '(' => {
                            depth += 1;
                            if in_first {
                                first.push(ac);
                            }
                        }
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            if in_first {
                                first.push(ac);
                            }
                        }
                        '|' if depth == 1 => in_first = false,
                        _ => {
                            if in_first {
                                first.push(ac);
                            }
                        }
                    }
                }
                if depth != 0 {
                    return Err(RuleError::Compile("unterminated group in hex string".to_string()));
                }
                let p = parse_hex_pattern(&first)?;
                bytes.extend_from_slice(p.bytes());
                mask.extend(p.mask().iter().copied());
            }
            _ if c.is_ascii_hexdigit() => {
                let c2 = chars
                    .next()
                    .filter(|&c2| c2.is_ascii_hexdigit() || c2 == '?')
                    .ok_or_else(|| RuleError::Compile("odd hex digit count in hex string".to_string()))?;
                if c2 == '?' {
                    // Nibble wildcards widen to a full wildcard byte.
                    bytes.push(0);
                    mask.push(false);
                } else {
                    let byte = u8::from_str_radix(&format!("{}{}", c, c2), 16)
                        .map_err(|e| RuleError::Compile(e.to_string()))?;
                    bytes.push(byte);
                    mask.push(true);
                }
            }
            _ => {
                return Err(RuleError::Compile(format!(
                    "unexpected '{}' in hex string",
                    c
                )))
            }
        }
    }

    if bytes.is_empty() {
        return Err(RuleError::Compile("empty hex string".to_string()));
    }
    Ok(Pattern::new(bytes, mask))
}
