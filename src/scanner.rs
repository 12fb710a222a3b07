// Deliberately avoid `?` operator throughout this module, scanner results are
// matched explicitly so the caller decides where recovery resumes.
#![allow(clippy::question_mark)]

use crate::Span;
use crate::problem::ProblemKind;
use crate::value::Key;
use std::borrow::Cow;

#[cfg(test)]
#[path = "./scanner_tests.rs"]
mod tests;

/// A fault raised at a byte offset.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Fault {
    pub kind: ProblemKind,
    pub at: usize,
}

impl Fault {
    pub(crate) fn new(kind: ProblemKind, at: usize) -> Self {
        Fault { kind, at }
    }
}

/// A decoded string token.
#[derive(Debug)]
pub(crate) struct Scanned<'de> {
    pub value: Cow<'de, str>,
    /// Includes the delimiters.
    pub span: Span,
    pub multiline: bool,
}

/// A dotted key path.
#[derive(Debug)]
pub(crate) struct KeyPath<'de> {
    pub segments: Vec<Key<'de>>,
    /// From the first segment's start to the last segment's end.
    pub span: Span,
}

#[inline]
pub(crate) fn is_bare_key_byte(b: u8) -> bool {
    !matches!(
        b,
        b' ' | b'\t'
            | b'\r'
            | b'\n'
            | b'.'
            | b'='
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b','
            | b'#'
            | b'"'
            | b'\''
    )
}

#[inline]
pub(crate) fn is_value_terminator(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t'
            | b'\r'
            | b'\n'
            | b','
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b'#'
            | b'='
            | b'"'
            | b'\''
    )
}

/// Short description of the byte at a position, for `Expected` faults.
pub(crate) fn describe(byte: Option<u8>) -> &'static str {
    match byte {
        None => "eof",
        Some(b'\n') | Some(b'\r') => "a newline",
        Some(b' ') | Some(b'\t') => "whitespace",
        Some(b'#') => "a comment",
        Some(b'=') => "an equals",
        Some(b'.') => "a period",
        Some(b',') => "a comma",
        Some(b'[') => "a left bracket",
        Some(b']') => "a right bracket",
        Some(b'{') => "a left brace",
        Some(b'}') => "a right brace",
        Some(b'"') | Some(b'\'') => "a string",
        Some(b) if b.is_ascii_digit() => "a number",
        Some(_) => "an identifier",
    }
}

pub(crate) struct Scanner<'de> {
    source: &'de str,
    bytes: &'de [u8],
    pub(crate) cursor: usize,
    /// Faults that did not stop the token they were found in.
    pub(crate) soft: Vec<Fault>,
}

impl<'de> Scanner<'de> {
    pub(crate) fn new(source: &'de str) -> Self {
        Scanner {
            source,
            bytes: source.as_bytes(),
            cursor: 0,
            soft: Vec::new(),
        }
    }

    pub(crate) fn source(&self) -> &'de str {
        self.source
    }

    pub(crate) fn bytes(&self) -> &'de [u8] {
        self.bytes
    }

    /// Source text between two byte offsets that fall on ASCII delimiters.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'de str {
        self.source.get(start..end).unwrap_or("")
    }

    // -- cursor operations --------------------------------------------------

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    #[inline]
    pub(crate) fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    pub(crate) fn at_newline(&self) -> bool {
        match self.peek() {
            Some(b'\n') => true,
            Some(b'\r') => self.peek_at(1) == Some(b'\n'),
            _ => false,
        }
    }

    /// Spaces and tabs. A carriage return not followed by a line feed is
    /// treated as whitespace too.
    pub(crate) fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' => self.advance(),
                b'\r' if self.peek_at(1) != Some(b'\n') => self.advance(),
                _ => break,
            }
        }
    }

    pub(crate) fn eat_comment(&mut self) -> bool {
        if self.peek() != Some(b'#') {
            return false;
        }
        while !self.at_eof() && !self.at_newline() {
            self.advance();
        }
        true
    }

    pub(crate) fn eat_newline(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.advance();
                true
            }
            Some(b'\r') if self.peek_at(1) == Some(b'\n') => {
                self.cursor += 2;
                true
            }
            _ => false,
        }
    }

    /// Whitespace, comments and newlines.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.eat_comment() {
                continue;
            }
            if !self.eat_newline() {
                break;
            }
        }
    }

    /// Whitespace and an optional comment, stopping before the newline.
    pub(crate) fn skip_line_trivia(&mut self) {
        self.skip_whitespace();
        self.eat_comment();
    }

    // -- keys ---------------------------------------------------------------

    /// Reads `segment ( '.' segment )*` with optional whitespace around dots.
    pub(crate) fn key_path(&mut self) -> Result<KeyPath<'de>, Fault> {
        let start = self.cursor;
        let mut segments = Vec::new();
        loop {
            match self.key_segment() {
                Ok(key) => segments.push(key),
                Err(fault) => return Err(fault),
            }
            let after = self.cursor;
            self.skip_whitespace();
            if self.eat_byte(b'.') {
                self.skip_whitespace();
                continue;
            }
            self.cursor = after;
            break;
        }
        let end = segments.last().map_or(start as u32, |k: &Key<'_>| k.span.end);
        Ok(KeyPath {
            segments,
            span: Span::new(start as u32, end),
        })
    }

    fn key_segment(&mut self) -> Result<Key<'de>, Fault> {
        let start = self.cursor;
        match self.peek() {
            Some(b'"') | Some(b'\'') => {
                let scanned = match self.string() {
                    Ok(scanned) => scanned,
                    Err(fault) => return Err(fault),
                };
                if scanned.multiline {
                    self.soft
                        .push(Fault::new(ProblemKind::MultilineStringKey, start));
                }
                Ok(Key {
                    name: scanned.value,
                    span: scanned.span,
                })
            }
            Some(b) if is_bare_key_byte(b) => {
                while let Some(b) = self.peek() {
                    if !is_bare_key_byte(b) {
                        break;
                    }
                    self.advance();
                }
                Ok(Key {
                    name: Cow::Borrowed(self.slice(start, self.cursor)),
                    span: Span::from_usize(start, self.cursor),
                })
            }
            Some(b @ (b',' | b'[' | b'{' | b'}')) => {
                Err(Fault::new(ProblemKind::Unexpected(b as char), start))
            }
            _ => Err(Fault::new(ProblemKind::EmptyBareKey, start)),
        }
    }

    // -- strings ------------------------------------------------------------

    /// Reads any of the four string forms starting at the cursor, which must
    /// be on a quote.
    pub(crate) fn string(&mut self) -> Result<Scanned<'de>, Fault> {
        let start = self.cursor;
        let delim = self.bytes[start];
        if self.peek_at(1) == Some(delim) && self.peek_at(2) == Some(delim) {
            self.cursor += 3;
            self.eat_newline();
            return self.multiline_string(start, delim);
        }
        self.advance();
        self.single_line_string(start, delim)
    }

    fn single_line_string(&mut self, start: usize, delim: u8) -> Result<Scanned<'de>, Fault> {
        let content_start = self.cursor;
        let mut owned: Option<String> = None;
        let mut run_start = content_start;
        loop {
            let Some(b) = self.peek() else {
                return Err(Fault::new(ProblemKind::UnterminatedString, start));
            };
            if self.at_newline() {
                return Err(Fault::new(ProblemKind::UnterminatedString, start));
            }
            if b == delim {
                let end = self.cursor;
                self.advance();
                let value = match owned {
                    Some(mut buf) => {
                        buf.push_str(self.slice(run_start, end));
                        Cow::Owned(buf)
                    }
                    None => Cow::Borrowed(self.slice(content_start, end)),
                };
                return Ok(Scanned {
                    value,
                    span: Span::from_usize(start, self.cursor),
                    multiline: false,
                });
            }
            if b == b'\\' && delim == b'"' {
                let buf = owned.get_or_insert_with(String::new);
                buf.push_str(self.slice(run_start, self.cursor));
                self.escape(buf, false);
                run_start = self.cursor;
                continue;
            }
            self.advance();
        }
    }

    fn multiline_string(&mut self, start: usize, delim: u8) -> Result<Scanned<'de>, Fault> {
        let content_start = self.cursor;
        let mut owned: Option<String> = None;
        let mut run_start = content_start;
        loop {
            let Some(b) = self.peek() else {
                return Err(Fault::new(ProblemKind::UnterminatedString, start));
            };
            if b == delim {
                let quotes_start = self.cursor;
                let mut run = 0;
                while self.peek_at(run) == Some(delim) {
                    run += 1;
                }
                if run < 3 {
                    self.cursor += run;
                    continue;
                }
                // Up to two quotes directly before the closing three are content.
                let content_end = quotes_start + (run - 3).min(2);
                self.cursor = content_end + 3;
                let value = match owned {
                    Some(mut buf) => {
                        buf.push_str(self.slice(run_start, content_end));
                        Cow::Owned(buf)
                    }
                    None => Cow::Borrowed(self.slice(content_start, content_end)),
                };
                return Ok(Scanned {
                    value,
                    span: Span::from_usize(start, self.cursor),
                    multiline: true,
                });
            }
            if b == b'\\' && delim == b'"' {
                let buf = owned.get_or_insert_with(String::new);
                buf.push_str(self.slice(run_start, self.cursor));
                self.escape(buf, true);
                run_start = self.cursor;
                continue;
            }
            self.advance();
        }
    }

    /// Decodes the escape at the cursor (on the backslash) into `buf`.
    ///
    /// Unknown escapes, a lone carriage return included, are reported and
    /// kept verbatim. In a single-line string a backslash before the newline
    /// is left for the caller to report as unterminated.
    fn escape(&mut self, buf: &mut String, multiline: bool) {
        let esc_start = self.cursor;
        self.advance();
        let Some(b) = self.peek() else {
            return;
        };
        let decoded = match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'e' => '\u{1b}',
            b'"' => '"',
            b'\\' => '\\',
            b'u' => return self.unicode_escape(buf, esc_start, 4),
            b'U' => return self.unicode_escape(buf, esc_start, 8),
            b'x' => return self.unicode_escape(buf, esc_start, 2),
            b' ' | b'\t' | b'\r' | b'\n' if multiline => {
                self.skip_whitespace();
                if self.at_newline() {
                    while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                        self.advance();
                    }
                } else {
                    self.soft
                        .push(Fault::new(ProblemKind::InvalidEscape(b as char), esc_start));
                    buf.push_str(self.slice(esc_start, self.cursor));
                }
                return;
            }
            b'\n' => return,
            b'\r' if self.peek_at(1) == Some(b'\n') => return,
            _ => {
                let c = self.source[self.cursor..].chars().next().unwrap_or('\\');
                self.soft
                    .push(Fault::new(ProblemKind::InvalidEscape(c), esc_start));
                self.cursor += c.len_utf8();
                buf.push('\\');
                buf.push(c);
                return;
            }
        };
        self.advance();
        buf.push(decoded);
    }

    fn unicode_escape(&mut self, buf: &mut String, esc_start: usize, digits: usize) {
        self.advance();
        let mut value: u32 = 0;
        let mut read = 0;
        while read < digits {
            let Some(b) = self.peek() else { break };
            let Some(digit) = (b as char).to_digit(16) else {
                break;
            };
            value = value * 16 + digit;
            self.advance();
            read += 1;
        }
        match char::from_u32(value) {
            Some(c) if read == digits => buf.push(c),
            _ => {
                let text = self.slice(esc_start, self.cursor);
                self.soft.push(Fault::new(
                    ProblemKind::InvalidUnicodeEscape { text: text.into() },
                    esc_start,
                ));
                buf.push_str(text);
            }
        }
    }

    // -- bare values --------------------------------------------------------

    /// End of the unquoted value token starting at the cursor.
    pub(crate) fn bare_token_end(&self) -> usize {
        let mut i = self.cursor;
        while i < self.bytes.len() && !is_value_terminator(self.bytes[i]) {
            i += 1;
        }
        i
    }
}
