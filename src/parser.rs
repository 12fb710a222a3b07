// Faults are matched explicitly rather than propagated with `?`: every call
// site decides whether to report, resynchronize or carry on.
#![allow(clippy::question_mark)]

use crate::Span;
use crate::document::Document;
use crate::literal;
use crate::problem::{Problem, ProblemKind, ProblemSink, Reporter};
use crate::recovery::{Recovery, State};
use crate::resolver::{self, Target};
use crate::scanner::{Fault, KeyPath, Scanner, describe};
use crate::value::{Array, ArrayKind, Item, Literal, Map, MapOrigin, Value, element_key, path_key};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Parser state
// ---------------------------------------------------------------------------

struct Parser<'de, 's> {
    scanner: Scanner<'de>,
    reporter: Reporter<'s, 'de>,
    recovery: Recovery,
    root: Item<'de>,
    /// Table that key/value pairs are currently bound into.
    target: Target<'de>,
    /// Full key of `target`, prefixed onto every bound key.
    target_key: Box<str>,
}

impl<'de, 's> Parser<'de, 's> {
    fn new(source: &'de str, identity: Arc<str>, sink: Option<&'s mut dyn ProblemSink>) -> Self {
        Parser {
            scanner: Scanner::new(source),
            reporter: Reporter::new(source, identity, sink),
            recovery: Recovery::new(),
            root: root_item(source),
            target: Target::Path(Vec::new()),
            target_key: "".into(),
        }
    }

    // -- reporting ----------------------------------------------------------

    /// Reports faults the scanner recorded without stopping.
    fn flush_soft(&mut self) {
        for fault in self.scanner.soft.drain(..) {
            self.reporter.report(fault.kind, Span::from_usize(fault.at, fault.at));
        }
    }

    fn report(&mut self, kind: ProblemKind, at: usize) {
        self.flush_soft();
        self.reporter.report(kind, Span::from_usize(at, at));
    }

    /// Reports `fault` and moves the cursor to the recovery point for the
    /// current state.
    fn fail(&mut self, fault: Fault) {
        let from = self.scanner.cursor.max(fault.at);
        self.report(fault.kind, fault.at);
        self.scanner.cursor = self.recovery.resync(self.scanner.bytes(), from);
    }

    // -- document -----------------------------------------------------------

    fn parse_document(&mut self) {
        loop {
            self.scanner.skip_trivia();
            self.flush_soft();
            match self.scanner.peek() {
                None => break,
                Some(b'[') => self.process_table_header(),
                Some(_) => self.process_key_value(),
            }
        }
        self.flush_soft();
    }

    fn process_table_header(&mut self) {
        let header_start = self.scanner.cursor;
        self.scanner.advance();
        let array = self.scanner.eat_byte(b'[');
        self.recovery.enter(State::ReadyForHeader);

        self.scanner.skip_whitespace();
        let path = match self.scanner.key_path() {
            Ok(path) => path,
            Err(fault) => {
                // Keys under an unreadable header have nowhere to go.
                self.target = Target::Detached(root_item(self.scanner.source()));
                self.target_key = "".into();
                return self.fail(fault);
            }
        };
        let key_end = path.span.end as usize;
        self.scanner.skip_whitespace();
        let closed = self.scanner.eat_byte(b']') && (!array || self.scanner.eat_byte(b']'));
        let header = Span::from_usize(header_start, self.scanner.cursor);

        let opened = resolver::open_table(&mut self.root, &path, header, array, self.scanner.source());
        self.target = opened.target;
        self.target_key = opened.key;
        if let Some(kind) = opened.problem {
            self.report(kind, header_start);
        }

        if !closed {
            return self.fail(Fault::new(ProblemKind::UnclosedHeader { array }, key_end));
        }
        self.recovery.enter(State::ReadyForKey);
        self.expect_line_end("a table header");
    }

    fn process_key_value(&mut self) {
        self.recovery.enter(State::ReadyForKey);
        let path = match self.scanner.key_path() {
            Ok(path) => path,
            Err(fault) => return self.fail(fault),
        };

        self.recovery.enter(State::ExpectEquals);
        let key_end = path.span.end as usize;
        self.scanner.skip_whitespace();
        if !self.scanner.eat_byte(b'=') {
            self.scanner.eat_comment();
            let kind = if self.scanner.at_newline() {
                ProblemKind::KeyAloneOnLine
            } else {
                ProblemKind::MissingEquals {
                    key: self.key_text(&path).into(),
                }
            };
            return self.fail(Fault::new(kind, key_end));
        }

        self.recovery.enter(State::ExpectValue);
        self.scanner.skip_line_trivia();
        if self.scanner.at_eof() || self.scanner.at_newline() {
            let at = self.scanner.cursor;
            return self.fail(Fault::new(ProblemKind::ValueMissing, at));
        }

        let full_key = path_key(&self.target_key, &path.segments);
        let item = match self.value(full_key, Some(path.span)) {
            Ok(item) => item,
            Err(fault) => return self.fail(fault),
        };
        self.bind(&path, item);

        self.recovery.enter(State::ReadyForKey);
        self.expect_line_end("a key/value pair");
    }

    /// Only whitespace and a comment may follow a statement on its line.
    /// Parsing continues at the offending content.
    fn expect_line_end(&mut self, after: &'static str) {
        self.scanner.skip_line_trivia();
        if !self.scanner.at_eof() && !self.scanner.at_newline() {
            let at = self.scanner.cursor;
            self.report(ProblemKind::MissingNewline { after }, at);
        }
    }

    fn bind(&mut self, path: &KeyPath<'de>, item: Item<'de>) {
        let span = item.span();
        let source = self.scanner.source();
        let result = match &mut self.target {
            Target::Path(steps) => match resolver::resolve_mut(&mut self.root, steps) {
                Some(table) => resolver::insert(table, path, item, source),
                None => Ok(()),
            },
            Target::Detached(table) => resolver::insert(table, path, item, source),
        };
        match result {
            Ok(()) => {
                if let Target::Path(steps) = &self.target {
                    resolver::extend_along(&mut self.root, steps, span.end);
                }
            }
            Err(kind) => {
                let at = match kind {
                    ProblemKind::InlineTableExtension => span.start,
                    _ => span.end,
                };
                self.report(kind, at as usize);
            }
        }
    }

    fn key_text(&self, path: &KeyPath<'de>) -> &'de str {
        self.scanner
            .slice(path.span.start as usize, path.span.end as usize)
    }

    // -- values -------------------------------------------------------------

    fn value(&mut self, full_key: Box<str>, key_span: Option<Span>) -> Result<Item<'de>, Fault> {
        let start = self.scanner.cursor;
        let source = self.scanner.source();
        match self.scanner.peek() {
            Some(b'"' | b'\'') => {
                let scanned = match self.scanner.string() {
                    Ok(scanned) => scanned,
                    Err(fault) => return Err(fault),
                };
                let value = Value::Literal(Literal::String(scanned.value));
                let item = Item::new(value, full_key, key_span, scanned.span, source);
                self.string_end();
                Ok(item)
            }
            Some(b'[') => self.array(full_key, key_span),
            Some(b'{') => self.inline_table(full_key, key_span),
            next => {
                if let Some((end, literal)) = literal::temporal(self.scanner.bytes(), start) {
                    self.scanner.cursor = end;
                    let span = Span::from_usize(start, end);
                    return Ok(Item::new(Value::Literal(literal), full_key, key_span, span, source));
                }
                let end = self.scanner.bare_token_end();
                if end == start {
                    return Err(Fault::new(
                        ProblemKind::Expected {
                            expected: "a value",
                            found: describe(next),
                        },
                        start,
                    ));
                }
                self.scanner.cursor = end;
                let (literal, fault) = literal::bare(self.scanner.slice(start, end), start);
                if let Some(fault) = fault {
                    self.report(fault.kind, fault.at);
                }
                let span = Span::from_usize(start, end);
                Ok(Item::new(Value::Literal(literal), full_key, key_span, span, source))
            }
        }
    }

    /// A string must be followed by whitespace, a comment, a separator or a
    /// closing bracket. Anything else is reported and skipped.
    fn string_end(&mut self) {
        match self.scanner.peek() {
            None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'#' | b',' | b'}' | b']') => {}
            Some(_) => {
                let at = self.scanner.cursor;
                self.fail(Fault::new(ProblemKind::ContentAfterString, at));
            }
        }
    }

    fn array(&mut self, full_key: Box<str>, key_span: Option<Span>) -> Result<Item<'de>, Fault> {
        let start = self.scanner.cursor;
        if !self.recovery.open() {
            return Err(Fault::new(ProblemKind::NestingTooDeep, start));
        }
        self.scanner.advance();

        let mut array = Array::new(ArrayKind::Static);
        let mut after_value = false;
        loop {
            self.scanner.skip_trivia();
            let at = self.scanner.cursor;
            match self.scanner.peek() {
                None => {
                    self.report(expected("`]`", None), at);
                    break;
                }
                Some(b']') => {
                    self.scanner.advance();
                    break;
                }
                Some(b'}') => {
                    self.report(expected("`]`", Some(b'}')), at);
                    break;
                }
                Some(b',') => {
                    if !after_value {
                        self.report(expected("a value", Some(b',')), at);
                    }
                    self.scanner.advance();
                    after_value = false;
                }
                Some(b) if after_value => {
                    self.fail(Fault::new(expected("a comma", Some(b)), at));
                }
                Some(_) => {
                    self.recovery.enter(State::ExpectValue);
                    match self.value(element_key(&full_key, array.len()), None) {
                        Ok(item) => {
                            array.push(item);
                        }
                        Err(fault) => self.fail(fault),
                    }
                    after_value = true;
                }
            }
        }
        self.recovery.close();

        let span = Span::from_usize(start, self.scanner.cursor);
        let source = self.scanner.source();
        Ok(Item::new(Value::Array(array), full_key, key_span, span, source))
    }

    fn inline_table(&mut self, full_key: Box<str>, key_span: Option<Span>) -> Result<Item<'de>, Fault> {
        let start = self.scanner.cursor;
        if !self.recovery.open() {
            return Err(Fault::new(ProblemKind::NestingTooDeep, start));
        }
        self.scanner.advance();

        let source = self.scanner.source();
        let mut table = Item::new(
            Value::Map(Map::new(MapOrigin::Inline)),
            full_key,
            key_span,
            Span::from_usize(start, start),
            source,
        );
        let mut after_entry = false;
        loop {
            self.scanner.skip_trivia();
            let at = self.scanner.cursor;
            match self.scanner.peek() {
                None => {
                    self.report(expected("`}`", None), at);
                    break;
                }
                Some(b'}') => {
                    self.scanner.advance();
                    break;
                }
                Some(b']') => {
                    self.report(expected("`}`", Some(b']')), at);
                    break;
                }
                Some(b',') => {
                    if !after_entry {
                        self.report(expected("a key", Some(b',')), at);
                    }
                    self.scanner.advance();
                    after_entry = false;
                }
                Some(b'[') => {
                    let array = self.scanner.peek_at(1) == Some(b'[');
                    self.fail(Fault::new(ProblemKind::HeaderInInlineTable { array }, at));
                    after_entry = true;
                }
                Some(b) if after_entry => {
                    self.fail(Fault::new(expected("a comma", Some(b)), at));
                }
                Some(_) => {
                    self.inline_entry(&mut table);
                    after_entry = true;
                }
            }
        }
        self.recovery.close();

        table.extend_end(self.scanner.cursor as u32);
        if let Some(map) = table.as_map_mut() {
            map.freeze_all();
        }
        Ok(table)
    }

    fn inline_entry(&mut self, table: &mut Item<'de>) {
        self.recovery.enter(State::ReadyForKey);
        let path = match self.scanner.key_path() {
            Ok(path) => path,
            Err(fault) => return self.fail(fault),
        };

        self.recovery.enter(State::ExpectEquals);
        let key_end = path.span.end as usize;
        self.scanner.skip_whitespace();
        if !self.scanner.eat_byte(b'=') {
            let key = self.key_text(&path).into();
            return self.fail(Fault::new(ProblemKind::MissingEquals { key }, key_end));
        }

        self.recovery.enter(State::ExpectValue);
        self.scanner.skip_whitespace();
        if matches!(self.scanner.peek(), None | Some(b',' | b'}' | b'#'))
            || self.scanner.at_newline()
        {
            let at = self.scanner.cursor;
            return self.fail(Fault::new(ProblemKind::ValueMissing, at));
        }

        let full_key = path_key(table.full_key(), &path.segments);
        let item = match self.value(full_key, Some(path.span)) {
            Ok(item) => item,
            Err(fault) => return self.fail(fault),
        };
        let span = item.span();
        if let Err(kind) = resolver::insert(table, &path, item, self.scanner.source()) {
            let at = match kind {
                ProblemKind::InlineTableExtension => span.start,
                _ => span.end,
            };
            self.report(kind, at as usize);
        }
        self.recovery.enter(State::ReadyForKey);
    }
}

fn expected(what: &'static str, found: Option<u8>) -> ProblemKind {
    ProblemKind::Expected {
        expected: what,
        found: describe(found),
    }
}

fn root_item(source: &str) -> Item<'_> {
    Item::new(
        Value::Map(Map::new(MapOrigin::Root)),
        "".into(),
        None,
        Span::from_usize(0, source.len()),
        source,
    )
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parses `source` into a [`Document`], recovering from every fault.
///
/// Problems are returned in source order and, when a `sink` is given, also
/// handed to it as they are found. `identity` names the source in rendered
/// diagnostics, typically a file path.
///
/// ```
/// let (doc, problems) = lenient_toml::parse("name = \"x\"\nport = 80 80\n", "app.toml", None);
/// assert_eq!(doc.get("port").and_then(|v| v.as_integer()), Some(80));
/// assert_eq!(problems[0].to_string(), "app.toml: 1:10: Warning: There must be a newline (or EOF) after a key/value pair");
/// ```
pub fn parse<'de>(
    source: &'de str,
    identity: &str,
    sink: Option<&mut dyn ProblemSink>,
) -> (Document<'de>, Vec<Problem>) {
    let identity: Arc<str> = identity.into();

    if u32::try_from(source.len()).is_err() {
        let mut reporter = Reporter::new("", identity.clone(), sink);
        reporter.report(ProblemKind::FileTooLarge, Span::default());
        let (lines, problems) = reporter.finish();
        let root = Item::new(
            Value::Map(Map::new(MapOrigin::Root)),
            "".into(),
            None,
            Span::default(),
            source,
        );
        return (Document::new(source, identity, root, lines), problems);
    }

    let mut parser = Parser::new(source, identity.clone(), sink);
    parser.parse_document();
    let Parser { root, reporter, .. } = parser;

    tracing::debug!(
        identity = %identity,
        bytes = source.len(),
        problems = reporter.len(),
        "parsed toml document"
    );
    let (lines, problems) = reporter.finish();
    (Document::new(source, identity, root, lines), problems)
}

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;
