use crate::Span;
use crate::scanner::Scanner;
use crate::span::LineIndex;
use crate::value::{Item, Map, Value};
use std::ops::Range;
use std::sync::Arc;

#[cfg(test)]
#[path = "./document_tests.rs"]
mod tests;

/// A parsed TOML document.
///
/// The tree borrows from the source text; every [`Item`] can reach its raw
/// text through [`Item::raw`].
#[derive(Debug)]
pub struct Document<'de> {
    source: &'de str,
    identity: Arc<str>,
    root: Item<'de>,
    lines: LineIndex,
}

impl<'de> Document<'de> {
    pub(crate) fn new(source: &'de str, identity: Arc<str>, root: Item<'de>, lines: LineIndex) -> Self {
        Document {
            source,
            identity,
            root,
            lines,
        }
    }

    pub fn source(&self) -> &'de str {
        self.source
    }

    /// The name the document was parsed under, as used in diagnostics.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn root(&self) -> &Map<'de> {
        match self.root.value() {
            Value::Map(map) => map,
            _ => unreachable!("the document root is always a map"),
        }
    }

    /// The root as an [`Item`], spanning the whole source.
    pub fn root_item(&self) -> &Item<'de> {
        &self.root
    }

    pub fn into_root(self) -> Item<'de> {
        self.root
    }

    /// Looks up a dotted key such as `servers."alpha.1".ip`.
    ///
    /// Segments follow TOML key syntax, so quoted segments may contain dots.
    /// A numeric segment indexes into an array.
    pub fn get(&self, dotted: &str) -> Option<&Item<'de>> {
        let mut scanner = Scanner::new(dotted);
        scanner.skip_whitespace();
        let Ok(path) = scanner.key_path() else {
            return None;
        };
        scanner.skip_whitespace();
        if !scanner.at_eof() || !scanner.soft.is_empty() {
            return None;
        }
        path.segments
            .iter()
            .try_fold(&self.root, |item, segment| child(item, &segment.name))
    }

    /// Looks up a key given as separate, undecoded segments.
    ///
    /// ```
    /// let (doc, _) = lenient_toml::parse("[[products]]\nname = \"a\"\n[[products]]\nname = \"b\"", "", None);
    /// let name = doc.get_path(&["products", "1", "name"]).and_then(|item| item.as_str());
    /// assert_eq!(name, Some("b"));
    /// ```
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Item<'de>> {
        segments
            .iter()
            .try_fold(&self.root, |item, segment| child(item, segment.as_ref()))
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &'de str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    /// 0-based line and character column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.lines.line_col(self.source, offset)
    }

    /// Renders the source lines of `item` with its key and value underlined.
    pub fn excerpt(&self, item: &Item<'de>) -> String {
        let mut spans = Vec::with_capacity(2);
        if let Some(key) = item.key_span() {
            spans.push(key.into());
        }
        spans.push(item.span().into());
        render_excerpt(self.source, &self.lines, &spans)
    }
}

fn child<'a, 'de>(item: &'a Item<'de>, segment: &str) -> Option<&'a Item<'de>> {
    match item.value() {
        Value::Map(map) => map.get(segment),
        Value::Array(array) => array.get(segment.parse().ok()?),
        Value::Literal(_) => None,
    }
}

/// Draws each line touched by `spans` followed by an underline row.
///
/// A span that ends on its starting line is underlined with `~`; an empty
/// span, or one running onto later lines, gets a single `^` at its start.
pub(crate) fn render_excerpt(source: &str, lines: &LineIndex, spans: &[Range<u32>]) -> String {
    let mut rows: Vec<(u32, Vec<char>)> = Vec::new();
    for span in spans {
        let (line, column) = lines.line_col(source, span.start);
        let line_start = lines.line_start(line).unwrap_or(0) as usize;
        let line_end = line_start + lines.line_text(source, line).len();

        let marks = if span.end > span.start && span.end as usize <= line_end {
            let (_, end_column) = lines.line_col(source, span.end);
            (end_column - column) as usize
        } else {
            0
        };

        let index = match rows.iter().position(|(l, _)| *l == line) {
            Some(index) => index,
            None => {
                rows.push((line, Vec::new()));
                rows.len() - 1
            }
        };
        let row = &mut rows[index].1;
        let column = column as usize;
        let width = column + marks.max(1);
        if row.len() < width {
            row.resize(width, ' ');
        }
        if marks == 0 {
            row[column] = '^';
        } else {
            row[column..width].fill('~');
        }
    }

    let mut out = String::new();
    for (i, (line, row)) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(lines.line_text(source, *line));
        out.push('\n');
        let underline: String = row.iter().collect();
        out.push_str(underline.trim_end());
    }
    out
}
