use crate::Span;
use crate::span::LineIndex;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

#[cfg(test)]
#[path = "./problem_tests.rs"]
mod tests;

/// How serious a [`Problem`] is.
///
/// Every fault is recoverable and the document is still produced, so the
/// parser only reports warnings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "Warning",
        })
    }
}

/// Broad family a [`ProblemKind`] belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Malformed syntax: missing `=`, unclosed headers, unterminated strings.
    Structural,
    /// A key or table defined more than once.
    Redefinition,
    /// A path used as a table after being bound to something else.
    TypeConflict,
    /// Malformed numbers, escapes and string terminators.
    Lexical,
}

/// Every fault the parser can recover from.
#[derive(Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// `=` followed by nothing but whitespace or a comment.
    ValueMissing,

    /// A key position with no key characters, e.g. `= 1`.
    EmptyBareKey,

    /// A `"""` or `'''` string used as a key.
    MultilineStringKey,

    /// A key not followed by `=`.
    MissingEquals { key: Box<str> },

    /// A key followed directly by the end of its line.
    KeyAloneOnLine,

    /// Trailing content after a key/value pair or header on the same line.
    MissingNewline { after: &'static str },

    /// EOF (or a newline for single-line forms) before the closing quote.
    UnterminatedString,

    /// Something other than whitespace, a comment or a separator directly
    /// after a closing quote.
    ContentAfterString,

    /// A table header without its closing bracket(s).
    UnclosedHeader { array: bool },

    /// The same key assigned twice in one table.
    DuplicateKey { key: Box<str> },

    /// The same table opened by two `[header]`s.
    DuplicateTable { name: Box<str> },

    /// A path used as a table after being bound to a literal or static array.
    ValueAsTable { name: Box<str> },

    /// An inline table assigned over a table that already has keys.
    InlineTableExtension,

    /// A header or dotted key that reaches into an inline table.
    ExtendInlineTable { name: Box<str> },

    /// `[[header]]` targeting an array written with `[...]`.
    AppendToStaticArray,

    /// `[[header]]` targeting a table.
    RedefineAsArray { name: Box<str> },

    /// `[header]` or `[[header]]` inside `{ ... }`.
    HeaderInInlineTable { array: bool },

    /// `.7`, `7.` or `3.e+20`.
    InvalidDecimalPoint,

    /// A number-shaped token that could not be decoded.
    InvalidNumber { text: Box<str> },

    /// An unknown escape character in a basic string.
    InvalidEscape(char),

    /// A `\u`, `\U` or `\x` escape that is not a unicode scalar value.
    InvalidUnicodeEscape { text: Box<str> },

    /// A separator or closing bracket was expected.
    Expected {
        expected: &'static str,
        found: &'static str,
    },

    /// A character that cannot start a key.
    Unexpected(char),

    /// Arrays and inline tables nested past the supported depth.
    NestingTooDeep,
}

impl ProblemKind {
    /// The taxonomy family of this kind.
    pub fn category(&self) -> Category {
        match self {
            ProblemKind::FileTooLarge
            | ProblemKind::ValueMissing
            | ProblemKind::EmptyBareKey
            | ProblemKind::MultilineStringKey
            | ProblemKind::MissingEquals { .. }
            | ProblemKind::KeyAloneOnLine
            | ProblemKind::MissingNewline { .. }
            | ProblemKind::UnterminatedString
            | ProblemKind::UnclosedHeader { .. }
            | ProblemKind::HeaderInInlineTable { .. }
            | ProblemKind::Expected { .. }
            | ProblemKind::Unexpected(_)
            | ProblemKind::NestingTooDeep => Category::Structural,
            ProblemKind::DuplicateKey { .. }
            | ProblemKind::DuplicateTable { .. }
            | ProblemKind::InlineTableExtension
            | ProblemKind::ExtendInlineTable { .. } => Category::Redefinition,
            ProblemKind::ValueAsTable { .. }
            | ProblemKind::AppendToStaticArray
            | ProblemKind::RedefineAsArray { .. } => Category::TypeConflict,
            ProblemKind::ContentAfterString
            | ProblemKind::InvalidDecimalPoint
            | ProblemKind::InvalidNumber { .. }
            | ProblemKind::InvalidEscape(_)
            | ProblemKind::InvalidUnicodeEscape { .. } => Category::Lexical,
        }
    }

    fn write_message(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::FileTooLarge => f.write_str("File is too large (maximum 4GiB)"),
            ProblemKind::ValueMissing => f.write_str("Value missing after ="),
            ProblemKind::EmptyBareKey => f.write_str("Bare key must be non-empty"),
            ProblemKind::MultilineStringKey => {
                f.write_str("Multi-line strings not allowed in keys")
            }
            ProblemKind::MissingEquals { key } => write!(f, "= missing after key `{key}`"),
            ProblemKind::KeyAloneOnLine => f.write_str("Key cannot be alone on a line"),
            ProblemKind::MissingNewline { after } => {
                write!(f, "There must be a newline (or EOF) after {after}")
            }
            ProblemKind::UnterminatedString => f.write_str("Unterminated string"),
            ProblemKind::ContentAfterString => {
                f.write_str("Unexpected content after string terminator")
            }
            ProblemKind::UnclosedHeader { array: false } => {
                f.write_str("Missing `]` after table header")
            }
            ProblemKind::UnclosedHeader { array: true } => {
                f.write_str("Missing `]]` after array of tables header")
            }
            ProblemKind::DuplicateKey { key } => {
                write!(f, "Defining a key (`{key}`) multiple times is invalid")
            }
            ProblemKind::DuplicateTable { name } => {
                write!(f, "You cannot define a table (`{name}`) more than once")
            }
            ProblemKind::ValueAsTable { name } => {
                write!(f, "Table `{name}` already specified as a value")
            }
            ProblemKind::InlineTableExtension => f.write_str(
                "Inline tables cannot be used to add keys or sub-tables to an already-defined table",
            ),
            ProblemKind::ExtendInlineTable { name } => {
                write!(f, "Table `{name}` was defined inline and cannot be extended")
            }
            ProblemKind::AppendToStaticArray => {
                f.write_str("Attempting to append to a statically defined array is not allowed")
            }
            ProblemKind::RedefineAsArray { name } => {
                write!(f, "Table `{name}` cannot be redefined as an array of tables")
            }
            ProblemKind::HeaderInInlineTable { array: false } => {
                f.write_str("cannot define a table in an inline table")
            }
            ProblemKind::HeaderInInlineTable { array: true } => {
                f.write_str("cannot define an array of tables in an inline table")
            }
            ProblemKind::InvalidDecimalPoint => f.write_str(
                "The decimal point, if used, must be surrounded by at least one digit on each side",
            ),
            ProblemKind::InvalidNumber { text } => write!(f, "Invalid number `{text}`"),
            ProblemKind::InvalidEscape(c) => {
                write!(f, "Invalid escape sequence `\\{}`", c.escape_default())
            }
            ProblemKind::InvalidUnicodeEscape { text } => {
                write!(f, "Invalid unicode escape `{text}`")
            }
            ProblemKind::Expected { expected, found } => {
                write!(f, "Expected {expected}, found {found}")
            }
            ProblemKind::Unexpected(c) => write!(f, "Unexpected `{}`", c.escape_default()),
            ProblemKind::NestingTooDeep => f.write_str("Values nested too deeply"),
        }
    }
}

impl Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FileTooLarge => "file-too-large",
            Self::ValueMissing => "value-missing",
            Self::EmptyBareKey => "empty-bare-key",
            Self::MultilineStringKey => "multiline-string-key",
            Self::MissingEquals { .. } => "missing-equals",
            Self::KeyAloneOnLine => "key-alone-on-line",
            Self::MissingNewline { .. } => "missing-newline",
            Self::UnterminatedString => "unterminated-string",
            Self::ContentAfterString => "content-after-string",
            Self::UnclosedHeader { .. } => "unclosed-header",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::ValueAsTable { .. } => "value-as-table",
            Self::InlineTableExtension => "inline-table-extension",
            Self::ExtendInlineTable { .. } => "extend-inline-table",
            Self::AppendToStaticArray => "append-to-static-array",
            Self::RedefineAsArray { .. } => "redefine-as-array",
            Self::HeaderInInlineTable { .. } => "header-in-inline-table",
            Self::InvalidDecimalPoint => "invalid-decimal-point",
            Self::InvalidNumber { .. } => "invalid-number",
            Self::InvalidEscape(_) => "invalid-escape",
            Self::InvalidUnicodeEscape { .. } => "invalid-unicode-escape",
            Self::Expected { .. } => "expected",
            Self::Unexpected(_) => "unexpected",
            Self::NestingTooDeep => "nesting-too-deep",
        };
        f.write_str(text)
    }
}

impl Debug for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Where a [`Problem`] occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Opaque source identity, typically the file path.
    pub identity: Arc<str>,
    /// Byte offset into the source.
    pub offset: u32,
    /// 0-based line.
    pub line: u32,
    /// 0-based column, in characters.
    pub column: u32,
}

/// A recoverable fault found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub kind: ProblemKind,
    /// The offending range; zero-width when the fault is a single point.
    pub span: Span,
    pub location: Location,
}

impl Problem {
    /// The human readable message, without location prefix.
    pub fn message(&self) -> String {
        struct Message<'a>(&'a ProblemKind);
        impl Display for Message<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write_message(f)
            }
        }
        Message(&self.kind).to_string()
    }

    /// Renders the offending line of `source` with a `^` under the fault.
    pub fn excerpt(&self, source: &str) -> String {
        let lines = LineIndex::new(source);
        crate::document::render_excerpt(source, &lines, &[self.span.start..self.span.start])
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = &self.location;
        write!(
            f,
            "{}: {}:{}: {}: ",
            loc.identity, loc.line, loc.column, self.severity
        )?;
        self.kind.write_message(f)
    }
}

impl std::error::Error for Problem {}

#[cfg(feature = "reporting")]
impl Problem {
    /// Converts into a [`codespan_reporting`] diagnostic for `file_id`.
    pub fn to_diagnostic<FileId: Copy + PartialEq>(
        &self,
        fid: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let diag = match self.severity {
            Severity::Warning => Diagnostic::warning(),
        };
        let label = match &self.kind {
            ProblemKind::DuplicateKey { .. } | ProblemKind::DuplicateTable { .. } => {
                Label::primary(fid, self.span).with_message("redefined here")
            }
            ProblemKind::UnterminatedString => {
                Label::primary(fid, self.span).with_message("string starts here")
            }
            _ => Label::primary(fid, self.span),
        };
        diag.with_code(self.kind.to_string())
            .with_message(self.message())
            .with_labels(vec![label])
    }
}

/// Receives problems synchronously as the parser finds them.
///
/// Implemented for any `FnMut(&Problem)` closure.
pub trait ProblemSink {
    fn report(&mut self, problem: &Problem);
}

impl<F> ProblemSink for F
where
    F: FnMut(&Problem),
{
    fn report(&mut self, problem: &Problem) {
        self(problem)
    }
}

/// Accumulates problems in order and forwards each to the optional sink.
pub(crate) struct Reporter<'s, 'src> {
    identity: Arc<str>,
    source: &'src str,
    lines: LineIndex,
    problems: Vec<Problem>,
    sink: Option<&'s mut dyn ProblemSink>,
    /// `(line, offset, column)` of the previous problem.
    last: (u32, u32, u32),
}

impl<'s, 'src> Reporter<'s, 'src> {
    pub(crate) fn new(
        source: &'src str,
        identity: Arc<str>,
        sink: Option<&'s mut dyn ProblemSink>,
    ) -> Self {
        Self {
            identity,
            source,
            lines: LineIndex::new(source),
            problems: Vec::new(),
            sink,
            last: (0, 0, 0),
        }
    }

    /// Line and column of `offset`. Problems mostly arrive in source order,
    /// so a later offset on the previous problem's line is counted forward
    /// from it instead of from the line start.
    fn locate(&mut self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);
        let line = self.lines.line(offset);
        let (last_line, last_offset, last_column) = self.last;
        let forward = if line == last_line && offset >= last_offset {
            self.source.get(last_offset as usize..offset as usize)
        } else {
            None
        };
        let column = match forward {
            Some(text) => last_column + text.chars().count() as u32,
            None => self.lines.line_col(self.source, offset).1,
        };
        self.last = (line, offset, column);
        (line, column)
    }

    pub(crate) fn report(&mut self, kind: ProblemKind, span: Span) {
        let (line, column) = self.locate(span.start);
        tracing::debug!(code = %kind, offset = span.start, line, column, "toml problem");
        let problem = Problem {
            severity: Severity::Warning,
            kind,
            span,
            location: Location {
                identity: self.identity.clone(),
                offset: span.start,
                line,
                column,
            },
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&problem);
        }
        self.problems.push(problem);
    }

    pub(crate) fn len(&self) -> usize {
        self.problems.len()
    }

    pub(crate) fn finish(self) -> (LineIndex, Vec<Problem>) {
        (self.lines, self.problems)
    }
}
