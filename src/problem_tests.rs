use super::*;

fn problem(kind: ProblemKind, offset: u32, line: u32, column: u32) -> Problem {
    Problem {
        severity: Severity::Warning,
        kind,
        span: Span::point(offset),
        location: Location {
            identity: "conf/app.toml".into(),
            offset,
            line,
            column,
        },
    }
}

#[test]
fn display_has_location_prefix() {
    let p = problem(ProblemKind::DuplicateKey { key: "name".into() }, 30, 2, 7);
    assert_eq!(
        p.to_string(),
        "conf/app.toml: 2:7: Warning: Defining a key (`name`) multiple times is invalid"
    );
    assert_eq!(p.message(), "Defining a key (`name`) multiple times is invalid");
}

#[test]
fn codes_are_kebab_case() {
    let kinds = [
        ProblemKind::FileTooLarge,
        ProblemKind::ValueMissing,
        ProblemKind::MissingEquals { key: "k".into() },
        ProblemKind::UnclosedHeader { array: true },
        ProblemKind::HeaderInInlineTable { array: false },
        ProblemKind::InvalidEscape('q'),
        ProblemKind::Expected {
            expected: "a comma",
            found: "eof",
        },
    ];
    for kind in kinds {
        let code = kind.to_string();
        assert!(
            code.bytes().all(|b| b.is_ascii_lowercase() || b == b'-'),
            "{code}"
        );
        // Debug prints the code too, which keeps assertion failures short.
        assert_eq!(format!("{kind:?}"), code);
    }
}

#[test]
fn messages() {
    let cases = [
        (ProblemKind::FileTooLarge, "File is too large (maximum 4GiB)"),
        (
            ProblemKind::UnclosedHeader { array: false },
            "Missing `]` after table header",
        ),
        (
            ProblemKind::HeaderInInlineTable { array: true },
            "cannot define an array of tables in an inline table",
        ),
        (
            ProblemKind::MissingNewline { after: "a table header" },
            "There must be a newline (or EOF) after a table header",
        ),
        (ProblemKind::InvalidEscape('q'), "Invalid escape sequence `\\q`"),
        (ProblemKind::InvalidEscape('\r'), "Invalid escape sequence `\\\\r`"),
        (ProblemKind::Unexpected('\t'), "Unexpected `\\t`"),
        (
            ProblemKind::InvalidUnicodeEscape { text: "\\uD800".into() },
            "Invalid unicode escape `\\uD800`",
        ),
        (ProblemKind::NestingTooDeep, "Values nested too deeply"),
    ];
    for (kind, message) in cases {
        assert_eq!(problem(kind, 0, 0, 0).message(), message);
    }
}

#[test]
fn categories() {
    assert_eq!(ProblemKind::EmptyBareKey.category(), Category::Structural);
    assert_eq!(
        ProblemKind::DuplicateTable { name: "t".into() }.category(),
        Category::Redefinition
    );
    assert_eq!(ProblemKind::AppendToStaticArray.category(), Category::TypeConflict);
    assert_eq!(ProblemKind::ContentAfterString.category(), Category::Lexical);
}

#[test]
fn reporter_resolves_locations_and_forwards() {
    let source = "a = 1\nb\u{e9} = x y\n";
    let mut forwarded = Vec::new();
    let mut sink = |p: &Problem| forwarded.push((p.location.line, p.location.column));
    let mut reporter = Reporter::new(source, "r.toml".into(), Some(&mut sink));
    reporter.report(ProblemKind::KeyAloneOnLine, Span::point(0));
    reporter.report(ProblemKind::ValueMissing, Span::point(13));
    assert_eq!(reporter.len(), 2);

    let (lines, problems) = reporter.finish();
    assert_eq!(lines.line(13), 1);
    assert_eq!(problems[1].location.offset, 13);
    assert_eq!((problems[1].location.line, problems[1].location.column), (1, 6));
    assert_eq!(&*problems[1].location.identity, "r.toml");
    assert_eq!(forwarded, [(0, 0), (1, 6)]);
}

#[test]
fn reporter_columns_in_any_order() {
    let source = "\u{e9}\u{e9} = 1 2 3\nx";
    let mut reporter = Reporter::new(source, "o.toml".into(), None);
    for offset in [9, 5, 11, 13, 4, 99] {
        reporter.report(ProblemKind::MissingNewline { after: "a value" }, Span::point(offset));
    }
    let (_, problems) = reporter.finish();
    let found: Vec<_> = problems
        .iter()
        .map(|p| (p.location.line, p.location.column))
        .collect();
    assert_eq!(found, [(0, 7), (0, 3), (0, 9), (1, 0), (0, 2), (1, 1)]);
}

#[test]
fn excerpt_points_at_offset() {
    let p = problem(ProblemKind::ValueMissing, 10, 1, 4);
    assert_eq!(p.excerpt("key = 1\nkey = \n"), "key = \n  ^");
}
