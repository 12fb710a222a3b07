use super::*;

fn string(input: &str) -> Result<(String, Span, Vec<Fault>), ProblemKind> {
    let mut scanner = Scanner::new(input);
    match scanner.string() {
        Ok(scanned) => Ok((scanned.value.into_owned(), scanned.span, scanner.soft)),
        Err(fault) => Err(fault.kind),
    }
}

fn key_names(input: &str) -> Vec<String> {
    let mut scanner = Scanner::new(input);
    let path = scanner
        .key_path()
        .unwrap_or_else(|f| panic!("key path failed for {input:?}: {f:?}"));
    path.segments.iter().map(|k| k.name.to_string()).collect()
}

#[test]
fn basic_and_literal_strings() {
    let cases = [
        (r#""abc""#, "abc"),
        (r#""""#, ""),
        (r#"'C:\path\to'"#, r"C:\path\to"),
        (r#""a\tb""#, "a\tb"),
        (r#""say \"hi\"""#, "say \"hi\""),
        (r#""back\\slash""#, "back\\slash"),
        (r#""\u00e9t\u00e9""#, "été"),
        (r#""\U0001F600""#, "\u{1F600}"),
        (r#""\x41""#, "A"),
        (r#""\e[0m""#, "\u{1b}[0m"),
        (r#""\b\f\r\n""#, "\u{8}\u{c}\r\n"),
        ("\"caf\u{e9}\"", "caf\u{e9}"),
    ];
    for (input, expected) in cases {
        let (value, span, soft) = string(input).unwrap();
        assert_eq!(value, expected, "input: {input}");
        assert_eq!(span, Span::new(0, input.len() as u32), "input: {input}");
        assert!(soft.is_empty(), "input: {input}");
    }
}

#[test]
fn multiline_strings() {
    let cases = [
        ("\"\"\"\nline1\nline2\"\"\"", "line1\nline2"),
        ("\"\"\"\r\nline\"\"\"", "line"),
        ("\"\"\"a \\\n    b\"\"\"", "a b"),
        ("\"\"\"a \\   \r\n\n  b\"\"\"", "a b"),
        ("'''\nraw \\n\n'''", "raw \\n\n"),
        ("\"\"\"\"\"\"", ""),
        ("\"\"\"a\"\"\"\"", "a\""),
        ("\"\"\"a\"\"\"\"\"", "a\"\""),
        ("'''a''''", "a'"),
        ("\"\"\"Here are \"\"two\"\" quotes\"\"\"", "Here are \"\"two\"\" quotes"),
    ];
    for (input, expected) in cases {
        let (value, span, _) = string(input).unwrap();
        assert_eq!(value, expected, "input: {input:?}");
        assert_eq!(span.end as usize, input.len(), "input: {input:?}");
    }
}

#[test]
fn long_quote_run_keeps_at_most_two_quotes() {
    let input = "\"\"\"a\"\"\"\"\"\"";
    let mut scanner = Scanner::new(input);
    let scanned = scanner.string().unwrap();
    assert_eq!(scanned.value, "a\"\"");
    assert_eq!(scanner.cursor, input.len() - 1);
}

#[test]
fn unterminated_strings() {
    let cases = ["\"abc", "\"abc\nd\"", "'abc\n'", "\"\"\"abc", "'''abc''", "\"abc\\"];
    for input in cases {
        assert_eq!(
            string(input).map(|(v, ..)| v),
            Err(ProblemKind::UnterminatedString),
            "input: {input:?}"
        );
    }

    let mut scanner = Scanner::new("\"abc\nnext");
    assert!(scanner.string().is_err());
    assert_eq!(scanner.cursor, 4);
}

#[test]
fn invalid_escapes_are_soft() {
    let (value, _, soft) = string(r#""a\qb""#).unwrap();
    assert_eq!(value, r"a\qb");
    assert_eq!(soft, [Fault::new(ProblemKind::InvalidEscape('q'), 2)]);

    let (value, _, soft) = string(r#""x\u12""#).unwrap();
    assert_eq!(value, r"x\u12");
    assert_eq!(
        soft,
        [Fault::new(
            ProblemKind::InvalidUnicodeEscape { text: r"\u12".into() },
            2
        )]
    );

    let (value, _, soft) = string(r#""\uD800""#).unwrap();
    assert_eq!(value, r"\uD800");
    assert_eq!(soft.len(), 1);

    // A carriage return without a line feed is not a line ending.
    let (value, _, soft) = string("\"a\\\rb\"").unwrap();
    assert_eq!(value, "a\\\rb");
    assert_eq!(soft, [Fault::new(ProblemKind::InvalidEscape('\r'), 2)]);
    assert_eq!(
        string("\"a\\\r\nb\"").map(|(v, ..)| v),
        Err(ProblemKind::UnterminatedString)
    );

    // Literal strings have no escapes.
    let (value, _, soft) = string(r"'\q'").unwrap();
    assert_eq!(value, r"\q");
    assert!(soft.is_empty());
}

#[test]
fn key_paths() {
    let cases: &[(&str, &[&str])] = &[
        ("a = 1", &["a"]),
        ("a.b.c = 1", &["a", "b", "c"]),
        ("a . \"b.c\" . 'd'", &["a", "b.c", "d"]),
        ("a .b", &["a", "b"]),
        ("site.\"google.com\"", &["site", "google.com"]),
        ("3.14159 = \"pi\"", &["3", "14159"]),
        ("g]r = 1", &["g"]),
        ("\u{43a}\u{43b}\u{44e}\u{447} = 1", &["\u{43a}\u{43b}\u{44e}\u{447}"]),
        ("\"\" = 1", &[""]),
        ("a b", &["a"]),
    ];
    for (input, expected) in cases {
        assert_eq!(key_names(input), *expected, "input: {input}");
    }
}

#[test]
fn key_path_spans() {
    let mut scanner = Scanner::new("a . \"b.c\" . 'd' = 1");
    let path = scanner.key_path().unwrap();
    assert_eq!(path.span, Span::new(0, 15));
    assert_eq!(path.segments[1].span, Span::new(4, 9));
    assert_eq!(scanner.cursor, 15);

    let mut scanner = Scanner::new("a b");
    scanner.key_path().unwrap();
    assert_eq!(scanner.cursor, 1);
}

#[test]
fn key_path_faults() {
    let cases = [
        ("= 1", ProblemKind::EmptyBareKey, 0),
        ("a. = 1", ProblemKind::EmptyBareKey, 3),
        ("{a", ProblemKind::Unexpected('{'), 0),
        (",", ProblemKind::Unexpected(','), 0),
        ("\"abc", ProblemKind::UnterminatedString, 0),
    ];
    for (input, kind, at) in cases {
        let mut scanner = Scanner::new(input);
        let fault = scanner.key_path().unwrap_err();
        assert_eq!(fault, Fault::new(kind, at), "input: {input}");
    }
}

#[test]
fn multiline_string_key_is_soft() {
    let mut scanner = Scanner::new("\"\"\"key\"\"\" = 1");
    let path = scanner.key_path().unwrap();
    assert_eq!(path.segments[0].name, "key");
    assert_eq!(scanner.soft, [Fault::new(ProblemKind::MultilineStringKey, 0)]);
}

#[test]
fn trivia() {
    let mut scanner = Scanner::new("  # c\n\r\n \t x");
    scanner.skip_trivia();
    assert_eq!(scanner.peek(), Some(b'x'));

    let mut scanner = Scanner::new(" \r # c\r\nx");
    scanner.skip_line_trivia();
    assert!(scanner.at_newline());
    assert_eq!(scanner.cursor, 6);
    assert!(scanner.eat_newline());
    assert_eq!(scanner.peek(), Some(b'x'));
}

#[test]
fn bare_tokens() {
    let cases = [
        ("123abc, x", 6),
        ("1979-05-27 x", 10),
        ("true]", 4),
        ("+inf#c", 4),
        ("x=1", 1),
        ("", 0),
    ];
    for (input, end) in cases {
        assert_eq!(Scanner::new(input).bare_token_end(), end, "input: {input}");
    }
}

#[test]
fn describe_bytes() {
    assert_eq!(describe(None), "eof");
    assert_eq!(describe(Some(b',')), "a comma");
    assert_eq!(describe(Some(b'\n')), "a newline");
    assert_eq!(describe(Some(b'7')), "a number");
    assert_eq!(describe(Some(b'x')), "an identifier");
}
