#![allow(missing_docs)]

use codespan_reporting::diagnostic::{Diagnostic, Label};
use lenient_toml::{Item, Literal, Problem, Value};

pub type File<'s> = codespan_reporting::files::SimpleFile<&'static str, &'s str>;

pub fn emit_diags(
    f: &File<'_>,
    error: impl IntoIterator<Item = Diagnostic<()>>,
) -> String {
    let mut output = codespan_reporting::term::termcolor::NoColor::new(Vec::new());

    for diag in error {
        codespan_reporting::term::emit_to_write_style(
            &mut output,
            &codespan_reporting::term::Config::default(),
            f,
            &diag,
        )
        .expect("failed to emit diagnostic");
    }

    String::from_utf8(output.into_inner()).unwrap()
}

/// Parses `toml` and renders every problem found as a codespan diagnostic.
pub fn render_problems(name: &'static str, toml: &str) -> (Vec<Problem>, String) {
    let (_, problems) = lenient_toml::parse(toml, name, None);
    let file = File::new(name, toml);
    let rendered = emit_diags(&file, problems.iter().map(|p| p.to_diagnostic(())));
    (problems, rendered)
}

/// Emits a note for every item in the tree, labelled with its full key.
pub fn collect_spans(val: &Item<'_>, diags: &mut Vec<Diagnostic<()>>) {
    let code = match val.value() {
        Value::Array(arr) => {
            for v in arr {
                collect_spans(v, diags);
            }
            "array"
        }
        Value::Map(map) => {
            for (_, v) in map {
                collect_spans(v, diags);
            }
            "table"
        }
        Value::Literal(Literal::String(_)) => "string",
        Value::Literal(Literal::Integer(_)) => "integer",
        Value::Literal(Literal::Float(_)) => "float",
        Value::Literal(Literal::Boolean(_)) => "bool",
        Value::Literal(_) => "datetime",
    };

    let key = match val.full_key() {
        "" => "root",
        key => key,
    };
    diags.push(
        Diagnostic::note()
            .with_code(code)
            .with_message(key)
            .with_labels(vec![Label::primary((), val.span())]),
    );
}

/// Every item in `toml` as `(full key, code, raw text)`, depth first.
pub fn walk(toml: &str) -> Vec<(String, String, String)> {
    let (doc, _) = lenient_toml::parse(toml, "walk.toml", None);
    let mut diags = Vec::new();
    collect_spans(doc.root_item(), &mut diags);
    diags
        .into_iter()
        .map(|d| {
            let range = d.labels[0].range.clone();
            (d.message, d.code.unwrap_or_default(), toml[range].to_owned())
        })
        .collect()
}
