#[test]
fn document_serializes_in_declaration_order() {
    let toml = "\
zeta = 1
alpha = \"two\"
[nested]
when = 1979-05-27T07:32:00-08:00
local = 07:32:00
list = [1.5, true, { k = 'v' }]
";
    let (doc, problems) = lenient_toml::parse(toml, "serde.toml", None);
    assert!(problems.is_empty());
    insta::assert_snapshot!(
        serde_json::to_string(&doc).unwrap(),
        @r#"{"zeta":1,"alpha":"two","nested":{"when":"1979-05-27T15:32:00Z","local":"07:32:00","list":[1.5,true,{"k":"v"}]}}"#
    );
}

#[test]
fn recovered_values_serialize() {
    let (doc, problems) = lenient_toml::parse("a = 1__2\nb = hello\nc = [1 2]", "", None);
    assert_eq!(problems.len(), 2);
    insta::assert_snapshot!(
        serde_json::to_string(&doc).unwrap(),
        @r#"{"a":"1__2","b":"hello","c":[1]}"#
    );
}

#[test]
fn items_serialize_on_their_own() {
    let (doc, _) = lenient_toml::parse("[t]\nx = [[1], []]", "", None);
    let t = doc.get("t").unwrap();
    insta::assert_snapshot!(serde_json::to_string(t).unwrap(), @r#"{"x":[[1],[]]}"#);
}
