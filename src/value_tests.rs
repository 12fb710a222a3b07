use super::*;

fn key(name: &'static str, start: u32) -> Key<'static> {
    Key {
        name: Cow::Borrowed(name),
        span: Span::new(start, start + name.len() as u32),
    }
}

fn literal(lit: Literal<'static>, start: u32, end: u32) -> Item<'static> {
    Item::new(Value::Literal(lit), "".into(), None, Span::new(start, end), SRC)
}

const SRC: &str = "name = \"value\"\nport = 8080";

#[test]
fn integer_width() {
    assert!(!Integer::decimal(i32::MAX as i64).is_wide());
    assert!(!Integer::decimal(i32::MIN as i64).is_wide());
    assert!(Integer::decimal(i32::MAX as i64 + 1).is_wide());
    assert!(Integer::wide(1).is_wide());

    assert_eq!(Integer::decimal(-5).as_i32(), Some(-5));
    assert_eq!(Integer::decimal(1 << 40).as_i32(), None);
}

#[test]
fn literal_display_and_type() {
    let cases = [
        (Literal::String("text".into()), "text", "string"),
        (Literal::Integer(Integer::decimal(7)), "7", "integer"),
        (Literal::Integer(Integer::wide(7)), "7", "long"),
        (Literal::Float(1.0), "1.0", "float"),
        (Literal::Float(f64::NEG_INFINITY), "-inf", "float"),
        (Literal::Float(f64::NAN), "nan", "float"),
        (Literal::Boolean(false), "false", "boolean"),
    ];
    for (lit, text, type_str) in cases {
        assert_eq!(lit.to_string(), text);
        assert_eq!(lit.type_str(), type_str);
    }
}

#[test]
fn map_keeps_insertion_order() {
    let mut map = Map::new(MapOrigin::Header);
    map.push(key("zeta", 0), literal(Literal::Boolean(true), 0, 1));
    map.push(key("alpha", 10), literal(Literal::Boolean(false), 0, 1));
    map.push(key("mid", 20), literal(Literal::Boolean(true), 0, 1));

    assert_eq!(map.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    assert_eq!(map.first().map(|(k, _)| k.as_str()), Some("zeta"));
    assert_eq!(map.last().map(|(k, _)| k.as_str()), Some("mid"));
    assert_eq!(map.next_sibling("alpha").map(|(k, _)| k.as_str()), Some("mid"));
    assert!(map.next_sibling("mid").is_none());
    assert!(map.next_sibling("missing").is_none());

    let (k, v) = map.get_key_value("alpha").unwrap();
    assert_eq!(k.span, Span::new(10, 15));
    assert_eq!(v.as_bool(), Some(false));
    assert!(map.contains_key("zeta"));
    assert!(!map.contains_key("Zeta"));
}

#[test]
fn map_index_kicks_in_for_large_maps() {
    const NAMES: [&str; 12] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
    let mut map = Map::new(MapOrigin::Root);
    for (i, name) in NAMES.iter().enumerate() {
        assert_eq!(map.push(key(name, 0), literal(Literal::Integer(Integer::decimal(i as i64)), 0, 1)), i);
        for (j, seen) in NAMES[..=i].iter().enumerate() {
            assert_eq!(map.position(seen), Some(j), "after {} entries", i + 1);
        }
        assert_eq!(map.position("missing"), None);
    }
    assert!(!map.index.is_empty());
    assert_eq!(map.get("l").unwrap().as_integer(), Some(11));
}

#[test]
fn inline_maps_start_frozen() {
    assert!(Map::new(MapOrigin::Inline).is_frozen());
    assert!(!Map::new(MapOrigin::Header).is_frozen());

    let mut outer = Map::new(MapOrigin::Inline);
    let inner = Item::new(
        Value::Map(Map::new(MapOrigin::Dotted)),
        "".into(),
        None,
        Span::new(0, 0),
        SRC,
    );
    outer.push(key("inner", 0), inner);
    outer.freeze_all();
    assert!(outer.get("inner").unwrap().as_map().unwrap().is_frozen());
}

#[test]
fn item_spans_and_raw() {
    let item = Item::new(
        Value::Literal(Literal::String("value".into())),
        "name".into(),
        Some(Span::new(0, 4)),
        Span::new(7, 14),
        SRC,
    );
    assert_eq!(item.raw(), "\"value\"");
    assert_eq!(item.full_span(), Span::new(0, 14));
    assert_eq!(item.full_key(), "name");
    assert_eq!(item.type_str(), "string");
    assert_eq!(item.as_integer(), None);
    assert!(!item.is_map());

    let out_of_range = literal(Literal::Boolean(true), 100, 200);
    assert_eq!(out_of_range.raw(), "");
}

#[test]
fn item_growth() {
    let mut item = Item::new(
        Value::Map(Map::new(MapOrigin::Implicit)),
        "t".into(),
        Some(Span::new(20, 21)),
        Span::new(18, 22),
        SRC,
    );
    item.extend_end(10);
    assert_eq!(item.span(), Span::new(18, 22));
    item.extend_end(30);
    assert_eq!(item.span(), Span::new(18, 30));

    item.reopen_at(Span::new(1, 2), Span::new(0, 3));
    assert_eq!(item.key_span(), Some(Span::new(1, 2)));
    assert_eq!(item.span(), Span::new(0, 30));
}

#[test]
fn array_access() {
    let mut array = Array::new(ArrayKind::Static);
    assert!(array.is_empty());
    array.push(literal(Literal::Integer(Integer::decimal(1)), 0, 1));
    array.push(literal(Literal::Integer(Integer::decimal(2)), 2, 3));
    assert_eq!(array.len(), 2);
    assert_eq!(array.kind(), ArrayKind::Static);
    assert!(!array.is_array_of_tables());
    assert_eq!(array.first().and_then(|i| i.as_integer()), Some(1));
    assert_eq!(array.last().and_then(|i| i.as_integer()), Some(2));
    assert_eq!(
        (&array).into_iter().filter_map(|i| i.as_integer()).sum::<i64>(),
        3
    );
    array.last_mut().unwrap().extend_end(9);
    assert_eq!(array.as_slice()[1].span(), Span::new(2, 9));
}

#[test]
fn key_joining() {
    assert_eq!(&*child_key("", "a"), "a");
    assert_eq!(&*child_key("a.b", "c"), "a.b.c");
    assert_eq!(&*element_key("list", 3), "list[3]");
    assert_eq!(&*path_key("t[0]", &[key("x", 0), key("y.z", 2)]), "t[0].x.y.z");
    assert_eq!(&*path_key("", &[key("x", 0)]), "x");
}
