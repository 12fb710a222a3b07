//! The document tree: [`Item`] nodes holding a [`Value`], which is a
//! [`Map`], an [`Array`] or a [`Literal`].

use crate::Span;
use crate::time::{Date, DateTime, Instant, Time};
use std::borrow::Cow;
use std::fmt;

#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;

/// Maps with at least this many entries keep a hash index for lookups.
const INDEXED_MAP_THRESHOLD: usize = 8;

/// A single key segment and where it was written.
#[derive(Clone, Debug)]
pub struct Key<'de> {
    /// The decoded segment, without quotes.
    pub name: Cow<'de, str>,
    /// Span of the segment as written, including quotes.
    pub span: Span,
}

impl<'de> Key<'de> {
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Key<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An integer literal and the width it needs.
///
/// Decimal literals that fit in 32 bits are narrow; larger decimals and every
/// `0x`/`0o`/`0b` literal are wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Integer {
    value: i64,
    wide: bool,
}

impl Integer {
    pub(crate) fn decimal(value: i64) -> Integer {
        Integer {
            value,
            wide: i32::try_from(value).is_err(),
        }
    }

    pub(crate) fn wide(value: i64) -> Integer {
        Integer { value, wide: true }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// `true` for the 64-bit kind.
    pub fn is_wide(&self) -> bool {
        self.wide
    }

    /// The value as the 32-bit kind, if that is how it was classified.
    pub fn as_i32(&self) -> Option<i32> {
        if self.wide { None } else { Some(self.value as i32) }
    }
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal<'de> {
    String(Cow<'de, str>),
    Integer(Integer),
    Float(f64),
    Boolean(bool),
    Instant(Instant),
    LocalDate(Date),
    LocalDateTime(DateTime),
    LocalTime(Time),
}

impl Literal<'_> {
    pub fn type_str(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(i) if i.is_wide() => "long",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Boolean(_) => "boolean",
            Literal::Instant(_) => "instant",
            Literal::LocalDate(_) => "local date",
            Literal::LocalDateTime(_) => "local date-time",
            Literal::LocalTime(_) => "local time",
        }
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Integer(i) => write!(f, "{}", i.value()),
            Literal::Float(v) if v.is_nan() => f.write_str("nan"),
            Literal::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "inf" } else { "-inf" })
            }
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Instant(v) => v.fmt(f),
            Literal::LocalDate(v) => v.fmt(f),
            Literal::LocalDateTime(v) => v.fmt(f),
            Literal::LocalTime(v) => v.fmt(f),
        }
    }
}

/// How a [`Map`] came into existence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapOrigin {
    /// The document root.
    Root,
    /// An intermediate segment of a `[header]` path.
    Implicit,
    /// An intermediate segment of a dotted key.
    Dotted,
    /// Opened by a `[header]` or `[[header]]`.
    Header,
    /// Written as `{ ... }`.
    Inline,
}

/// An ordered table.
#[derive(Clone)]
pub struct Map<'de> {
    entries: Vec<(Key<'de>, Item<'de>)>,
    index: foldhash::HashMap<Cow<'de, str>, usize>,
    origin: MapOrigin,
    frozen: bool,
}

impl<'de> Map<'de> {
    pub(crate) fn new(origin: MapOrigin) -> Self {
        Map {
            entries: Vec::new(),
            index: Default::default(),
            origin,
            frozen: origin == MapOrigin::Inline,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn origin(&self) -> MapOrigin {
        self.origin
    }

    /// `true` for inline tables and for array-of-tables entries once a later
    /// entry has been appended.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        if self.index.is_empty() {
            self.entries.iter().position(|(k, _)| k.name == name)
        } else {
            self.index.get(name).copied()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Item<'de>> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn get_key_value(&self, name: &str) -> Option<(&Key<'de>, &Item<'de>)> {
        self.position(name).map(|i| {
            let (k, v) = &self.entries[i];
            (k, v)
        })
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Key<'de>, &Item<'de>)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| &*k.name)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Item<'de>> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&Key<'de>, &Item<'de>)> {
        self.entries.first().map(|(k, v)| (k, v))
    }

    pub fn last(&self) -> Option<(&Key<'de>, &Item<'de>)> {
        self.entries.last().map(|(k, v)| (k, v))
    }

    /// The entry declared right after `name`.
    pub fn next_sibling(&self, name: &str) -> Option<(&Key<'de>, &Item<'de>)> {
        let next = self.position(name)? + 1;
        self.entries.get(next).map(|(k, v)| (k, v))
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut Item<'de>> {
        self.entries.get_mut(index).map(|(_, v)| v)
    }

    /// Appends an entry. Callers check for an existing key first.
    pub(crate) fn push(&mut self, key: Key<'de>, item: Item<'de>) -> usize {
        let index = self.entries.len();
        if !self.index.is_empty() {
            self.index.insert(key.name.clone(), index);
        } else if index + 1 >= INDEXED_MAP_THRESHOLD {
            for (i, (k, _)) in self.entries.iter().enumerate() {
                self.index.insert(k.name.clone(), i);
            }
            self.index.insert(key.name.clone(), index);
        }
        self.entries.push((key, item));
        index
    }

    pub(crate) fn set_origin(&mut self, origin: MapOrigin) {
        self.origin = origin;
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Freezes this map and the dotted tables nested in it.
    pub(crate) fn freeze_all(&mut self) {
        self.frozen = true;
        for (_, item) in &mut self.entries {
            if let Value::Map(map) = &mut item.value {
                map.freeze_all();
            }
        }
    }
}

impl fmt::Debug for Map<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (&k.name, v)))
            .finish()
    }
}

impl<'a, 'de> IntoIterator for &'a Map<'de> {
    type Item = (&'a Key<'de>, &'a Item<'de>);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (Key<'de>, Item<'de>)>,
        fn(&'a (Key<'de>, Item<'de>)) -> (&'a Key<'de>, &'a Item<'de>),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(
            split_entry as fn(&'a (Key<'de>, Item<'de>)) -> (&'a Key<'de>, &'a Item<'de>),
        )
    }
}

fn split_entry<'a, 'de>(entry: &'a (Key<'de>, Item<'de>)) -> (&'a Key<'de>, &'a Item<'de>) {
    (&entry.0, &entry.1)
}

/// Whether an [`Array`] was written as a literal or built from headers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// `[1, 2, 3]`; cannot be appended to by `[[header]]`.
    Static,
    /// Built by repeated `[[header]]`s.
    Tables,
}

#[derive(Clone)]
pub struct Array<'de> {
    items: Vec<Item<'de>>,
    kind: ArrayKind,
}

impl<'de> Array<'de> {
    pub(crate) fn new(kind: ArrayKind) -> Self {
        Array {
            items: Vec::new(),
            kind,
        }
    }

    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    pub fn is_array_of_tables(&self) -> bool {
        self.kind == ArrayKind::Tables
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item<'de>> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&Item<'de>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Item<'de>> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item<'de>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Item<'de>] {
        &self.items
    }

    pub(crate) fn push(&mut self, item: Item<'de>) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut Item<'de>> {
        self.items.get_mut(index)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Item<'de>> {
        self.items.last_mut()
    }
}

impl fmt::Debug for Array<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<'a, 'de> IntoIterator for &'a Array<'de> {
    type Item = &'a Item<'de>;
    type IntoIter = std::slice::Iter<'a, Item<'de>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The payload of an [`Item`].
#[derive(Clone, Debug)]
pub enum Value<'de> {
    Map(Map<'de>),
    Array(Array<'de>),
    Literal(Literal<'de>),
}

/// A node of the document tree with its source positions.
///
/// Items borrow the source text they were parsed from, which is how they
/// reach their raw text without owning the document.
#[derive(Clone)]
pub struct Item<'de> {
    value: Value<'de>,
    full_key: Box<str>,
    key_span: Option<Span>,
    span: Span,
    source: &'de str,
}

impl<'de> Item<'de> {
    pub(crate) fn new(
        value: Value<'de>,
        full_key: Box<str>,
        key_span: Option<Span>,
        span: Span,
        source: &'de str,
    ) -> Self {
        Item {
            value,
            full_key,
            key_span,
            span,
            source,
        }
    }

    pub fn value(&self) -> &Value<'de> {
        &self.value
    }

    pub fn into_value(self) -> Value<'de> {
        self.value
    }

    /// Segments from the root joined by `.`, with `[i]` for array elements.
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    /// Span of the key path as written. `None` for the root and for elements
    /// of static arrays; array-of-tables entries carry their header's path.
    pub fn key_span(&self) -> Option<Span> {
        self.key_span
    }

    /// Span of the value text.
    pub fn span(&self) -> Span {
        self.span
    }

    /// From the start of the key (or the value, when there is no key) to the
    /// end of the value.
    pub fn full_span(&self) -> Span {
        match self.key_span {
            Some(key) => key.cover(self.span),
            None => self.span,
        }
    }

    /// The value exactly as written in the source.
    pub fn raw(&self) -> &'de str {
        self.source
            .get(self.span.start as usize..self.span.end as usize)
            .unwrap_or("")
    }

    pub fn type_str(&self) -> &'static str {
        match &self.value {
            Value::Map(_) => "table",
            Value::Array(_) => "array",
            Value::Literal(lit) => lit.type_str(),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal<'de>> {
        match &self.value {
            Value::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match &self.value {
            Value::Literal(Literal::Integer(i)) => Some(i.value()),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &self.value {
            Value::Literal(Literal::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Value::Literal(Literal::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map<'de>> {
        match &self.value {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<'de>> {
        match &self.value {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.value, Value::Map(_))
    }

    /// Child of a map item by key.
    pub fn get(&self, name: &str) -> Option<&Item<'de>> {
        self.as_map()?.get(name)
    }

    /// Element of an array item by position.
    pub fn get_index(&self, index: usize) -> Option<&Item<'de>> {
        self.as_array()?.get(index)
    }

    pub(crate) fn as_map_mut(&mut self) -> Option<&mut Map<'de>> {
        match &mut self.value {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn as_array_mut(&mut self) -> Option<&mut Array<'de>> {
        match &mut self.value {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub(crate) fn extend_end(&mut self, end: u32) {
        if end > self.span.end {
            self.span.end = end;
        }
    }

    pub(crate) fn reopen_at(&mut self, key_span: Span, span: Span) {
        self.key_span = Some(key_span);
        self.span = span.cover(Span::new(span.start, self.span.end));
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Map(map) => map.fmt(f),
            Value::Array(array) => array.fmt(f),
            Value::Literal(Literal::String(s)) => write!(f, "{s:?}"),
            Value::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// Joins a child key segment onto a parent's full key.
pub(crate) fn child_key(parent: &str, segment: &str) -> Box<str> {
    if parent.is_empty() {
        segment.into()
    } else {
        format!("{parent}.{segment}").into()
    }
}

/// Joins every segment of a key path onto a parent's full key.
pub(crate) fn path_key(parent: &str, segments: &[Key<'_>]) -> Box<str> {
    let mut key = String::from(parent);
    for segment in segments {
        if !key.is_empty() {
            key.push('.');
        }
        key.push_str(&segment.name);
    }
    key.into()
}

/// Full key of the `index`th element of an array at `parent`.
pub(crate) fn element_key(parent: &str, index: usize) -> Box<str> {
    format!("{parent}[{index}]").into()
}
