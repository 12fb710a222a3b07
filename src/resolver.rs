//! Binding of key paths and table headers into the document tree.
//!
//! The open table is addressed by a list of [`Step`]s from the root rather
//! than by reference, so the tree can keep growing underneath it. Entry and
//! element indices are stable because nothing is ever removed.

use crate::Span;
use crate::problem::ProblemKind;
use crate::scanner::KeyPath;
use crate::value::{Array, ArrayKind, Item, Map, MapOrigin, Value, child_key, element_key, path_key};

#[cfg(test)]
#[path = "./resolver_tests.rs"]
mod tests;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Entry at this position in a map.
    Entry(usize),
    /// Element at this position in an array.
    Element(usize),
}

/// Where key/value pairs are currently bound.
pub(crate) enum Target<'de> {
    Path(Vec<Step>),
    /// A rejected header's table. Its keys are parsed and checked, then
    /// discarded.
    Detached(Item<'de>),
}

/// Result of opening a header.
pub(crate) struct Opened<'de> {
    pub target: Target<'de>,
    /// Full key of the opened table.
    pub key: Box<str>,
    pub problem: Option<ProblemKind>,
}

impl<'de> Opened<'de> {
    fn path(steps: Vec<Step>, key: Box<str>) -> Self {
        Opened {
            target: Target::Path(steps),
            key,
            problem: None,
        }
    }

    fn detached(
        problem: ProblemKind,
        key: Box<str>,
        path: &KeyPath<'de>,
        header: Span,
        source: &'de str,
    ) -> Self {
        let table = Item::new(
            Value::Map(Map::new(MapOrigin::Header)),
            key.clone(),
            Some(path.span),
            header,
            source,
        );
        Opened {
            target: Target::Detached(table),
            key,
            problem: Some(problem),
        }
    }
}

pub(crate) fn resolve_mut<'a, 'de>(
    root: &'a mut Item<'de>,
    steps: &[Step],
) -> Option<&'a mut Item<'de>> {
    let mut item = root;
    for step in steps {
        item = match *step {
            Step::Entry(i) => item.as_map_mut()?.item_mut(i)?,
            Step::Element(i) => item.as_array_mut()?.item_mut(i)?,
        };
    }
    Some(item)
}

/// Extends the span of every table and array along `steps` to `end`.
pub(crate) fn extend_along(root: &mut Item<'_>, steps: &[Step], end: u32) {
    let mut item = root;
    for step in steps {
        let next = match *step {
            Step::Entry(i) => item.as_map_mut().and_then(|map| map.item_mut(i)),
            Step::Element(i) => item.as_array_mut().and_then(|array| array.item_mut(i)),
        };
        let Some(next) = next else {
            return;
        };
        next.extend_end(end);
        item = next;
    }
}

/// Opens the table named by a `[header]` (or appends to the array named by a
/// `[[header]]`) and returns where its keys go.
pub(crate) fn open_table<'de>(
    root: &mut Item<'de>,
    path: &KeyPath<'de>,
    header: Span,
    array: bool,
    source: &'de str,
) -> Opened<'de> {
    let Some((last, parents)) = path.segments.split_last() else {
        return Opened::detached(ProblemKind::EmptyBareKey, "".into(), path, header, source);
    };
    let mut steps = Vec::with_capacity(path.segments.len() + 1);
    let mut item = root;

    for (depth, segment) in parents.iter().enumerate() {
        let key = child_key(item.full_key(), &segment.name);
        let name = path_key("", &path.segments[..=depth]);
        let Some(map) = item.as_map_mut() else {
            return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
        };
        let index = match map.position(&segment.name) {
            Some(index) => index,
            None => map.push(
                segment.clone(),
                Item::new(
                    Value::Map(Map::new(MapOrigin::Implicit)),
                    key.clone(),
                    Some(segment.span),
                    header,
                    source,
                ),
            ),
        };
        let Some(child) = map.item_mut(index) else {
            return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
        };
        steps.push(Step::Entry(index));

        if let Some(table) = child.as_map() {
            if table.is_frozen() {
                return Opened::detached(ProblemKind::ExtendInlineTable { name }, key, path, header, source);
            }
            item = child;
            continue;
        }
        let last_element = match child.as_array() {
            Some(array) if array.is_array_of_tables() && !array.is_empty() => array.len() - 1,
            _ => {
                return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
            }
        };
        steps.push(Step::Element(last_element));
        match child.as_array_mut().and_then(Array::last_mut) {
            Some(element) => item = element,
            None => {
                return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
            }
        }
    }

    let key = child_key(item.full_key(), &last.name);
    let name = path_key("", &path.segments);
    let Some(map) = item.as_map_mut() else {
        return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
    };

    let Some(index) = map.position(&last.name) else {
        let value = if array {
            let mut tables = Array::new(ArrayKind::Tables);
            tables.push(Item::new(
                Value::Map(Map::new(MapOrigin::Header)),
                element_key(&key, 0),
                Some(path.span),
                header,
                source,
            ));
            Value::Array(tables)
        } else {
            Value::Map(Map::new(MapOrigin::Header))
        };
        let index = map.push(
            last.clone(),
            Item::new(value, key.clone(), Some(path.span), header, source),
        );
        steps.push(Step::Entry(index));
        if array {
            steps.push(Step::Element(0));
            return Opened::path(steps, element_key(&key, 0));
        }
        return Opened::path(steps, key);
    };

    let Some(existing) = map.item_mut(index) else {
        return Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source);
    };
    steps.push(Step::Entry(index));

    if array {
        return append_table(existing, steps, key, name, path, header, source);
    }

    let is_array = existing.as_array().is_some();
    match existing.as_map_mut() {
        Some(table) if table.is_frozen() => {
            Opened::detached(ProblemKind::ExtendInlineTable { name }, key, path, header, source)
        }
        Some(table) if matches!(table.origin(), MapOrigin::Header | MapOrigin::Root) => {
            let mut opened = Opened::path(steps, key);
            opened.problem = Some(ProblemKind::DuplicateTable { name });
            opened
        }
        Some(table) => {
            table.set_origin(MapOrigin::Header);
            existing.reopen_at(path.span, header);
            Opened::path(steps, key)
        }
        None if is_array => {
            Opened::detached(ProblemKind::DuplicateTable { name }, key, path, header, source)
        }
        None => Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source),
    }
}

/// `name` is the header path as written, used in problem messages.
fn append_table<'de>(
    existing: &mut Item<'de>,
    mut steps: Vec<Step>,
    key: Box<str>,
    name: Box<str>,
    path: &KeyPath<'de>,
    header: Span,
    source: &'de str,
) -> Opened<'de> {
    let next = existing.as_array().map_or(0, Array::len);
    let element = element_key(&key, next);
    let is_map = existing.is_map();
    match existing.as_array_mut() {
        Some(tables) if tables.is_array_of_tables() => {
            if let Some(previous) = tables.last_mut().and_then(Item::as_map_mut) {
                previous.freeze();
            }
            let index = tables.push(Item::new(
                Value::Map(Map::new(MapOrigin::Header)),
                element.clone(),
                Some(path.span),
                header,
                source,
            ));
            existing.extend_end(header.end);
            steps.push(Step::Element(index));
            Opened::path(steps, element)
        }
        Some(_) => Opened::detached(ProblemKind::AppendToStaticArray, element, path, header, source),
        None if is_map => {
            Opened::detached(ProblemKind::RedefineAsArray { name }, key, path, header, source)
        }
        None => Opened::detached(ProblemKind::ValueAsTable { name }, key, path, header, source),
    }
}

/// Binds `item` at `path` relative to `table`, creating dotted intermediate
/// tables as needed.
///
/// The first definition of a key wins; a conflicting one is returned as the
/// problem to report and `item` is dropped.
pub(crate) fn insert<'de>(
    table: &mut Item<'de>,
    path: &KeyPath<'de>,
    item: Item<'de>,
    source: &'de str,
) -> Result<(), ProblemKind> {
    let Some((last, parents)) = path.segments.split_last() else {
        return Err(ProblemKind::EmptyBareKey);
    };
    let end = item.span().end;
    let mut current = table;

    for segment in parents {
        let key = child_key(current.full_key(), &segment.name);
        let Some(map) = current.as_map_mut() else {
            return Err(ProblemKind::ValueAsTable { name: key });
        };
        let index = match map.position(&segment.name) {
            Some(index) => index,
            None => map.push(
                segment.clone(),
                Item::new(
                    Value::Map(Map::new(MapOrigin::Dotted)),
                    key.clone(),
                    Some(segment.span),
                    segment.span,
                    source,
                ),
            ),
        };
        let Some(child) = map.item_mut(index) else {
            return Err(ProblemKind::ValueAsTable { name: key });
        };
        if let Some(nested) = child.as_map() {
            if nested.is_frozen() {
                return Err(ProblemKind::ExtendInlineTable { name: key });
            }
            child.extend_end(end);
            current = child;
            continue;
        }
        match child.as_array_mut() {
            Some(tables) if tables.is_array_of_tables() => match tables.last_mut() {
                Some(element) if element.is_map() => {
                    element.extend_end(end);
                    current = element;
                }
                _ => return Err(ProblemKind::ValueAsTable { name: key }),
            },
            _ => return Err(ProblemKind::ValueAsTable { name: key }),
        }
    }

    let Some(map) = current.as_map_mut() else {
        return Err(ProblemKind::ValueAsTable {
            name: current.full_key().into(),
        });
    };
    if let Some(existing) = map.get(&last.name) {
        if existing.is_map() && item.is_map() {
            return Err(ProblemKind::InlineTableExtension);
        }
        return Err(ProblemKind::DuplicateKey {
            key: last.name.as_ref().into(),
        });
    }
    map.push(last.clone(), item);
    Ok(())
}
