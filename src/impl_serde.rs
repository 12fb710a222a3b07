//! [`serde::Serialize`] support for the document tree.
//!
//! Tables serialize as maps in declaration order, date-times as their
//! RFC 3339 text.

use crate::document::Document;
use crate::value::{Array, Item, Literal, Map, Value};
use serde::ser::{SerializeMap, SerializeSeq};

impl serde::Serialize for Item<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.value() {
            Value::Map(map) => map.serialize(ser),
            Value::Array(array) => array.serialize(ser),
            Value::Literal(literal) => literal.serialize(ser),
        }
    }
}

impl serde::Serialize for Map<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(&*k.name, v)?;
        }
        map.end()
    }
}

impl serde::Serialize for Array<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = ser.serialize_seq(Some(self.len()))?;
        for ele in self {
            seq.serialize_element(ele)?;
        }
        seq.end()
    }
}

impl serde::Serialize for Literal<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Literal::String(s) => ser.serialize_str(s),
            Literal::Integer(i) => ser.serialize_i64(i.value()),
            Literal::Float(f) => ser.serialize_f64(*f),
            Literal::Boolean(b) => ser.serialize_bool(*b),
            Literal::Instant(_)
            | Literal::LocalDate(_)
            | Literal::LocalDateTime(_)
            | Literal::LocalTime(_) => ser.collect_str(self),
        }
    }
}

impl serde::Serialize for Document<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.root().serialize(ser)
    }
}
