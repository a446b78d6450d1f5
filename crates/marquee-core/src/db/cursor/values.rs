use crate::{
    db::{cursor::CursorError, order::OrderSpec},
    value::Value,
};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use std::fmt;

///
/// CursorValues
///
/// Ordered `column -> last seen value` mapping carried inside a cursor.
/// Serializes as a JSON object whose key order follows the ordering it was
/// built for; decoding preserves key order and rejects duplicate keys.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CursorValues(Vec<(String, Value)>);

impl CursorValues {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find_map(|(name, value)| (name == field).then_some(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Keys must be exactly the order's columns, in the order's sequence.
    pub fn check_aligned(&self, order: &OrderSpec) -> Result<(), CursorError> {
        let aligned = self.0.len() == order.len()
            && self
                .0
                .iter()
                .zip(order.fields())
                .all(|((name, _), field)| name == field);

        if aligned {
            Ok(())
        } else {
            Err(CursorError::ValuesMismatch {
                expected: order.fields().map(str::to_string).collect(),
                found: self.fields(),
            })
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CursorValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for CursorValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CursorValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValuesVisitor;

        impl<'de> Visitor<'de> for ValuesVisitor {
            type Value = CursorValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of column values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Value)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!(
                            "duplicate cursor value for column '{name}'"
                        )));
                    }
                    entries.push((name, value));
                }

                Ok(CursorValues(entries))
            }
        }

        deserializer.deserialize_map(ValuesVisitor)
    }
}
