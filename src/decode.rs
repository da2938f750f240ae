//! String-tolerant decoding of request values.
//!
//! Query strings, headers, cookies and path segments only carry text, so the
//! deserializers here parse numbers, booleans and enum variants out of
//! strings on demand. One source key may carry several values: scalars take
//! the first one, sequences take all of them.
//!
//! [`Decode`] bundles the decoders of one concrete type as plain function
//! pointers. `#[derive(Bind)]` builds one per tagged field, so name parsers
//! can decode into the field's type without knowing it statically.

use std::fmt;
use std::str::FromStr;

use serde::de::value::StrDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess,
    SeqAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use crate::value::BoxedValue;

/// Decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    message: String,
    missing: bool,
}

impl DecodeError {
    /// The source holds no value at all.
    pub fn missing() -> Self {
        Self {
            message: "no value".to_string(),
            missing: true,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DecodeError {}

impl de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            message: msg.to_string(),
            missing: false,
        }
    }
}

/// Decode a single textual value.
pub fn from_str<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    T::deserialize(Text(raw))
}

/// Decode all values of one source key.
pub fn from_values<T: DeserializeOwned>(values: &[&str]) -> Result<T, DecodeError> {
    T::deserialize(Values(values))
}

/// Decode every key/value pair of a source into a struct or map.
pub fn from_pairs<T: DeserializeOwned>(pairs: &[(String, String)]) -> Result<T, DecodeError> {
    T::deserialize(Pairs(pairs))
}

/// Per-type decoders, resolved once per field.
#[derive(Clone, Copy)]
pub struct Decode {
    type_name: &'static str,
    values: fn(&[&str]) -> Result<BoxedValue, DecodeError>,
    pairs: fn(&[(String, String)]) -> Result<BoxedValue, DecodeError>,
    json: fn(&[u8]) -> Result<BoxedValue, DecodeError>,
    json_value: fn(serde_json::Value) -> Result<BoxedValue, DecodeError>,
}

impl Decode {
    pub fn of<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            values: boxed_values::<T>,
            pairs: boxed_pairs::<T>,
            json: boxed_json::<T>,
            json_value: boxed_json_value::<T>,
        }
    }

    /// Name of the target type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn values(&self, values: &[&str]) -> Result<BoxedValue, DecodeError> {
        (self.values)(values)
    }

    pub fn pairs(&self, pairs: &[(String, String)]) -> Result<BoxedValue, DecodeError> {
        (self.pairs)(pairs)
    }

    pub fn json(&self, bytes: &[u8]) -> Result<BoxedValue, DecodeError> {
        (self.json)(bytes)
    }

    pub fn json_value(&self, value: serde_json::Value) -> Result<BoxedValue, DecodeError> {
        (self.json_value)(value)
    }
}

impl fmt::Debug for Decode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Decode").field(&self.type_name).finish()
    }
}

fn boxed_values<T: DeserializeOwned + Send + 'static>(
    values: &[&str],
) -> Result<BoxedValue, DecodeError> {
    from_values::<T>(values).map(|v| Box::new(v) as BoxedValue)
}

fn boxed_pairs<T: DeserializeOwned + Send + 'static>(
    pairs: &[(String, String)],
) -> Result<BoxedValue, DecodeError> {
    from_pairs::<T>(pairs).map(|v| Box::new(v) as BoxedValue)
}

fn boxed_json<T: DeserializeOwned + Send + 'static>(
    bytes: &[u8],
) -> Result<BoxedValue, DecodeError> {
    serde_json::from_slice::<T>(bytes)
        .map(|v| Box::new(v) as BoxedValue)
        .map_err(de::Error::custom)
}

fn boxed_json_value<T: DeserializeOwned + Send + 'static>(
    value: serde_json::Value,
) -> Result<BoxedValue, DecodeError> {
    serde_json::from_value::<T>(value)
        .map(|v| Box::new(v) as BoxedValue)
        .map_err(de::Error::custom)
}

fn parse<T>(raw: &str) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| de::Error::custom(format_args!("`{}`: {}", raw, e)))
}

fn parse_bool(raw: &str) -> Result<bool, DecodeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(de::Error::custom(format_args!("`{}` is not a boolean", raw))),
    }
}

macro_rules! parse_text {
    ($($method:ident => $visit:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                visitor.$visit(parse(self.0)?)
            }
        )*
    };
}

macro_rules! forward_single {
    ($($method:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                Deserializer::$method(Text(self.single()?), visitor)
            }
        )*
    };
}

/// One textual value.
#[derive(Clone, Copy)]
struct Text<'a>(&'a str);

impl<'de, 'a> Deserializer<'de> for Text<'a> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_str(self.0)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_bool(parse_bool(self.0)?)
    }

    parse_text! {
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_i128 => visit_i128,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_u128 => visit_u128,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
        deserialize_char => visit_char,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        if self.0.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let items = [self.0];
        visitor.visit_seq(TextSeq {
            iter: items.iter(),
        })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let variant: StrDeserializer<'_, DecodeError> = self.0.into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf unit_struct tuple tuple_struct map struct identifier
    }
}

/// All values of one source key.
#[derive(Clone, Copy)]
struct Values<'a>(&'a [&'a str]);

impl<'a> Values<'a> {
    fn single(&self) -> Result<&'a str, DecodeError> {
        self.0.first().copied().ok_or_else(DecodeError::missing)
    }
}

impl<'de, 'a> Deserializer<'de> for Values<'a> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.0 {
            [] => Err(DecodeError::missing()),
            [one] => visitor.visit_str(one),
            many => visitor.visit_seq(TextSeq { iter: many.iter() }),
        }
    }

    forward_single! {
        deserialize_bool,
        deserialize_i8,
        deserialize_i16,
        deserialize_i32,
        deserialize_i64,
        deserialize_i128,
        deserialize_u8,
        deserialize_u16,
        deserialize_u32,
        deserialize_u64,
        deserialize_u128,
        deserialize_f32,
        deserialize_f64,
        deserialize_char,
        deserialize_str,
        deserialize_string,
        deserialize_identifier,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.0 {
            [] | [""] => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_seq(TextSeq {
            iter: self.0.iter(),
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Text(self.single()?).deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bytes byte_buf unit_struct tuple_struct map struct
    }
}

struct TextSeq<'a> {
    iter: std::slice::Iter<'a, &'a str>,
}

impl<'de, 'a> SeqAccess<'de> for TextSeq<'a> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        match self.iter.next() {
            Some(raw) => seed.deserialize(Text(*raw)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Every key/value pair of a source, read as a map.
#[derive(Clone, Copy)]
struct Pairs<'a>(&'a [(String, String)]);

impl<'a> Pairs<'a> {
    /// Group repeated keys, keeping first-seen order.
    fn grouped(&self) -> Vec<(&'a str, Vec<&'a str>)> {
        let mut groups: Vec<(&'a str, Vec<&'a str>)> = Vec::new();
        for (key, value) in self.0 {
            match groups.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, values)) => values.push(value.as_str()),
                None => groups.push((key.as_str(), vec![value.as_str()])),
            }
        }
        groups
    }
}

impl<'de, 'a> Deserializer<'de> for Pairs<'a> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_map(PairsAccess {
            entries: self.grouped().into_iter(),
            pending: None,
        })
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        if self.0.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

struct PairsAccess<'a> {
    entries: std::vec::IntoIter<(&'a str, Vec<&'a str>)>,
    pending: Option<Vec<&'a str>>,
}

impl<'de, 'a> MapAccess<'de> for PairsAccess<'a> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        match self.entries.next() {
            Some((key, values)) => {
                self.pending = Some(values);
                seed.deserialize(Text(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<S::Value, DecodeError> {
        let values = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("value requested before key"))?;
        seed.deserialize(Values(values.as_slice()))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
