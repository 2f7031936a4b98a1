//! Struct mapping from documents.
//!
//! [`SectionDeserializer`] maps one section onto a `Deserialize` type. Struct
//! fields resolve, in order, to:
//!
//! - a key of the section or of one of its ancestors, read through
//!   [`Document::value`] so value mappers and `%(name)s` references apply
//! - a section with the field's name, for record-shaped fields
//!
//! Fields with neither are left out and serde's rules for missing fields apply:
//! `Option` fields become `None`, `#[serde(default)]` fields take their default
//! and anything else is an error.
//!
//! Field names pass through the document's [`NameMapper`](crate::NameMapper).
//!
//! ## Value shapes
//!
//! | Target                     | Source |
//! |----------------------------|--------|
//! | bool, integers, floats     | the typed conversions of [`value`](crate::value) |
//! | `String`, `char`, unit enums | the raw resolved value |
//! | `Option<T>`                | `None` for an empty value |
//! | sequences and tuples       | shadow values if present, else the value split on `,` |
//! | `chrono` timestamps        | RFC 3339 through chrono's own serde support |
//! | [`chrono::Duration`]       | `#[serde(with = "ini_doc::de::duration")]` |
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::load;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config {
//!     name: String,
//!     port: u16,
//!     tags: Vec<String>,
//!     server: Server,
//! }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     debug: Option<bool>,
//! }
//!
//! let doc = load(b"name = demo\nport = 8080\ntags = a, b\n[server]\nhost = localhost".as_slice())
//!     .unwrap();
//! let config: Config = doc.map_to().unwrap();
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.tags, vec!["a", "b"]);
//! assert_eq!(config.server.debug, None);
//! ```

use crate::document::{Document, DEFAULT_SECTION};
use crate::value::{parse_bool, parse_float, parse_int, parse_uint, split_list};
use crate::{Error, Result};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;

impl Document {
    /// Maps the default section onto `T`.
    pub fn map_to<T: DeserializeOwned>(&self) -> Result<T> {
        self.map_section_to(DEFAULT_SECTION)
    }

    /// Maps the named section onto `T`.
    ///
    /// The section does not have to exist; fields can still be found on its
    /// ancestors or as sections of their own.
    pub fn map_section_to<T: DeserializeOwned>(&self, section: &str) -> Result<T> {
        T::deserialize(SectionDeserializer::new(self, section))
    }
}

/// Maps a section (and sections named after its record fields) onto a type.
pub struct SectionDeserializer<'a> {
    doc: &'a Document,
    section: String,
}

impl<'a> SectionDeserializer<'a> {
    #[must_use]
    pub fn new(doc: &'a Document, section: &str) -> Self {
        SectionDeserializer {
            doc,
            section: section.trim().to_string(),
        }
    }
}

impl<'de, 'a> de::Deserializer<'de> for SectionDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let entries = match self.doc.section(&self.section) {
            Ok(section) => section
                .keys()
                .map(|key| {
                    let values = self.doc.values(&self.section, key.name())?;
                    Ok((key.name().to_string(), values))
                })
                .collect::<Result<Vec<_>>>()?,
            Err(_) => Vec::new(),
        };
        visitor.visit_map(KeyMapAccess {
            entries: entries.into_iter(),
            pending: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(FieldAccess {
            doc: self.doc,
            section: self.section,
            fields: fields.iter(),
            pending: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct enum identifier
        ignored_any
    }
}

/// What a struct field resolved to.
enum Entry {
    Key { name: String, values: Vec<String> },
    Section(String),
}

struct FieldAccess<'a> {
    doc: &'a Document,
    section: String,
    fields: std::slice::Iter<'static, &'static str>,
    pending: Option<Entry>,
}

impl<'a> FieldAccess<'a> {
    fn resolve(&self, field: &str) -> Result<Option<Entry>> {
        let name = self.doc.mapped_name(field);
        match self.doc.values(&self.section, &name) {
            Ok(values) => return Ok(Some(Entry::Key { name, values })),
            Err(Error::KeyNotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        Ok(self
            .doc
            .has_section(&name)
            .then_some(Entry::Section(name)))
    }
}

impl<'de, 'a> de::MapAccess<'de> for FieldAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        while let Some(field) = self.fields.next() {
            if let Some(entry) = self.resolve(field)? {
                self.pending = Some(entry);
                return seed
                    .deserialize(de::value::StrDeserializer::<Error>::new(field))
                    .map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(Entry::Key { name, values }) => seed
                .deserialize(ValueDeserializer::new(&name, values))
                .map_err(|e| Error::mapping(&name, e)),
            Some(Entry::Section(name)) => {
                seed.deserialize(SectionDeserializer::new(self.doc, &name))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

struct KeyMapAccess {
    entries: std::vec::IntoIter<(String, Vec<String>)>,
    pending: Option<(String, Vec<String>)>,
}

impl<'de> de::MapAccess<'de> for KeyMapAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((name, values)) => {
                let key = seed.deserialize(de::value::StrDeserializer::<Error>::new(&name))?;
                self.pending = Some((name, values));
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((name, values)) => seed
                .deserialize(ValueDeserializer::new(&name, values))
                .map_err(|e| Error::mapping(&name, e)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.entries.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Deserializes one key: its primary value and any shadow values.
pub struct ValueDeserializer {
    name: String,
    values: Vec<String>,
}

impl ValueDeserializer {
    /// `values` holds the primary value first, then shadow values.
    #[must_use]
    pub fn new(name: &str, values: Vec<String>) -> Self {
        ValueDeserializer {
            name: name.to_string(),
            values,
        }
    }

    fn primary(&self) -> &str {
        self.values.first().map_or("", String::as_str)
    }

    fn into_primary(self) -> String {
        self.values.into_iter().next().unwrap_or_default()
    }

    fn integer<T: TryFrom<i64>>(&self, target: &'static str) -> Result<T> {
        let value = parse_int(self.primary())?;
        T::try_from(value).map_err(|_| Error::conversion(self.primary(), target))
    }

    fn unsigned<T: TryFrom<u64>>(&self, target: &'static str) -> Result<T> {
        let value = parse_uint(self.primary())?;
        T::try_from(value).map_err(|_| Error::conversion(self.primary(), target))
    }

    /// Sequence elements: shadow values, or the split primary value.
    fn elements(self) -> Vec<String> {
        if self.values.len() > 1 {
            self.values
        } else {
            split_list(self.primary(), ",")
        }
    }
}

impl<'de> IntoDeserializer<'de, Error> for ValueDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_primary())
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(parse_bool(self.primary())?)
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i8(self.integer("i8")?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i16(self.integer("i16")?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i32(self.integer("i32")?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(parse_int(self.primary())?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u8(self.unsigned("u8")?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u16(self.unsigned("u16")?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u32(self.unsigned("u32")?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(parse_uint(self.primary())?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        #[allow(clippy::cast_possible_truncation)]
        let value = parse_float(self.primary())? as f32;
        visitor.visit_f32(value)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(parse_float(self.primary())?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let mut chars = self.primary().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::conversion(self.primary(), "char")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_primary())
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_primary())
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.into_primary().into_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.primary().is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let name = self.name.clone();
        let elements = self
            .elements()
            .into_iter()
            .map(move |element| ValueDeserializer::new(&name, vec![element]));
        visitor.visit_seq(de::value::SeqDeserializer::new(elements))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("a key value cannot hold a map"))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("a key value cannot hold a struct"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(de::value::StringDeserializer::<Error>::new(self.into_primary()))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        i128 u128
    }
}

/// Serde adapter for Go-style duration strings such as `1h30m`.
///
/// ```rust
/// use chrono::Duration;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, Serialize)]
/// struct Timeouts {
///     #[serde(with = "ini_doc::de::duration")]
///     read: Duration,
/// }
///
/// let timeouts: Timeouts = ini_doc::from_str("read = 1m30s").unwrap();
/// assert_eq!(timeouts.read, Duration::seconds(90));
/// assert_eq!(ini_doc::to_string(&timeouts).unwrap(), "read = 1m30s\n");
/// ```
pub mod duration {
    use crate::value::{format_duration, parse_duration};
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_duration(&text).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }
}
