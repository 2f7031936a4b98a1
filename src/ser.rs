//! Struct reflection into documents.
//!
//! Values are first serialized into a [`Field`] tree, then written into a
//! [`Document`]:
//!
//! - scalar fields become keys of the current section
//! - sequences of scalars become one key whose value is joined with `,`
//!   (commas and backslashes inside elements are escaped so they split back)
//! - struct and map fields become sections named after the field
//! - `None` fields are left out
//!
//! Field names pass through the document's [`NameMapper`](crate::NameMapper).
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Config {
//!     name: String,
//!     ports: Vec<u16>,
//!     server: Server,
//! }
//!
//! #[derive(Serialize)]
//! struct Server {
//!     host: String,
//! }
//!
//! let config = Config {
//!     name: "demo".into(),
//!     ports: vec![80, 443],
//!     server: Server { host: "localhost".into() },
//! };
//! assert_eq!(
//!     to_string(&config).unwrap(),
//!     "name  = demo\nports = 80,443\n\n[server]\nhost = localhost\n\n"
//! );
//! ```

use crate::document::{Document, DEFAULT_SECTION};
use crate::value::{parse_bool, parse_float, parse_int, parse_uint, split_list};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{ser, Serialize};

/// A serialized value, shaped the way INI can hold it.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Record(IndexMap<String, Field>),
    /// `None`: nothing is written.
    Absent,
}

/// A single value with the type it was serialized from.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// The value as written to a key.
    #[must_use]
    pub fn to_ini(&self) -> String {
        match self {
            Scalar::Bool(v) => v.to_string(),
            Scalar::Int(v) => v.to_string(),
            Scalar::Uint(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Text(v) => v.clone(),
        }
    }

    /// `true` if `raw` converts to this scalar's type.
    #[must_use]
    pub fn accepts(&self, raw: &str) -> bool {
        match self {
            Scalar::Bool(_) => parse_bool(raw).is_ok(),
            Scalar::Int(_) => parse_int(raw).is_ok(),
            Scalar::Uint(_) => parse_uint(raw).is_ok(),
            Scalar::Float(_) => parse_float(raw).is_ok(),
            Scalar::Text(_) => true,
        }
    }
}

/// Serializes `value` into a [`Field`] tree.
pub fn to_field<T>(value: &T) -> Result<Field>
where
    T: ?Sized + Serialize,
{
    value.serialize(FieldSerializer)
}

/// Joins list elements so [`split_list`](crate::value::split_list) with `,`
/// gives them back.
fn join_list(items: &[Scalar]) -> String {
    items
        .iter()
        .map(|item| item.to_ini().replace('\\', "\\\\").replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(",")
}

fn into_record(field: Field) -> Result<IndexMap<String, Field>> {
    match field {
        Field::Record(record) => Ok(record),
        _ => Err(Error::unsupported_type(
            "only structs and maps can be written as sections",
        )),
    }
}

impl Document {
    /// Writes the fields of `value` into the default section.
    pub fn reflect_from<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.reflect_section_from(DEFAULT_SECTION, value)
    }

    /// Writes the fields of `value` into the named section, creating it if
    /// needed. Record fields become further sections.
    pub fn reflect_section_from<T>(&mut self, section: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let record = into_record(to_field(value)?)?;
        self.write_record(section.trim(), record)
    }

    fn write_record(&mut self, section: &str, record: IndexMap<String, Field>) -> Result<()> {
        if section != DEFAULT_SECTION {
            self.new_section(section)?;
        }
        for (field, value) in record {
            let name = self.mapped_name(&field);
            match value {
                Field::Scalar(scalar) => {
                    self.section_mut(section).set_key(&name, scalar.to_ini())?;
                }
                Field::List(items) => {
                    self.section_mut(section).set_key(&name, join_list(&items))?;
                }
                Field::Record(inner) => self.write_record(&name, inner)?,
                Field::Absent => {}
            }
        }
        Ok(())
    }

    /// Maps the default section onto `target`, keeping the current value of
    /// every field whose key is missing or does not convert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::load;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct Limits { retries: u32, name: String }
    ///
    /// let doc = load(b"retries = many\nname = api".as_slice()).unwrap();
    /// let mut limits = Limits { retries: 3, name: String::new() };
    /// doc.map_onto(&mut limits).unwrap();
    /// assert_eq!(limits.retries, 3);
    /// assert_eq!(limits.name, "api");
    /// ```
    pub fn map_onto<T>(&self, target: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.map_section_onto(DEFAULT_SECTION, target)
    }

    /// Lenient [`Document::map_section_to`]: a field is only overwritten by
    /// a document value that maps onto the field's type.
    ///
    /// Each candidate value is tried on its own against `T`; a field whose
    /// value fails keeps its current value, `None` and empty lists included.
    pub fn map_section_onto<T>(&self, section: &str, target: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let section = section.trim();
        let current = into_record(to_field(&*target)?)?;
        let mut merged = Document::new(self.options().clone());
        merged.set_name_mapper(self.name_mapper());
        let mut candidates = Vec::new();
        self.overlay(&mut merged, &mut candidates, section, current)?;

        for candidate in candidates {
            let previous = merged
                .section(&candidate.section)
                .and_then(|owner| owner.key(&candidate.key))
                .map(|key| key.value().to_string())
                .ok();
            merged
                .section_mut(&candidate.section)
                .set_key(&candidate.key, candidate.value)?;
            if let Err(err) = merged.map_section_to::<T>(section) {
                tracing::debug!(
                    section = %candidate.section,
                    key = %candidate.key,
                    "keeping current value: {err}"
                );
                let owner = merged.section_mut(&candidate.section);
                match previous {
                    Some(value) => {
                        owner.set_key(&candidate.key, value)?;
                    }
                    None => {
                        owner.delete_key(&candidate.key);
                    }
                }
            }
        }

        *target = merged.map_section_to(section)?;
        Ok(())
    }

    /// Writes the current field values into `merged` and collects the
    /// document's values for those fields as candidates.
    fn overlay(
        &self,
        merged: &mut Document,
        candidates: &mut Vec<Candidate>,
        section: &str,
        current: IndexMap<String, Field>,
    ) -> Result<()> {
        if section != DEFAULT_SECTION {
            merged.new_section(section)?;
        }
        for (field, value) in current {
            let name = self.mapped_name(&field);
            let found = self.values(section, &name).ok();
            let (fallback, candidate) = match value {
                Field::Record(inner) => {
                    self.overlay(merged, candidates, &name, inner)?;
                    continue;
                }
                Field::Absent => (None, found.and_then(|values| values.into_iter().next())),
                Field::Scalar(scalar) => (
                    Some(scalar.to_ini()),
                    found
                        .and_then(|values| values.into_iter().next())
                        .filter(|raw| scalar.accepts(raw)),
                ),
                Field::List(items) => (
                    Some(join_list(&items)),
                    found.map(list_elements).map(|elements| {
                        join_list(&elements.into_iter().map(Scalar::Text).collect::<Vec<_>>())
                    }),
                ),
            };
            if let Some(text) = fallback {
                merged.section_mut(section).set_key(&name, text)?;
            }
            if let Some(value) = candidate {
                candidates.push(Candidate {
                    section: section.to_string(),
                    key: name,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A document value that may replace a field's current value.
struct Candidate {
    section: String,
    key: String,
    value: String,
}

/// Elements of a list key: its shadow values, or its value split on `,`.
fn list_elements(values: Vec<String>) -> Vec<String> {
    if values.len() > 1 {
        values
    } else {
        values
            .first()
            .map(|value| split_list(value, ","))
            .unwrap_or_default()
    }
}

/// Serializes any `Serialize` value into a [`Field`].
pub struct FieldSerializer;

pub struct SerializeList {
    items: Vec<Scalar>,
}

pub struct SerializeRecord {
    record: IndexMap<String, Field>,
    current_key: Option<String>,
}

impl ser::Serializer for FieldSerializer {
    type Ok = Field;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeList;
    type SerializeMap = SerializeRecord;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeRecord;

    fn serialize_bool(self, v: bool) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i16(self, v: i16) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i32(self, v: i32) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i64(self, v: i64) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Uint(u64::from(v))))
    }

    fn serialize_u16(self, v: u16) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Uint(u64::from(v))))
    }

    fn serialize_u32(self, v: u32) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Uint(u64::from(v))))
    }

    fn serialize_u64(self, v: u64) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Uint(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Float(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Text(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Text(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Text(String::from_utf8_lossy(v).into_owned())))
    }

    fn serialize_none(self) -> Result<Field> {
        Ok(Field::Absent)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Text(String::new())))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Field> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Field> {
        Ok(Field::Scalar(Scalar::Text(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type("newtype variants"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<SerializeList> {
        Err(Error::unsupported_type("tuple variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<SerializeRecord> {
        Err(Error::unsupported_type("struct variants"))
    }
}

impl SerializeList {
    fn new(capacity: usize) -> Self {
        SerializeList {
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_field(value)? {
            Field::Scalar(scalar) => {
                self.items.push(scalar);
                Ok(())
            }
            _ => Err(Error::unsupported_type("list elements must be scalars")),
        }
    }
}

impl SerializeRecord {
    fn new() -> Self {
        SerializeRecord {
            record: IndexMap::new(),
            current_key: None,
        }
    }
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Field;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Field> {
        Ok(Field::List(self.items))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Field;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Field> {
        Ok(Field::List(self.items))
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = Field;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Field> {
        Ok(Field::List(self.items))
    }
}

impl ser::SerializeTupleVariant for SerializeList {
    type Ok = Field;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Field> {
        Ok(Field::List(self.items))
    }
}

impl ser::SerializeMap for SerializeRecord {
    type Ok = Field;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_field(key)? {
            Field::Scalar(scalar) => {
                self.current_key = Some(scalar.to_ini());
                Ok(())
            }
            _ => Err(Error::unsupported_type("map keys must be scalars")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        self.record.insert(key, to_field(value)?);
        Ok(())
    }

    fn end(self) -> Result<Field> {
        Ok(Field::Record(self.record))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Field;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.record.insert(key.to_string(), to_field(value)?);
        Ok(())
    }

    fn end(self) -> Result<Field> {
        Ok(Field::Record(self.record))
    }
}

impl ser::SerializeStructVariant for SerializeRecord {
    type Ok = Field;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.record.insert(key.to_string(), to_field(value)?);
        Ok(())
    }

    fn end(self) -> Result<Field> {
        Ok(Field::Record(self.record))
    }
}
