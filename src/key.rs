//! Keys and their typed accessors.
//!
//! A [`Key`] holds one or more raw values (more than one only for shadow keys), a
//! comment, and flags for boolean (bare) and auto-increment keys. Typed accessors
//! interpret the primary value on every call; nothing is cached.

use crate::value::{
    parse_bool, parse_duration, parse_float, parse_int, parse_time, parse_time_format, parse_uint,
    split_list,
};
use crate::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset};

/// A named key inside a [`Section`](crate::Section).
///
/// # Examples
///
/// ```rust
/// use ini_doc::load;
///
/// let doc = load(b"port = 8080\nhosts = a, b, c".as_slice()).unwrap();
/// let section = doc.section("").unwrap();
///
/// assert_eq!(section.key("port").unwrap().int().unwrap(), 8080);
/// assert_eq!(section.key("hosts").unwrap().strings(","), vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    name: String,
    values: Vec<String>,
    comment: String,
    boolean: bool,
    auto_increment: bool,
    nested_values: Vec<String>,
}

impl Key {
    pub(crate) fn new(name: String, value: String) -> Self {
        Key {
            name,
            values: vec![value],
            comment: String::new(),
            boolean: false,
            auto_increment: false,
            nested_values: Vec::new(),
        }
    }

    pub(crate) fn new_boolean(name: String) -> Self {
        Key {
            boolean: true,
            ..Key::new(name, "true".to_string())
        }
    }

    pub(crate) fn mark_auto_increment(&mut self) {
        self.auto_increment = true;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.values[0]
    }

    /// The primary value followed by all shadow values, in order of appearance.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Replaces the primary value.
    ///
    /// Boolean keys stay bare on output, so setting a value on one turns it into a
    /// regular key.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.values[0] = value.into();
        self.boolean = false;
    }

    /// Appends a shadow value.
    ///
    /// A value equal to an existing one is ignored unless `allow_duplicates` is set.
    /// Boolean and auto-increment keys cannot carry shadows.
    pub fn add_shadow(&mut self, value: impl Into<String>, allow_duplicates: bool) -> Result<()> {
        if self.boolean || self.auto_increment {
            return Err(Error::InvalidShadow(self.name.clone()));
        }
        let value = value.into();
        if !allow_duplicates && self.values.contains(&value) {
            return Ok(());
        }
        self.values.push(value);
        Ok(())
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// `true` for a key that appeared without delimiter or value.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// `true` for a key written as `-` in the source.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    #[must_use]
    pub fn nested_values(&self) -> &[String] {
        &self.nested_values
    }

    pub fn add_nested_value(&mut self, value: impl Into<String>) {
        self.nested_values.push(value.into());
    }

    pub fn bool(&self) -> Result<bool> {
        parse_bool(self.value())
    }

    pub fn int(&self) -> Result<i64> {
        parse_int(self.value())
    }

    pub fn uint(&self) -> Result<u64> {
        parse_uint(self.value())
    }

    pub fn float(&self) -> Result<f64> {
        parse_float(self.value())
    }

    pub fn duration(&self) -> Result<Duration> {
        parse_duration(self.value())
    }

    /// Parses the value as an RFC 3339 timestamp.
    pub fn time(&self) -> Result<DateTime<FixedOffset>> {
        parse_time(self.value())
    }

    /// Parses the value with a `chrono` format string.
    pub fn time_format(&self, format: &str) -> Result<DateTime<FixedOffset>> {
        parse_time_format(self.value(), format)
    }

    /// Returns the boolean value, or `default` if it does not parse.
    #[must_use]
    pub fn must_bool(&self, default: bool) -> bool {
        self.bool().unwrap_or(default)
    }

    #[must_use]
    pub fn must_int(&self, default: i64) -> i64 {
        self.int().unwrap_or(default)
    }

    #[must_use]
    pub fn must_uint(&self, default: u64) -> u64 {
        self.uint().unwrap_or(default)
    }

    #[must_use]
    pub fn must_float(&self, default: f64) -> f64 {
        self.float().unwrap_or(default)
    }

    #[must_use]
    pub fn must_duration(&self, default: Duration) -> Duration {
        self.duration().unwrap_or(default)
    }

    #[must_use]
    pub fn must_time(&self, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.time().unwrap_or(default)
    }

    /// Returns the value if it is one of `candidates`, otherwise `default`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::load;
    ///
    /// let doc = load(b"mode = fast".as_slice()).unwrap();
    /// let key = doc.section("").unwrap().key("mode").unwrap();
    /// assert_eq!(key.in_str("safe", &["safe", "fast"]), "fast");
    /// assert_eq!(key.in_str("safe", &["safe", "slow"]), "safe");
    /// ```
    #[must_use]
    pub fn in_str<'a>(&'a self, default: &'a str, candidates: &[&str]) -> &'a str {
        if candidates.contains(&self.value()) {
            self.value()
        } else {
            default
        }
    }

    /// Returns the integer value if it lies within `min..=max`, otherwise `default`.
    #[must_use]
    pub fn range_int(&self, default: i64, min: i64, max: i64) -> i64 {
        match self.int() {
            Ok(value) if (min..=max).contains(&value) => value,
            _ => default,
        }
    }

    /// Splits the value on `delim`; an empty value yields an empty list.
    #[must_use]
    pub fn strings(&self, delim: &str) -> Vec<String> {
        split_list(self.value(), delim)
    }

    /// Converts every list element, failing on the first invalid one.
    fn typed_list<T>(&self, delim: &str, parse: fn(&str) -> Result<T>) -> Result<Vec<T>> {
        self.strings(delim).iter().map(|item| parse(item)).collect()
    }

    pub fn ints(&self, delim: &str) -> Result<Vec<i64>> {
        self.typed_list(delim, parse_int)
    }

    pub fn uints(&self, delim: &str) -> Result<Vec<u64>> {
        self.typed_list(delim, parse_uint)
    }

    pub fn floats(&self, delim: &str) -> Result<Vec<f64>> {
        self.typed_list(delim, parse_float)
    }

    pub fn bools(&self, delim: &str) -> Result<Vec<bool>> {
        self.typed_list(delim, parse_bool)
    }

    pub fn times(&self, delim: &str) -> Result<Vec<DateTime<FixedOffset>>> {
        self.typed_list(delim, parse_time)
    }
}
