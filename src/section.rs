//! Sections: ordered key registries with an optional raw body.

use crate::key::Key;
use crate::map::NameMap;
use crate::value::expand_references;
use crate::{Error, LoadOptions, Result};
use std::collections::HashMap;

/// A named group of keys.
///
/// Sections listed in [`LoadOptions::unparseable_sections`] carry a raw body
/// instead of keys.
///
/// # Examples
///
/// ```rust
/// use ini_doc::empty;
///
/// let mut doc = empty();
/// let section = doc.new_section("server").unwrap();
/// section.new_key("host", "localhost").unwrap();
/// section.new_key("port", "8080").unwrap();
///
/// assert_eq!(section.key_strings(), vec!["host", "port"]);
/// assert_eq!(section.key("port").unwrap().int().unwrap(), 8080);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    comment: String,
    keys: NameMap<Key>,
    body: Option<String>,
    allow_shadows: bool,
    allow_duplicate_shadow_values: bool,
}

impl Section {
    pub(crate) fn new(name: String, options: &LoadOptions) -> Self {
        Section {
            name,
            comment: String::new(),
            keys: NameMap::new(options.keys_insensitive()),
            body: None,
            allow_shadows: options.allow_shadows,
            allow_duplicate_shadow_values: options.allow_duplicate_shadow_values,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Creates a key.
    ///
    /// If the key exists, the value is appended as a shadow when shadows are
    /// enabled; otherwise [`Error::DuplicateKey`] is returned.
    pub fn new_key(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Key> {
        if name.is_empty() {
            return Err(Error::EmptyName("key"));
        }
        if self.keys.contains(name) {
            if !self.allow_shadows {
                return Err(Error::DuplicateKey {
                    section: self.name.clone(),
                    key: name.to_string(),
                });
            }
            let allow_duplicates = self.allow_duplicate_shadow_values;
            let key = self.key_entry(name);
            key.add_shadow(value, allow_duplicates)?;
            return Ok(key);
        }
        let value = value.into();
        Ok(self.keys.get_or_insert_with(name, |name| Key::new(name, value)))
    }

    /// Creates the key or replaces its primary value.
    pub fn set_key(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Key> {
        if name.is_empty() {
            return Err(Error::EmptyName("key"));
        }
        let value = value.into();
        let key = self.keys.get_or_insert_with(name, |name| Key::new(name, String::new()));
        key.set_value(value);
        Ok(key)
    }

    /// Creates a bare key whose value reads as `true`.
    pub fn new_boolean_key(&mut self, name: &str) -> Result<&mut Key> {
        if name.is_empty() {
            return Err(Error::EmptyName("key"));
        }
        self.keys.insert(name, Key::new_boolean(self.keys.normalize(name)));
        Ok(self.key_entry(name))
    }

    /// Adds a parsed value: appended as a shadow when enabled, otherwise overwriting.
    pub(crate) fn add_parsed_key(&mut self, name: &str, value: String) -> Result<&mut Key> {
        if self.allow_shadows && self.keys.contains(name) {
            self.new_key(name, value)
        } else {
            self.set_key(name, value)
        }
    }

    fn key_entry(&mut self, name: &str) -> &mut Key {
        self.keys
            .get_or_insert_with(name, |name| Key::new(name, String::new()))
    }

    /// Looks up a key defined directly on this section.
    ///
    /// Use [`Document::key`](crate::Document::key) to include keys inherited from
    /// parent sections.
    pub fn key(&self, name: &str) -> Result<&Key> {
        self.keys
            .get(name)
            .ok_or_else(|| Error::key_not_found(&self.name, name))
    }

    pub fn key_mut(&mut self, name: &str) -> Result<&mut Key> {
        let section = self.name.clone();
        self.keys
            .get_mut(name)
            .ok_or_else(|| Error::key_not_found(&section, name))
    }

    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.keys.contains(name)
    }

    /// Returns `true` if any key's primary value equals `value`.
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.keys.values().any(|key| key.value() == value)
    }

    pub fn delete_key(&mut self, name: &str) -> Option<Key> {
        self.keys.remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.keys.values()
    }

    #[must_use]
    pub fn key_strings(&self) -> Vec<&str> {
        self.keys.names().collect()
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Primary values keyed by name.
    #[must_use]
    pub fn keys_hash(&self) -> HashMap<String, String> {
        self.keys
            .iter()
            .map(|(name, key)| (name.clone(), key.value().to_string()))
            .collect()
    }

    /// Returns the value of `name` with `%(other)s` references expanded against
    /// this section's own keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::load;
    ///
    /// let doc = load(b"[author]\nNAME = Unknwon\nGITHUB = https://github.com/%(NAME)s".as_slice())
    ///     .unwrap();
    /// let author = doc.section("author").unwrap();
    /// assert_eq!(author.string("GITHUB").unwrap(), "https://github.com/Unknwon");
    /// ```
    pub fn string(&self, name: &str) -> Result<String> {
        let key = self.key(name)?;
        Ok(self.expand(key.name(), key.value()))
    }

    /// Expands `%(name)s` references in `value` against this section's keys.
    ///
    /// References to `owner` itself are left verbatim.
    pub(crate) fn expand(&self, owner: &str, value: &str) -> String {
        let owner = self.keys.normalize(owner);
        expand_references(value, |name| {
            if self.keys.normalize(name) == owner {
                return None;
            }
            self.keys.get(name).map(|key| key.value().to_string())
        })
    }

    /// `true` if the section stores a raw body instead of keys.
    #[must_use]
    pub fn is_unparseable(&self) -> bool {
        self.body.is_some()
    }

    /// The raw body without leading and trailing blank lines.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body
            .as_deref()
            .unwrap_or_default()
            .trim_matches(|c| c == '\n' || c == '\r')
    }

    /// The raw body exactly as read, blank lines included.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Replaces the body, turning the section into an unparseable one.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub(crate) fn push_body_line(&mut self, line: &str) {
        let body = self.body.get_or_insert_with(String::new);
        body.push_str(line);
        body.push('\n');
    }

    pub(crate) fn mark_unparseable(&mut self) {
        self.body.get_or_insert_with(String::new);
    }
}
