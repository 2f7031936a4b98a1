//! The document root: section registry, inherited lookups and write-back.
//!
//! A [`Document`] owns its sections in document order. The default section has
//! the empty name `""`, always exists and always comes first.
//!
//! Parent/child relations are derived from section names alone. With a child
//! delimiter of `:`, the ancestors of `a:b:c` are `a:b` then `a`, whether or not
//! those sections exist; see [`ancestor_names`].
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::{load_sources, LoadOptions, Source};
//!
//! let text = "[package]\nNAME = ini\n\n[package:sub]\nVERSION = 1.0\n";
//! let options = LoadOptions::new().with_child_section_delimiter(":");
//! let doc = load_sources(options, [Source::from(text.as_bytes())]).unwrap();
//!
//! assert_eq!(doc.key("package:sub", "NAME").unwrap().value(), "ini");
//! assert_eq!(doc.child_sections("package").len(), 1);
//! ```

use crate::encoder::Encoder;
use crate::key::Key;
use crate::map::NameMap;
use crate::section::Section;
use crate::source::Source;
use crate::{EncodeOptions, Error, LoadOptions, Result};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Name of the implicit top-level section.
pub const DEFAULT_SECTION: &str = "";

/// Maps a struct field name to a key or section name during struct mapping.
pub type NameMapper = fn(&str) -> String;

/// Rewrites a raw value before `%(name)s` references are expanded.
pub type ValueMapper = fn(&str) -> String;

/// An ordered, mutable INI document.
#[derive(Debug, Clone)]
pub struct Document {
    options: LoadOptions,
    sections: NameMap<Section>,
    pub(crate) sources: Vec<Source>,
    name_mapper: Option<NameMapper>,
    value_mapper: Option<ValueMapper>,
}

impl Document {
    /// Creates an empty document that parses and stores names per `options`.
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        let mut doc = Document {
            sections: NameMap::new(options.sections_insensitive()),
            options,
            sources: Vec::new(),
            name_mapper: None,
            value_mapper: None,
        };
        doc.reset();
        doc
    }

    /// Drops every section, leaving only an empty default section.
    pub(crate) fn reset(&mut self) {
        self.sections.clear();
        let default = Section::new(DEFAULT_SECTION.to_string(), &self.options);
        self.sections.insert(DEFAULT_SECTION, default);
    }

    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[must_use]
    pub fn name_mapper(&self) -> Option<NameMapper> {
        self.name_mapper
    }

    /// Installs a function turning struct field names into key and section
    /// names during mapping and reflection.
    pub fn set_name_mapper(&mut self, mapper: Option<NameMapper>) {
        self.name_mapper = mapper;
    }

    pub(crate) fn mapped_name(&self, field: &str) -> String {
        self.name_mapper
            .map_or_else(|| field.to_string(), |mapper| mapper(field))
    }

    #[must_use]
    pub fn value_mapper(&self) -> Option<ValueMapper> {
        self.value_mapper
    }

    /// Installs a function applied to raw values by [`Document::value`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::load;
    ///
    /// fn shout(value: &str) -> String {
    ///     value.to_uppercase()
    /// }
    ///
    /// let mut doc = load(b"greeting = hello".as_slice()).unwrap();
    /// doc.set_value_mapper(Some(shout));
    /// assert_eq!(doc.value("", "greeting").unwrap(), "HELLO");
    /// assert_eq!(doc.key("", "greeting").unwrap().value(), "hello");
    /// ```
    pub fn set_value_mapper(&mut self, mapper: Option<ValueMapper>) {
        self.value_mapper = mapper;
    }

    /// Creates a section, or returns the existing one with the same name.
    ///
    /// The name is trimmed; an empty name is rejected. Use
    /// [`Document::section_mut`] to reach the default section.
    pub fn new_section(&mut self, name: &str) -> Result<&mut Section> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName("section"));
        }
        Ok(self.section_mut(name))
    }

    /// Returns the named section, creating it if needed.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let name = name.trim();
        let unparseable = self.options.is_unparseable(name);
        let options = &self.options;
        let section = self
            .sections
            .get_or_insert_with(name, |name| Section::new(name, options));
        if unparseable {
            section.mark_unparseable();
        }
        section
    }

    pub fn section(&self, name: &str) -> Result<&Section> {
        let name = name.trim();
        self.sections
            .get(name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains(name.trim())
    }

    /// Removes a section and returns it.
    ///
    /// Deleting the default section leaves an empty default section in its place.
    pub fn delete_section(&mut self, name: &str) -> Option<Section> {
        let name = name.trim();
        if name == DEFAULT_SECTION {
            let empty = Section::new(DEFAULT_SECTION.to_string(), &self.options);
            return self.sections.insert(DEFAULT_SECTION, empty);
        }
        self.sections.remove(name)
    }

    /// Sections in document order, the default section first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.sections.values()
    }

    #[must_use]
    pub fn section_strings(&self) -> Vec<&str> {
        self.sections.names().collect()
    }

    /// Direct children of `name`, in document order.
    ///
    /// Grandchildren are not included. Without a child delimiter the list is empty.
    #[must_use]
    pub fn child_sections(&self, name: &str) -> Vec<&Section> {
        let Some(delimiter) = self.options.child_section_delimiter.as_deref() else {
            return Vec::new();
        };
        let prefix = format!("{}{delimiter}", self.sections.normalize(name.trim()));
        self.sections
            .values()
            .filter(|section| {
                section
                    .name()
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains(delimiter))
            })
            .collect()
    }

    /// Ancestor names of `name` under the configured child delimiter, nearest first.
    #[must_use]
    pub fn parent_names(&self, name: &str) -> Vec<String> {
        match self.options.child_section_delimiter.as_deref() {
            Some(delimiter) => ancestor_names(&self.sections.normalize(name.trim()), delimiter),
            None => Vec::new(),
        }
    }

    /// Keys inherited by section `name` from its ancestors.
    ///
    /// Ancestors are visited nearest first, each contributing its keys in
    /// definition order. A key name already contributed by a nearer ancestor is
    /// skipped.
    #[must_use]
    pub fn parent_keys(&self, name: &str) -> Vec<&Key> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for parent in self.parent_names(name) {
            let Some(section) = self.sections.get(&parent) else {
                continue;
            };
            for key in section.keys() {
                if seen.insert(key.name()) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Looks up a key in `section`, falling back to its ancestors.
    ///
    /// The section itself does not have to exist for ancestors to be searched.
    pub fn key(&self, section: &str, key: &str) -> Result<&Key> {
        self.find_key(section, key).map(|(_, key)| key)
    }

    /// Resolved value of a key: the value mapper, then `%(name)s` expansion
    /// against the keys of the section that defines it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::load;
    ///
    /// let doc = load(b"[author]\nNAME = Unknwon\nGITHUB = https://github.com/%(NAME)s".as_slice())
    ///     .unwrap();
    /// assert_eq!(doc.value("author", "GITHUB").unwrap(), "https://github.com/Unknwon");
    /// ```
    pub fn value(&self, section: &str, key: &str) -> Result<String> {
        let (owner, key) = self.find_key(section, key)?;
        Ok(self.resolve(owner, key, key.value()))
    }

    /// Resolved primary value followed by resolved shadow values.
    pub fn values(&self, section: &str, key: &str) -> Result<Vec<String>> {
        let (owner, key) = self.find_key(section, key)?;
        Ok(key
            .values()
            .iter()
            .map(|value| self.resolve(owner, key, value))
            .collect())
    }

    pub(crate) fn find_key(&self, section: &str, key: &str) -> Result<(&Section, &Key)> {
        let section = section.trim();
        std::iter::once(self.sections.normalize(section))
            .chain(self.parent_names(section))
            .find_map(|name| {
                let owner = self.sections.get(&name)?;
                owner.key(key).ok().map(|found| (owner, found))
            })
            .ok_or_else(|| Error::key_not_found(section, key))
    }

    fn resolve(&self, owner: &Section, key: &Key, raw: &str) -> String {
        match self.value_mapper {
            Some(mapper) => owner.expand(key.name(), &mapper(raw)),
            None => owner.expand(key.name(), raw),
        }
    }

    /// Encodes the document with default formatting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::empty;
    ///
    /// let mut doc = empty();
    /// doc.section_mut("").new_key("app", "demo").unwrap();
    /// let server = doc.new_section("server").unwrap();
    /// server.new_key("host", "localhost").unwrap();
    /// server.new_key("port", "8080").unwrap();
    ///
    /// assert_eq!(
    ///     doc.to_ini_string(),
    ///     "app = demo\n\n[server]\nhost = localhost\nport = 8080\n\n"
    /// );
    /// ```
    #[must_use]
    pub fn to_ini_string(&self) -> String {
        self.to_ini_string_with(&EncodeOptions::default())
    }

    /// Encodes the document. Names or values no quoting form can hold are
    /// written as is; use [`Document::encode_with`] to have them rejected.
    #[must_use]
    pub fn to_ini_string_with(&self, options: &EncodeOptions) -> String {
        let mut encoder = Encoder::new(&self.options, options);
        encoder.write_document(self);
        encoder.into_inner()
    }

    /// Encodes the document, failing with [`Error::Unwritable`] if the text
    /// would not read back to the same names and values.
    ///
    /// ```rust
    /// use ini_doc::{empty, EncodeOptions, Error};
    ///
    /// let mut doc = empty();
    /// doc.section_mut("").new_key(" padded", "x").unwrap();
    /// let err = doc.encode_with(&EncodeOptions::default()).unwrap_err();
    /// assert!(matches!(err, Error::Unwritable { kind: "key", .. }));
    /// ```
    pub fn encode_with(&self, options: &EncodeOptions) -> Result<String> {
        let mut encoder = Encoder::new(&self.options, options);
        encoder.write_document(self);
        encoder.finish()
    }

    /// Writes the encoded document and returns the number of bytes written.
    ///
    /// Fails with [`Error::Unwritable`] before writing anything if a name or
    /// value would not read back unchanged.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<usize> {
        self.write_to_with(writer, &EncodeOptions::default())
    }

    pub fn write_to_with<W: io::Write>(&self, mut writer: W, options: &EncodeOptions) -> Result<usize> {
        let text = self.encode_with(options)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))?;
        Ok(text.len())
    }

    /// Writes the encoded document to a file, replacing its contents.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_to_with(path, &EncodeOptions::default())
    }

    pub fn save_to_with(&self, path: impl AsRef<Path>, options: &EncodeOptions) -> Result<()> {
        let path = path.as_ref();
        let text = self.encode_with(options)?;
        fs::write(path, text).map_err(|e| Error::from_io(&e, &path.display().to_string()))
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(LoadOptions::default())
    }
}

/// Ancestor names of `name`, nearest first, found by repeatedly dropping the
/// last `delimiter`-separated component.
///
/// # Examples
///
/// ```rust
/// use ini_doc::ancestor_names;
///
/// assert_eq!(ancestor_names("a:b:c", ":"), vec!["a:b", "a"]);
/// assert!(ancestor_names("a", ":").is_empty());
/// ```
#[must_use]
pub fn ancestor_names(name: &str, delimiter: &str) -> Vec<String> {
    let mut names = Vec::new();
    if delimiter.is_empty() {
        return names;
    }
    let mut current = name;
    while let Some(index) = current.rfind(delimiter) {
        current = &current[..index];
        names.push(current.to_string());
    }
    names
}

/// Splits an identifier into words at underscores and lower-to-upper case changes.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut previous_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        word.push(c);
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Name mapper producing `ALL_CAPS_UNDERSCORE` names.
///
/// # Examples
///
/// ```rust
/// use ini_doc::all_caps_underscore;
///
/// assert_eq!(all_caps_underscore("package_name"), "PACKAGE_NAME");
/// assert_eq!(all_caps_underscore("PackageName"), "PACKAGE_NAME");
/// ```
#[must_use]
pub fn all_caps_underscore(name: &str) -> String {
    words(name)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Name mapper producing `Title_Underscore` names.
///
/// # Examples
///
/// ```rust
/// use ini_doc::title_underscore;
///
/// assert_eq!(title_underscore("package_name"), "Package_Name");
/// assert_eq!(title_underscore("HTTPPort"), "Httpport");
/// ```
#[must_use]
pub fn title_underscore(name: &str) -> String {
    words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("_")
}
