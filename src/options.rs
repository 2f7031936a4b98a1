//! Configuration options for loading and writing INI documents.
//!
//! - [`LoadOptions`]: parser behavior flags, carried by the [`Document`](crate::Document)
//!   for its whole life so reloads and mutations follow the same rules
//! - [`EncodeOptions`]: output formatting
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::{load_sources, LoadOptions, Source};
//!
//! let options = LoadOptions::new()
//!     .with_insensitive(true)
//!     .with_allow_boolean_keys(true);
//! let doc = load_sources(options, [Source::from("[Server]\nVerbose".as_bytes())]).unwrap();
//! assert!(doc.section("server").unwrap().key("verbose").unwrap().is_boolean());
//! ```

/// Parser behavior flags.
///
/// Every flag defaults to `false`; the key/value delimiters default to `=` and `:`
/// and child sections are disabled until a delimiter is configured.
///
/// # Examples
///
/// ```rust
/// use ini_doc::LoadOptions;
///
/// let options = LoadOptions::new()
///     .with_allow_shadows(true)
///     .with_child_section_delimiter(":")
///     .with_unparseable_sections(["comments"]);
/// assert!(options.allow_shadows);
/// assert_eq!(options.child_section_delimiter.as_deref(), Some(":"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LoadOptions {
    /// Skip file sources that do not exist instead of failing.
    pub loose: bool,
    /// Case-insensitive section and key names (names are stored lowercased).
    pub insensitive: bool,
    /// Case-insensitive section names only.
    pub insensitive_sections: bool,
    /// Case-insensitive key names only.
    pub insensitive_keys: bool,
    /// Keep a trailing `\` as literal value content.
    pub ignore_continuation: bool,
    /// Never split `#`/`;` off a value as an inline comment.
    pub ignore_inline_comment: bool,
    /// Drop lines that are neither section, comment nor key/value.
    pub skip_unrecognizable_lines: bool,
    /// Stop after the first source that loads successfully.
    pub short_circuit: bool,
    /// A line without delimiter becomes a boolean key with value `true`.
    pub allow_boolean_keys: bool,
    /// Repeated keys accumulate values instead of overwriting.
    pub allow_shadows: bool,
    /// Keep shadow values equal to an existing value of the same key.
    pub allow_duplicate_shadow_values: bool,
    /// Indented lines after an empty value become nested values of that key.
    pub allow_nested_values: bool,
    /// Indented lines after a key continue its value (Python `configparser` style).
    pub allow_python_multiline_values: bool,
    /// Inline comments need whitespace before the marker (`a#b` stays intact).
    pub space_before_inline_comment: bool,
    /// Treat `"…"` as a verbatim quote and turn `\"` into `"`.
    pub unescape_value_double_quotes: bool,
    /// Turn `\#` and `\;` into `#` and `;` in stored values.
    pub unescape_value_comment_symbols: bool,
    /// Keep surrounding `"…"`/`'…'` as part of the value.
    pub preserve_surrounded_quote: bool,
    /// Characters that separate a key from its value.
    pub key_value_delimiters: String,
    /// Separator between a parent section name and a child name.
    pub child_section_delimiter: Option<String>,
    /// Sections whose body is kept as raw text.
    pub unparseable_sections: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            loose: false,
            insensitive: false,
            insensitive_sections: false,
            insensitive_keys: false,
            ignore_continuation: false,
            ignore_inline_comment: false,
            skip_unrecognizable_lines: false,
            short_circuit: false,
            allow_boolean_keys: false,
            allow_shadows: false,
            allow_duplicate_shadow_values: false,
            allow_nested_values: false,
            allow_python_multiline_values: false,
            space_before_inline_comment: false,
            unescape_value_double_quotes: false,
            unescape_value_comment_symbols: false,
            preserve_surrounded_quote: false,
            key_value_delimiters: "=:".to_string(),
            child_section_delimiter: None,
            unparseable_sections: Vec::new(),
        }
    }
}

impl LoadOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }

    #[must_use]
    pub fn with_insensitive(mut self, insensitive: bool) -> Self {
        self.insensitive = insensitive;
        self
    }

    #[must_use]
    pub fn with_insensitive_sections(mut self, insensitive: bool) -> Self {
        self.insensitive_sections = insensitive;
        self
    }

    #[must_use]
    pub fn with_insensitive_keys(mut self, insensitive: bool) -> Self {
        self.insensitive_keys = insensitive;
        self
    }

    #[must_use]
    pub fn with_ignore_continuation(mut self, ignore: bool) -> Self {
        self.ignore_continuation = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_inline_comment(mut self, ignore: bool) -> Self {
        self.ignore_inline_comment = ignore;
        self
    }

    #[must_use]
    pub fn with_skip_unrecognizable_lines(mut self, skip: bool) -> Self {
        self.skip_unrecognizable_lines = skip;
        self
    }

    #[must_use]
    pub fn with_short_circuit(mut self, short_circuit: bool) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    #[must_use]
    pub fn with_allow_boolean_keys(mut self, allow: bool) -> Self {
        self.allow_boolean_keys = allow;
        self
    }

    #[must_use]
    pub fn with_allow_shadows(mut self, allow: bool) -> Self {
        self.allow_shadows = allow;
        self
    }

    #[must_use]
    pub fn with_allow_duplicate_shadow_values(mut self, allow: bool) -> Self {
        self.allow_duplicate_shadow_values = allow;
        self
    }

    #[must_use]
    pub fn with_allow_nested_values(mut self, allow: bool) -> Self {
        self.allow_nested_values = allow;
        self
    }

    #[must_use]
    pub fn with_allow_python_multiline_values(mut self, allow: bool) -> Self {
        self.allow_python_multiline_values = allow;
        self
    }

    #[must_use]
    pub fn with_space_before_inline_comment(mut self, required: bool) -> Self {
        self.space_before_inline_comment = required;
        self
    }

    #[must_use]
    pub fn with_unescape_value_double_quotes(mut self, unescape: bool) -> Self {
        self.unescape_value_double_quotes = unescape;
        self
    }

    #[must_use]
    pub fn with_unescape_value_comment_symbols(mut self, unescape: bool) -> Self {
        self.unescape_value_comment_symbols = unescape;
        self
    }

    #[must_use]
    pub fn with_preserve_surrounded_quote(mut self, preserve: bool) -> Self {
        self.preserve_surrounded_quote = preserve;
        self
    }

    /// Sets the characters that separate keys from values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::LoadOptions;
    ///
    /// let options = LoadOptions::new().with_key_value_delimiters("?!");
    /// assert_eq!(options.key_value_delimiters, "?!");
    /// ```
    #[must_use]
    pub fn with_key_value_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.key_value_delimiters = delimiters.into();
        self
    }

    #[must_use]
    pub fn with_child_section_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        self.child_section_delimiter = (!delimiter.is_empty()).then_some(delimiter);
        self
    }

    #[must_use]
    pub fn with_unparseable_sections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unparseable_sections = names.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn sections_insensitive(&self) -> bool {
        self.insensitive || self.insensitive_sections
    }

    pub(crate) fn keys_insensitive(&self) -> bool {
        self.insensitive || self.insensitive_keys
    }

    /// Returns `true` if `name` is configured as an unparseable section.
    pub(crate) fn is_unparseable(&self, name: &str) -> bool {
        self.unparseable_sections.iter().any(|candidate| {
            candidate == name
                || (self.sections_insensitive() && candidate.to_lowercase() == name.to_lowercase())
        })
    }
}

/// Output formatting for the encoder.
///
/// # Examples
///
/// ```rust
/// use ini_doc::{load, EncodeOptions};
///
/// let doc = load(b"[server]\nhost = localhost\nport = 8080".as_slice()).unwrap();
/// let text = doc.to_ini_string_with(&EncodeOptions::new().with_align(false).with_indent(2));
/// assert_eq!(text, "[server]\n  host = localhost\n  port = 8080\n\n");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeOptions {
    /// Spaces written before key lines of named sections.
    pub indent: usize,
    /// Pad key names to the widest key of their section.
    pub align: bool,
    /// Delimiter written between key and value.
    pub key_value_delimiter: char,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: 0,
            align: true,
            key_value_delimiter: '=',
        }
    }
}

impl EncodeOptions {
    /// Creates default options (aligned, no indentation, `=` delimiter).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: bool) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_key_value_delimiter(mut self, delimiter: char) -> Self {
        self.key_value_delimiter = delimiter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoadOptions::default();
        assert_eq!(options.key_value_delimiters, "=:");
        assert!(options.child_section_delimiter.is_none());
        assert!(!options.allow_shadows);

        let encode = EncodeOptions::default();
        assert!(encode.align);
        assert_eq!(encode.key_value_delimiter, '=');
    }

    #[test]
    fn test_unparseable_matching_follows_section_case() {
        let options = LoadOptions::new().with_unparseable_sections(["core_lesson"]);
        assert!(options.is_unparseable("core_lesson"));
        assert!(!options.is_unparseable("CORE_LESSON"));

        let options = options.with_insensitive_sections(true);
        assert!(options.is_unparseable("CORE_LESSON"));
    }

    #[test]
    fn test_empty_child_delimiter_disables_children() {
        let options = LoadOptions::new().with_child_section_delimiter("");
        assert!(options.child_section_delimiter.is_none());
    }
}
