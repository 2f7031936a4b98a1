//! INI encoding.
//!
//! The [`Encoder`] writes a [`Document`] back to text deterministically:
//! sections and keys in document order, shadow values as repeated lines,
//! comments above the entry they belong to and key names padded so the
//! delimiters of a section line up.
//!
//! Keys and values are quoted only when a plain rendering would not read back
//! to the same name or value:
//!
//! | Content                                          | Written as      |
//! |--------------------------------------------------|-----------------|
//! | key `-`, a delimiter, or a leading `"`, `` ` ``, `#`, `;`, `[` | `` `key` `` |
//! | such a key that also holds `` ` ``              | `"key"`         |
//! | such a key that holds both `` ` `` and `"`      | `"""key"""`     |
//! | single-line value with `` ` ``                  | `"""value"""`   |
//! | value with `#`/`;`, a trailing `\`, a leading `"` or surrounding quotes | `` `value` `` |
//! | value with leading or trailing whitespace       | `"value"`, or `` `value` `` if it holds `"` |
//! | multi-line value                                | `"""value"""`, or `` `value` `` when a line before the last holds `"""` |
//!
//! Some content has no form that reads back: names with surrounding
//! whitespace or line breaks, multi-line values whose earlier lines hold both
//! `"""` and `` ` ``, and so on. [`Encoder::finish`] reports the first of them
//! as [`Error::Unwritable`]; [`Encoder::into_inner`] writes them as best it can.

use crate::document::{Document, DEFAULT_SECTION};
use crate::key::Key;
use crate::section::Section;
use crate::{EncodeOptions, Error, LoadOptions, Result};

/// Writes documents as INI text into an in-memory buffer.
pub struct Encoder<'a> {
    output: String,
    load: &'a LoadOptions,
    options: &'a EncodeOptions,
    unwritable: Option<Error>,
}

impl<'a> Encoder<'a> {
    /// `load` decides which characters need quoting; `options` controls layout.
    #[must_use]
    pub fn new(load: &'a LoadOptions, options: &'a EncodeOptions) -> Self {
        Encoder {
            output: String::with_capacity(256),
            load,
            options,
            unwritable: None,
        }
    }

    /// Consumes the encoder and returns the text written so far.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    /// Like [`Encoder::into_inner`], but fails if anything written so far
    /// would not read back unchanged.
    pub fn finish(self) -> Result<String> {
        match self.unwritable {
            Some(err) => Err(err),
            None => Ok(self.output),
        }
    }

    fn reject(&mut self, kind: &'static str, content: &str) {
        if self.unwritable.is_none() {
            self.unwritable = Some(Error::Unwritable {
                kind,
                content: content.to_string(),
            });
        }
    }

    pub fn write_document(&mut self, doc: &Document) {
        let has_named = doc.sections().any(|section| section.name() != DEFAULT_SECTION);
        for section in doc.sections() {
            if section.name() == DEFAULT_SECTION && section.key_count() == 0 {
                continue;
            }
            self.write_section(section);
            if has_named {
                self.output.push('\n');
            }
        }
    }

    /// Writes one section block without the separating blank line.
    pub fn write_section(&mut self, section: &Section) {
        let default = section.name() == DEFAULT_SECTION;
        let indent = if default {
            String::new()
        } else {
            " ".repeat(self.options.indent)
        };

        self.write_comment(section.comment(), "");
        if !default {
            if section.name().contains(['\n', '\r']) {
                self.reject("section", section.name());
            }
            self.output.push('[');
            self.output.push_str(section.name());
            self.output.push_str("]\n");
        }

        if section.is_unparseable() {
            let body = section.body();
            if !body.is_empty() {
                self.output.push_str(body);
                self.output.push('\n');
            }
            return;
        }

        let names: Vec<String> = section.keys().map(|key| self.key_name(key)).collect();
        let width = if self.options.align {
            names.iter().map(|name| name.chars().count()).max().unwrap_or(0)
        } else {
            0
        };

        for (key, name) in section.keys().zip(&names) {
            self.write_comment(key.comment(), &indent);
            self.write_key(key, name, width, &indent);
        }
    }

    fn write_comment(&mut self, comment: &str, indent: &str) {
        for line in comment.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.output.push_str(indent);
            match line.strip_prefix(['#', ';']) {
                Some(text) => {
                    self.output.push_str(&line[..1]);
                    self.output.push(' ');
                    self.output.push_str(text.trim_start());
                }
                None => {
                    self.output.push_str("; ");
                    self.output.push_str(line);
                }
            }
            self.output.push('\n');
        }
    }

    fn write_key(&mut self, key: &Key, name: &str, width: usize, indent: &str) {
        if key.is_boolean() {
            self.output.push_str(indent);
            self.output.push_str(name);
            self.output.push('\n');
            return;
        }

        let padding = width.saturating_sub(name.chars().count());
        for value in key.values() {
            self.output.push_str(indent);
            self.output.push_str(name);
            self.output.extend(std::iter::repeat(' ').take(padding));
            self.output.push(' ');
            self.output.push(self.options.key_value_delimiter);
            self.output.push(' ');
            let quoted = self.quote_value(value);
            self.output.push_str(&quoted);
            self.output.push('\n');
        }

        for nested in key.nested_values() {
            self.output.push_str(indent);
            self.output.push_str("  ");
            self.output.push_str(nested);
            self.output.push('\n');
        }
    }

    fn is_delimiter(&self, c: char) -> bool {
        c == self.options.key_value_delimiter || self.load.key_value_delimiters.contains(c)
    }

    /// Key name as written, quotes included.
    fn key_name(&mut self, key: &Key) -> String {
        let name = key.name();
        if key.is_auto_increment() {
            return "-".to_string();
        }
        if name.trim() != name || name.contains(['\n', '\r']) {
            self.reject("key", name);
            return name.to_string();
        }

        let plain = name != "-"
            && !name.starts_with(['"', '`', '#', ';', '['])
            && !name.chars().any(|c| self.is_delimiter(c));
        if plain {
            name.to_string()
        } else if !name.contains('`') {
            format!("`{name}`")
        } else if !name.contains('"') {
            format!("\"{name}\"")
        } else if !name.contains("\"\"\"") && !name.ends_with('"') {
            format!("\"\"\"{name}\"\"\"")
        } else {
            self.reject("key", name);
            format!("`{name}`")
        }
    }

    fn quote_value(&mut self, value: &str) -> String {
        // Every line but the last must be free of the closing quote, and a
        // `"""` opener needs text after it on the first line.
        if let Some((head, _)) = value.rsplit_once('\n') {
            if !value.contains("\r\n") {
                if !value.starts_with('\n') && !head.contains("\"\"\"") {
                    return format!("\"\"\"{value}\"\"\"");
                }
                if !head.contains('`') {
                    return format!("`{value}`");
                }
            }
            self.reject("value", value);
            return format!("\"\"\"{value}\"\"\"");
        }

        let comment_chars =
            !self.load.ignore_inline_comment || self.load.unescape_value_comment_symbols;
        if value.contains('`') {
            format!("\"\"\"{value}\"\"\"")
        } else if (comment_chars && value.contains(['#', ';']))
            || value.ends_with('\\')
            || value.starts_with('"')
            || is_quoted(value)
        {
            format!("`{value}`")
        } else if value.trim() != value {
            if value.contains('"') {
                format!("`{value}`")
            } else {
                format!("\"{value}\"")
            }
        } else {
            value.to_string()
        }
    }
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}
