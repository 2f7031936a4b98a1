//! Error types for INI parsing, document access and struct mapping.
//!
//! ## Error Categories
//!
//! - **Structural errors**: malformed section headers, missing key/value
//!   delimiters and unterminated quotes. They always carry the 1-based line
//!   number and the offending line content, and abort the whole load.
//! - **Source errors**: a file source that does not exist ([`Error::SourceNotFound`],
//!   skippable with [`LoadOptions::loose`](crate::LoadOptions)) or cannot be read.
//! - **Lookup errors**: missing sections or keys, duplicate keys.
//! - **Conversion errors**: a value that does not parse as the requested type.
//!   These are only ever returned by the typed accessor that was called.
//! - **Mapping errors**: raised by the serde layer in [`de`](crate::de) and [`ser`](crate::ser).
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::{load, Error};
//!
//! let err = load(b"foo".as_slice()).unwrap_err();
//! assert!(matches!(err, Error::DelimiterNotFound { line: 1, .. }));
//! assert_eq!(err.to_string(), "key-value delimiter not found: foo");
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error while reading a source or writing output
    #[error("IO error: {0}")]
    Io(String),

    /// A file source does not exist
    #[error("source not found: {path}")]
    SourceNotFound { path: String },

    /// Input is not valid UTF-8 (or UTF-16 after a UTF-16 BOM)
    #[error("invalid {encoding} input: {msg}")]
    Encoding { encoding: &'static str, msg: String },

    /// Section header without a closing `]`
    #[error("unclosed section at line {line}: {content}")]
    UnclosedSection { line: usize, content: String },

    /// Section header with nothing between the brackets
    #[error("empty section name at line {line}")]
    EmptySectionName { line: usize },

    /// Key line without any of the configured key/value delimiters
    #[error("key-value delimiter not found: {content}")]
    DelimiterNotFound { line: usize, content: String },

    /// Key line whose key name is empty
    #[error("empty key name at line {line}: {content}")]
    EmptyKeyName { line: usize, content: String },

    /// Quoted key or value without its closing quote
    #[error("missing closing quote {quote} at line {line}: {content}")]
    UnclosedQuote {
        line: usize,
        quote: &'static str,
        content: String,
    },

    /// Section or key created through the API with an empty name
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// Name or value that no quoting form can write so that it reads back
    #[error("cannot write {kind} {content:?} so that it reads back unchanged")]
    Unwritable { kind: &'static str, content: String },

    /// Lookup of a section that does not exist
    #[error("section {0:?} does not exist")]
    SectionNotFound(String),

    /// Lookup of a key that does not exist in the section or its parents
    #[error("key {key:?} does not exist in section {section:?}")]
    KeyNotFound { section: String, key: String },

    /// Creation of a key that already exists while shadows are disabled
    #[error("key {key:?} already exists in section {section:?}")]
    DuplicateKey { section: String, key: String },

    /// Shadow values cannot be attached to this key
    #[error("cannot add shadow value to key {0:?}")]
    InvalidShadow(String),

    /// A value could not be converted to the requested type
    #[error("cannot parse {value:?} as {target}")]
    Conversion { value: String, target: &'static str },

    /// Struct mapping failed for a specific field
    #[error("error mapping field {field:?}: {msg}")]
    Mapping { field: String, msg: String },

    /// Unsupported type for struct mapping
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a conversion error for a value that does not parse as `target`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini_doc::Error;
    ///
    /// let err = Error::conversion("abc", "integer");
    /// assert_eq!(err.to_string(), "cannot parse \"abc\" as integer");
    /// ```
    pub fn conversion(value: &str, target: &'static str) -> Self {
        Error::Conversion {
            value: value.to_string(),
            target,
        }
    }

    /// Creates a lookup error for a missing key.
    pub fn key_not_found(section: &str, key: &str) -> Self {
        Error::KeyNotFound {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Wraps an error raised while mapping `field`.
    pub fn mapping(field: &str, err: impl fmt::Display) -> Self {
        Error::Mapping {
            field: field.to_string(),
            msg: err.to_string(),
        }
    }

    /// Creates an unsupported type error for values the mapping layer cannot represent.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the 1-based line of a structural parse error.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::UnclosedSection { line, .. }
            | Error::EmptySectionName { line }
            | Error::DelimiterNotFound { line, .. }
            | Error::EmptyKeyName { line, .. }
            | Error::UnclosedQuote { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Returns `true` for errors a lenient load is allowed to skip.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SourceNotFound { .. })
    }

    pub(crate) fn from_io(err: &io::Error, path: &str) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Error::SourceNotFound {
                path: path.to_string(),
            }
        } else {
            Error::Io(format!("{path}: {err}"))
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors_carry_line() {
        let err = Error::UnclosedSection {
            line: 3,
            content: "[name".to_string(),
        };
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.to_string(), "unclosed section at line 3: [name");
        assert_eq!(Error::conversion("x", "bool").line(), None);
        assert_eq!(Error::EmptyName("key").line(), None);
        assert_eq!(Error::EmptyName("key").to_string(), "key name must not be empty");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(Error::from_io(&err, "404.ini").is_not_found());

        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from_io(&err, "locked.ini");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("locked.ini"));
    }
}
