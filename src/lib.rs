//! # ini_doc
//!
//! A permissive INI parser with an ordered, mutable document model.
//!
//! ## What it does
//!
//! - **Parses** INI text from files, byte buffers or readers, one or several
//!   sources at a time, in UTF-8 or UTF-16
//! - **Keeps structure**: sections and keys stay in file order, comments stay
//!   attached to what they describe
//! - **Resolves values**: typed conversions, `%(name)s` references, shadow
//!   values, lists and parent section inheritance
//! - **Writes back** deterministic INI text that parses to the same document
//! - **Maps structs** in both directions through serde
//!
//! ## Quick Start
//!
//! ```rust
//! use ini_doc::load;
//!
//! let doc = load(
//!     b"app_mode = development\n\n[paths]\ndata = /home/git/grafana\n\n[server]\nhttp_port = 9999"
//!         .as_slice(),
//! )
//! .unwrap();
//!
//! assert_eq!(doc.value("", "app_mode").unwrap(), "development");
//! assert_eq!(doc.key("server", "http_port").unwrap().int().unwrap(), 9999);
//! assert_eq!(doc.section_strings(), vec!["", "paths", "server"]);
//! ```
//!
//! ### Editing and writing
//!
//! ```rust
//! use ini_doc::empty;
//!
//! let mut doc = empty();
//! let server = doc.new_section("server").unwrap();
//! server.new_key("host", "localhost").unwrap();
//! server.new_key("port", "80").unwrap().set_comment("# public port");
//!
//! assert_eq!(
//!     doc.to_ini_string(),
//!     "[server]\nhost = localhost\n# public port\nport = 80\n\n"
//! );
//! ```
//!
//! ### Struct mapping
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let server = Server { host: "localhost".into(), port: 8080 };
//! let text = ini_doc::to_string(&server).unwrap();
//! let back: Server = ini_doc::from_str(&text).unwrap();
//! assert_eq!(server, back);
//! ```
//!
//! ## Load options
//!
//! Parsing behaviour is controlled by [`LoadOptions`]: case folding, boolean
//! keys, shadow keys, continuation lines, inline comments, Python style
//! multi-line values, custom delimiters and raw (unparseable) sections.
//!
//! ## Format
//!
//! See the [`format`] module for the accepted dialect.

pub mod de;
pub mod document;
pub mod encoder;
pub mod error;
pub mod format;
pub mod key;
pub mod map;
pub mod options;
mod parser;
pub mod persist;
pub mod section;
pub mod ser;
pub mod source;
pub mod value;

pub use de::{SectionDeserializer, ValueDeserializer};
pub use document::{
    all_caps_underscore, ancestor_names, title_underscore, Document, NameMapper, ValueMapper,
    DEFAULT_SECTION,
};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use key::Key;
pub use map::NameMap;
pub use options::{EncodeOptions, LoadOptions};
pub use persist::ApplyOnce;
pub use section::Section;
pub use ser::{to_field, Field, FieldSerializer, Scalar};
pub use source::{empty, insensitive_load, load, load_sources, loose_load, shadow_load, Source};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to an INI string.
///
/// Scalar fields become keys of the default section, struct and map fields
/// become sections.
///
/// # Examples
///
/// ```rust
/// use ini_doc::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a struct or map, holds shapes INI
/// cannot express (nested lists, enum variants with data), or holds a name or
/// value that would not read back unchanged.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to an INI string with custom layout.
///
/// # Errors
///
/// Same as [`to_string`].
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut doc = Document::default();
    doc.reflect_from(value)?;
    doc.encode_with(options)
}

/// Serialize any `T: Serialize` to a writer in INI format.
///
/// # Examples
///
/// ```rust
/// use ini_doc::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, b"x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or the writer fails.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut doc = Document::default();
    doc.reflect_from(value)?;
    doc.write_to(writer)?;
    Ok(())
}

/// Deserialize an instance of `T` from INI text, mapping the default section.
///
/// # Examples
///
/// ```rust
/// use ini_doc::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!((point.x, point.y), (1, 2));
/// ```
///
/// # Errors
///
/// Returns an error if the text is malformed or a value does not convert to
/// its field's type.
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    load(text.as_bytes())?.map_to()
}

/// Deserialize an instance of `T` from a reader of INI text.
///
/// # Errors
///
/// Returns an error if reading fails, or for the reasons [`from_str`] does.
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    load(Source::from_reader(reader)?)?.map_to()
}
