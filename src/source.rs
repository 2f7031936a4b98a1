//! Sources and the load pipeline.
//!
//! A [`Document`] remembers the sources it was loaded from so it can be
//! [reloaded](Document::reload). Sources are parsed in order into the same
//! document: sections accumulate and later keys overwrite earlier ones (or add
//! shadow values when shadows are enabled).
//!
//! - [`LoadOptions::loose`] skips file sources that do not exist.
//! - [`LoadOptions::short_circuit`] stops after the first source that loads.
//!
//! Malformed content is always fatal, whatever the options.
//!
//! ## Examples
//!
//! ```rust
//! use ini_doc::{load_sources, LoadOptions, Source};
//!
//! let options = LoadOptions::new().with_loose(true);
//! let doc = load_sources(
//!     options,
//!     [
//!         Source::from("does/not/exist.ini"),
//!         Source::from(b"name = first".as_slice()),
//!         Source::from(b"name = second".as_slice()),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(doc.key("", "name").unwrap().value(), "second");
//! ```

use crate::document::Document;
use crate::parser::parse_into;
use crate::{Error, LoadOptions, Result};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where a document's text comes from.
///
/// Strings and paths convert to [`Source::Path`]; byte slices and vectors
/// convert to [`Source::Bytes`]. Readers are drained once with
/// [`Source::from_reader`] and kept as bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl Source {
    /// Reads `reader` to the end and keeps its contents.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::io(&e.to_string()))?;
        Ok(Source::Bytes(bytes))
    }

    /// Returns the raw contents of the source.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Source::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Source::Path(path) => fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| Error::from_io(&e, &path.display().to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Source {
    fn from(bytes: &[u8; N]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl Document {
    /// Sources this document was loaded from, in load order.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Adds sources and reloads the whole document from all of them.
    ///
    /// In-memory changes not present in any source are discarded.
    pub fn append<I, S>(&mut self, sources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self.reload()
    }

    /// Clears the document and parses every source again.
    ///
    /// On error the document keeps whatever was parsed before the failure.
    pub fn reload(&mut self) -> Result<()> {
        self.reset();
        let sources = std::mem::take(&mut self.sources);
        let result = self.parse_sources(&sources);
        self.sources = sources;
        result
    }

    fn parse_sources(&mut self, sources: &[Source]) -> Result<()> {
        for source in sources {
            let bytes = match source.read() {
                Ok(bytes) => bytes,
                Err(err) if err.is_not_found() && self.options().loose => {
                    tracing::debug!("Skipping missing source {source}");
                    continue;
                }
                Err(err) => return Err(err),
            };
            parse_into(self, &bytes)?;
            tracing::debug!("Loaded source {source}");
            if self.options().short_circuit {
                tracing::debug!("Short-circuit: ignoring sources after {source}");
                break;
            }
        }
        Ok(())
    }
}

/// Loads sources in order into one document.
pub fn load_sources<I, S>(options: LoadOptions, sources: I) -> Result<Document>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    let mut doc = Document::new(options);
    doc.append(sources)?;
    Ok(doc)
}

/// Loads a single source with default options.
///
/// # Examples
///
/// ```rust
/// use ini_doc::load;
///
/// let doc = load(b"[author]\nE-MAIL = u@gogs.io".as_slice()).unwrap();
/// assert_eq!(doc.value("author", "E-MAIL").unwrap(), "u@gogs.io");
/// ```
pub fn load(source: impl Into<Source>) -> Result<Document> {
    load_sources(LoadOptions::default(), [source.into()])
}

/// Loads a single source, treating a missing file as an empty document.
pub fn loose_load(source: impl Into<Source>) -> Result<Document> {
    load_sources(LoadOptions::new().with_loose(true), [source.into()])
}

/// Loads a single source with case-insensitive section and key names.
pub fn insensitive_load(source: impl Into<Source>) -> Result<Document> {
    load_sources(LoadOptions::new().with_insensitive(true), [source.into()])
}

/// Loads a single source with shadow keys enabled.
pub fn shadow_load(source: impl Into<Source>) -> Result<Document> {
    load_sources(LoadOptions::new().with_allow_shadows(true), [source.into()])
}

/// An empty document with default options.
#[must_use]
pub fn empty() -> Document {
    Document::default()
}
