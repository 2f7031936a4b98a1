//! INI dialect accepted by this library.
//!
//! This module holds documentation only.
//!
//! # Lines
//!
//! Input is decoded (UTF-8, or UTF-16 with a byte order mark; a UTF-8 BOM is
//! dropped) and split on `\n`. A trailing `\r` is removed from every line.
//! Each line is trimmed on the left before it is classified:
//!
//! | Line                 | Meaning |
//! |----------------------|---------|
//! | empty                | skipped |
//! | starts with `#`, `;` | comment, attached to the next section or key |
//! | starts with `[`      | section header |
//! | anything else        | key line |
//!
//! # Sections
//!
//! ```text
//! ; attached to [server]
//! [server] # trailing comment, also attached
//! host = localhost
//! ```
//!
//! - The header ends at the last `]` on the line; a missing `]` is an error.
//! - The name is trimmed and must not be empty.
//! - Keys before the first header belong to the default section `""`.
//! - Reopening a section adds to it.
//! - With a child delimiter (for example `.`), `[a.b.c]` inherits keys of
//!   `[a.b]` and `[a]`.
//! - Sections listed as unparseable keep their lines as a raw body.
//!
//! # Keys
//!
//! A key line is `name <delimiter> value`, split on the first of the
//! configured delimiters (`=` and `:` by default).
//!
//! | Form                         | Notes |
//! |------------------------------|-------|
//! | `name = value`               | name and value trimmed |
//! | `"na=me" = value`            | quoted name may contain delimiters |
//! | `` `name` = value ``         | backtick quoted name |
//! | `"""name""" = value`         | triple quoted name |
//! | `- = value`                  | auto-increment name `#1`, `#2`, ... (unquoted `-` only) |
//! | `name`                       | boolean key, when enabled |
//!
//! # Values
//!
//! | Form                  | Result |
//! |-----------------------|--------|
//! | `plain ; comment`     | `plain`, comment attached to the key |
//! | `a \# b`              | `a \# b`, escaped marker starts no comment |
//! | `" padded "`          | ` padded `, surrounding quotes removed |
//! | `` `raw # text` ``    | `raw # text` |
//! | `"""` ... `"""`       | every line up to the closing quotes, verbatim |
//! | `one \` + `two`       | `one two` (continuation lines are joined) |
//! | `%(other)s`           | expanded on read with the value of `other` |
//!
//! Python style multi-line values continue on indented lines when enabled:
//!
//! ```text
//! [section]
//! value = first line
//!     second line
//!
//! ```
//!
//! ```rust
//! use ini_doc::{load_sources, LoadOptions};
//!
//! let options = LoadOptions::new().with_allow_python_multiline_values(true);
//! let doc = load_sources(options, [b"value = first\n  second\nnext = 1".as_slice()]).unwrap();
//! assert_eq!(doc.value("", "value").unwrap(), "first\nsecond");
//! ```
//!
//! # Encoding
//!
//! Documents are written section by section in document order. See
//! [`Encoder`](crate::Encoder) for the quoting rules that keep every name and
//! value readable back unchanged.
