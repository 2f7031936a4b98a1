//! INI decoding.
//!
//! [`parse_into`] decodes one source's bytes and merges it into a [`Document`].
//! The pass is line oriented: every physical line is classified in this order.
//!
//! 1. body line of an unparseable section (anything not starting a new header)
//! 2. nested value of the previous key, when enabled
//! 3. blank line (skipped)
//! 4. comment line, `#` or `;`
//! 5. section header
//! 6. key line: key name, delimiter, value
//!
//! Values may consume further physical lines: verbatim quotes, continuation
//! lines and Python-style indented lines all read ahead.
//!
//! Comment lines accumulate until the next section header or key, which takes
//! them as its comment. A trailing comment with nothing after it is dropped.

use crate::document::{Document, DEFAULT_SECTION};
use crate::{Error, LoadOptions, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static PYTHON_MULTILINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\t\f ]+)(.*)").expect("python multiline pattern is valid"));

/// Decodes `bytes` and merges the result into `doc`.
pub(crate) fn parse_into(doc: &mut Document, bytes: &[u8]) -> Result<()> {
    let text = decode(bytes)?;
    let mut parser = Parser::new(doc.options().clone(), &text);
    parser.run(doc)
}

/// Strips a byte-order mark and decodes the input to text.
///
/// UTF-16 input is recognized only by its BOM; anything else must be UTF-8.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, "UTF-16LE", u16::from_le_bytes).map(Cow::Owned),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, "UTF-16BE", u16::from_be_bytes).map(Cow::Owned),
        _ => utf8(bytes),
    }
}

fn utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| Error::Encoding {
            encoding: "UTF-8",
            msg: e.to_string(),
        })
}

fn decode_utf16(bytes: &[u8], encoding: &'static str, unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding {
            encoding,
            msg: format!("odd byte length {}", bytes.len()),
        });
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| Error::Encoding {
        encoding,
        msg: e.to_string(),
    })
}

/// A physical line without its line terminator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.split('\n')
        .enumerate()
        .map(|(index, raw)| Line {
            number: index + 1,
            text: raw.strip_suffix('\r').unwrap_or(raw),
        })
        .collect()
}

struct Parser<'a> {
    options: LoadOptions,
    lines: Vec<Line<'a>>,
    position: usize,
    comment: String,
}

impl<'a> Parser<'a> {
    fn new(options: LoadOptions, text: &'a str) -> Self {
        Parser {
            options,
            lines: split_lines(text),
            position: 0,
            comment: String::new(),
        }
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        let line = self.lines.get(self.position).copied();
        if line.is_some() {
            self.position += 1;
        }
        line
    }

    fn peek_line(&self) -> Option<Line<'a>> {
        self.lines.get(self.position).copied()
    }

    fn push_comment(&mut self, comment: &str) {
        if !self.comment.is_empty() {
            self.comment.push('\n');
        }
        self.comment.push_str(comment);
    }

    /// Records the comment part of text that follows a closing bracket or quote.
    fn push_trailing_comment(&mut self, rest: &str) {
        if let Some(index) = rest.find(['#', ';']) {
            self.push_comment(rest[index..].trim_end());
        }
    }

    fn take_comment(&mut self) -> String {
        let comment = std::mem::take(&mut self.comment);
        comment.trim().to_string()
    }

    fn run(&mut self, doc: &mut Document) -> Result<()> {
        let mut section = DEFAULT_SECTION.to_string();
        let mut unparseable = false;
        let mut counter = 1;
        let mut nested_target: Option<String> = None;

        while let Some(line) = self.next_line() {
            let trimmed = line.text.trim_start();

            if unparseable && !trimmed.starts_with('[') {
                doc.section_mut(&section).push_body_line(line.text);
                continue;
            }

            if let Some(key) = &nested_target {
                if line.text.starts_with([' ', '\t']) && !trimmed.is_empty() {
                    doc.section_mut(&section)
                        .key_mut(key)?
                        .add_nested_value(trimmed.trim_end());
                    continue;
                }
            }

            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with(['#', ';']) {
                self.push_comment(trimmed.trim_end());
                continue;
            }

            if trimmed.starts_with('[') {
                let name = self.read_section_header(line.number, trimmed)?;
                let comment = self.take_comment();
                let target = doc.section_mut(&name);
                if !comment.is_empty() {
                    target.set_comment(comment);
                }
                counter = target.keys().filter(|key| key.is_auto_increment()).count() + 1;
                unparseable = self.options.is_unparseable(&name);
                section = target.name().to_string();
                nested_target = None;
                continue;
            }

            let (name, offset, quoted) = match self.read_key_name(line.number, trimmed) {
                Ok(found) => found,
                Err(Error::DelimiterNotFound { .. }) if self.options.allow_boolean_keys => {
                    let name = self.read_value(line.number, trimmed)?;
                    if name.is_empty() {
                        return Err(Error::EmptyKeyName {
                            line: line.number,
                            content: trimmed.to_string(),
                        });
                    }
                    let comment = self.take_comment();
                    let key = doc.section_mut(&section).new_boolean_key(&name)?;
                    if !comment.is_empty() {
                        key.set_comment(comment);
                    }
                    nested_target = None;
                    continue;
                }
                Err(Error::DelimiterNotFound { .. } | Error::EmptyKeyName { .. })
                    if self.options.skip_unrecognizable_lines =>
                {
                    continue
                }
                Err(err) => return Err(err),
            };

            let (name, auto_increment) = if name == "-" && !quoted {
                let name = format!("#{counter}");
                counter += 1;
                (name, true)
            } else {
                (name, false)
            };

            let value = self.read_value(line.number, &trimmed[offset..])?;
            let empty = value.is_empty();
            let comment = self.take_comment();
            let key = doc.section_mut(&section).add_parsed_key(&name, value)?;
            if auto_increment {
                key.mark_auto_increment();
            }
            if !comment.is_empty() {
                key.set_comment(comment);
            }
            nested_target = (empty && self.options.allow_nested_values && !auto_increment)
                .then(|| key.name().to_string());
        }
        Ok(())
    }

    fn read_section_header(&mut self, number: usize, line: &str) -> Result<String> {
        let Some(close) = line.rfind(']') else {
            return Err(Error::UnclosedSection {
                line: number,
                content: line.trim_end().to_string(),
            });
        };
        let name = line[1..close].trim();
        if name.is_empty() {
            return Err(Error::EmptySectionName { line: number });
        }
        self.push_trailing_comment(&line[close + 1..]);
        Ok(name.to_string())
    }

    /// Returns the key name, the byte offset just past its delimiter and
    /// whether the name was quoted.
    fn read_key_name(&self, number: usize, line: &str) -> Result<(String, usize, bool)> {
        let delimiters = self.options.key_value_delimiters.as_str();
        let quote = if line.len() > 6 && line.starts_with("\"\"\"") {
            Some("\"\"\"")
        } else if line.starts_with('"') {
            Some("\"")
        } else if line.starts_with('`') {
            Some("`")
        } else {
            None
        };

        let (name, start) = match quote {
            Some(quote) => {
                let open = quote.len();
                let Some(close) = line[open..].find(quote) else {
                    return Err(Error::UnclosedQuote {
                        line: number,
                        quote,
                        content: line.to_string(),
                    });
                };
                let close = open + close;
                (line[open..close].trim(), close + quote.len())
            }
            None => ("", 0),
        };

        let Some((index, delimiter)) = find_delimiter(&line[start..], delimiters) else {
            return Err(Error::DelimiterNotFound {
                line: number,
                content: line.trim_end().to_string(),
            });
        };
        let index = start + index;
        let name = if quote.is_some() {
            name
        } else {
            line[..index].trim()
        };
        if name.is_empty() {
            return Err(Error::EmptyKeyName {
                line: number,
                content: line.trim_end().to_string(),
            });
        }
        Ok((name.to_string(), index + delimiter.len_utf8(), quote.is_some()))
    }

    fn verbatim_quote(&self, value: &str) -> Option<&'static str> {
        if value.len() > 3 && value.starts_with("\"\"\"") {
            Some("\"\"\"")
        } else if value.starts_with('`') {
            Some("`")
        } else if self.options.unescape_value_double_quotes && value.starts_with('"') {
            Some("\"")
        } else {
            None
        }
    }

    /// Reads a value starting at `input`, consuming follow-up lines as needed.
    fn read_value(&mut self, number: usize, input: &str) -> Result<String> {
        let value = input.trim_start();
        if value.is_empty() {
            if self.options.allow_python_multiline_values {
                return Ok(self.read_python_multiline(number, String::new()));
            }
            return Ok(String::new());
        }

        if let Some(quote) = self.verbatim_quote(value) {
            return self.read_quoted(number, value, quote);
        }

        let mut value = value.trim_end().to_string();
        if value.ends_with('\\') {
            if !self.options.ignore_continuation {
                value.pop();
                return Ok(self.read_continuation(value));
            }
            self.join_literal_continuation(&mut value);
        }

        if !self.options.ignore_inline_comment {
            if let Some(index) =
                find_inline_comment(&value, self.options.space_before_inline_comment)
            {
                self.push_comment(&value[index..]);
                value.truncate(index);
                value.truncate(value.trim_end().len());
            }
        }

        if !self.options.preserve_surrounded_quote
            && (has_surrounded_quote(&value, '\'') || has_surrounded_quote(&value, '"'))
        {
            value = value[1..value.len() - 1].to_string();
        } else if self.options.unescape_value_comment_symbols {
            value = value.replace("\\;", ";").replace("\\#", "#");
        }

        if self.options.allow_python_multiline_values {
            value = self.read_python_multiline(number, value);
        }
        Ok(value)
    }

    /// Reads a `"""`, `` ` `` or `"` quoted value, across lines if it is not
    /// closed on the first one.
    fn read_quoted(&mut self, number: usize, value: &str, quote: &'static str) -> Result<String> {
        let body = &value[quote.len()..];
        let mut text = match body.rfind(quote) {
            Some(end) => {
                self.push_trailing_comment(&body[end + quote.len()..]);
                body[..end].to_string()
            }
            None => {
                let mut text = body.to_string();
                loop {
                    let Some(next) = self.next_line() else {
                        return Err(Error::UnclosedQuote {
                            line: number,
                            quote,
                            content: value.trim_end().to_string(),
                        });
                    };
                    text.push('\n');
                    if let Some(end) = next.text.rfind(quote) {
                        text.push_str(&next.text[..end]);
                        self.push_trailing_comment(&next.text[end + quote.len()..]);
                        break;
                    }
                    text.push_str(next.text);
                }
                text
            }
        };
        if quote == "\"" {
            text = text.replace("\\\"", "\"");
        }
        Ok(text)
    }

    /// Appends trimmed lines while the value keeps ending in `\`.
    fn read_continuation(&mut self, mut value: String) -> String {
        while let Some(next) = self.next_line() {
            let next = next.text.trim();
            if next.is_empty() {
                break;
            }
            value.push_str(next);
            if !value.ends_with('\\') {
                break;
            }
            value.pop();
        }
        value
    }

    /// Keeps the trailing `\` and glues the next trimmed line onto the value.
    fn join_literal_continuation(&mut self, value: &mut String) {
        while value.ends_with('\\') {
            let Some(next) = self.peek_line() else {
                break;
            };
            let next = next.text.trim();
            if next.is_empty() {
                break;
            }
            self.position += 1;
            value.push_str(next);
        }
    }

    /// Appends following indented lines, newline-joined.
    ///
    /// The first indented line fixes the indent width; a shallower, unindented
    /// or empty line ends the value.
    fn read_python_multiline(&mut self, number: usize, mut value: String) -> String {
        let mut indent = 0;
        while let Some(next) = self.peek_line() {
            let Some(captures) = PYTHON_MULTILINE.captures(next.text) else {
                break;
            };
            let leading = captures.get(1).map_or("", |m| m.as_str());
            let rest = captures.get(2).map_or("", |m| m.as_str());
            if indent == 0 {
                indent = leading.len();
                tracing::trace!(line = number, indent, "reading python multiline value");
            }
            if leading.len() < indent {
                break;
            }
            value.push('\n');
            value.push_str(&leading[indent..]);
            value.push_str(rest);
            self.position += 1;
        }
        value
    }
}

/// Finds the first delimiter character not preceded by `\`.
fn find_delimiter(line: &str, delimiters: &str) -> Option<(usize, char)> {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if !escaped && delimiters.contains(c) {
            return Some((index, c));
        }
        escaped = c == '\\' && !escaped;
    }
    None
}

/// Byte offset where an inline comment starts.
///
/// Escaped markers never start a comment. With `space_before`, the marker must
/// follow whitespace.
fn find_inline_comment(value: &str, space_before: bool) -> Option<usize> {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().find_map(|(index, &b)| {
        if b != b'#' && b != b';' {
            return None;
        }
        let previous = index.checked_sub(1).map(|i| bytes[i]);
        if previous == Some(b'\\') {
            return None;
        }
        if space_before && !previous.is_some_and(|p| p.is_ascii_whitespace()) {
            return None;
        }
        Some(index)
    })
}

fn has_surrounded_quote(value: &str, quote: char) -> bool {
    value.len() >= 2
        && value.starts_with(quote)
        && value.ends_with(quote)
        && !value[1..value.len() - 1].contains(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(options: LoadOptions, text: &str) -> Result<Document> {
        let mut doc = Document::new(options);
        parse_into(&mut doc, text.as_bytes())?;
        Ok(doc)
    }

    fn value(doc: &Document, section: &str, key: &str) -> String {
        doc.section(section).unwrap().key(key).unwrap().value().to_string()
    }

    #[test]
    fn test_decode_boms() {
        assert_eq!(decode(b"\xEF\xBB\xBFa=1").unwrap(), "a=1");

        let le: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("a=1".encode_utf16().flat_map(u16::to_le_bytes))
            .collect();
        assert_eq!(decode(&le).unwrap(), "a=1");

        let be: Vec<u8> = [0xFE, 0xFF]
            .into_iter()
            .chain("a=é".encode_utf16().flat_map(u16::to_be_bytes))
            .collect();
        assert_eq!(decode(&be).unwrap(), "a=é");

        assert!(matches!(decode(b"\xFF\xFEa"), Err(Error::Encoding { encoding: "UTF-16LE", .. })));
        assert!(matches!(decode(b"a=\xC3"), Err(Error::Encoding { encoding: "UTF-8", .. })));
    }

    #[test]
    fn test_split_lines_strips_crlf() {
        let lines = split_lines("a\r\nb\n\nc\n");
        let texts: Vec<_> = lines.iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["a", "b", "", "c"]);
        assert_eq!(lines[3].number, 4);
    }

    #[test]
    fn test_find_delimiter_skips_escaped() {
        assert_eq!(find_delimiter(r"a\=b=c", "="), Some((4, '=')));
        assert_eq!(find_delimiter("a:b=c", "=:"), Some((1, ':')));
        assert_eq!(find_delimiter("abc", "=:"), None);
    }

    #[test]
    fn test_find_inline_comment() {
        assert_eq!(find_inline_comment("value ;c", false), Some(6));
        assert_eq!(find_inline_comment(r"a\;b", false), None);
        assert_eq!(find_inline_comment("a#b #c", true), Some(4));
        assert_eq!(find_inline_comment("#c", true), None);
    }

    #[test]
    fn test_section_header_errors() {
        let err = parse(LoadOptions::default(), "ok = 1\n[broken").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(matches!(err, Error::UnclosedSection { .. }));
        assert!(matches!(
            parse(LoadOptions::default(), "[ ]"),
            Err(Error::EmptySectionName { line: 1 })
        ));
    }

    #[test]
    fn test_section_header_ends_at_last_bracket() {
        let doc = parse(LoadOptions::default(), "[a]b] ; note\nk = v").unwrap();
        assert_eq!(doc.value("a]b", "k").unwrap(), "v");
        assert_eq!(doc.section("a]b").unwrap().comment(), "; note");
    }

    #[test]
    fn test_section_comment_includes_trailing_text() {
        let doc = parse(LoadOptions::default(), "# about\n[s] ; inline\nk = v").unwrap();
        assert_eq!(doc.section("s").unwrap().comment(), "# about\n; inline");
    }

    #[test]
    fn test_bad_keys() {
        let options = LoadOptions::default;
        assert!(matches!(parse(options(), "\"\"\"name"), Err(Error::UnclosedQuote { .. })));
        assert!(matches!(parse(options(), "\"\"\"name\"\"\""), Err(Error::DelimiterNotFound { .. })));
        assert!(matches!(parse(options(), "\"\"=1"), Err(Error::EmptyKeyName { .. })));
        assert!(matches!(parse(options(), "="), Err(Error::EmptyKeyName { .. })));
        assert!(matches!(parse(options(), "name"), Err(Error::DelimiterNotFound { .. })));
        assert!(matches!(parse(options(), "name=\"\"\"Unknwon"), Err(Error::UnclosedQuote { .. })));
    }

    #[test]
    fn test_quoted_key_names() {
        let doc = parse(LoadOptions::default(), "\"a=b\" = 1\n`c:d` : 2\n\"\"\"e\"f\"\"\" = 3").unwrap();
        assert_eq!(value(&doc, "", "a=b"), "1");
        assert_eq!(value(&doc, "", "c:d"), "2");
        assert_eq!(value(&doc, "", "e\"f"), "3");
    }

    #[test]
    fn test_verbatim_multiline_value() {
        let doc = parse(
            LoadOptions::default(),
            "BIO = \"\"\"Gopher.\nCoding addict.\nGood man.\n\"\"\"  # Succeeding comment",
        )
        .unwrap();
        let key = doc.section("").unwrap().key("BIO").unwrap();
        assert_eq!(key.value(), "Gopher.\nCoding addict.\nGood man.\n");
        assert_eq!(key.comment(), "# Succeeding comment");
    }

    #[test]
    fn test_continuation_lines() {
        let doc = parse(LoadOptions::default(), "key1 = a\\b\\\nkey2=c\\d\\\n").unwrap();
        assert_eq!(value(&doc, "", "key1"), "a\\bkey2=c\\d");
        assert!(!doc.section("").unwrap().has_key("key2"));

        let doc = parse(LoadOptions::default(), "k = one \\\n  two\n\nnext = 1").unwrap();
        assert_eq!(value(&doc, "", "k"), "one two");
        assert_eq!(value(&doc, "", "next"), "1");
    }

    #[test]
    fn test_surrounding_quotes() {
        let doc = parse(LoadOptions::default(), "a = \"x y\"\nb = 'z'\nc = \"x\"y\"").unwrap();
        assert_eq!(value(&doc, "", "a"), "x y");
        assert_eq!(value(&doc, "", "b"), "z");
        assert_eq!(value(&doc, "", "c"), "\"x\"y\"");

        let doc = parse(LoadOptions::new().with_preserve_surrounded_quote(true), "a = \"x\"").unwrap();
        assert_eq!(value(&doc, "", "a"), "\"x\"");
    }

    #[test]
    fn test_unescape_double_quotes() {
        let options = LoadOptions::new().with_unescape_value_double_quotes(true);
        let doc = parse(options, r#"create = "create table \"users\"""#).unwrap();
        assert_eq!(value(&doc, "", "create"), r#"create table "users""#);
    }

    #[test]
    fn test_python_multiline() {
        let options = LoadOptions::new().with_allow_python_multiline_values(true);
        let text = "a = first\n    second\n      deeper\n  shallow = x\nb =\n\tone\n\ttwo\n";
        let doc = parse(options, text).unwrap();
        assert_eq!(value(&doc, "", "a"), "first\nsecond\n  deeper");
        assert_eq!(value(&doc, "", "shallow"), "x");
        assert_eq!(value(&doc, "", "b"), "\none\ntwo");
    }

    #[test]
    fn test_nested_values() {
        let options = LoadOptions::new().with_allow_nested_values(true);
        let doc = parse(options, "[s]\nlist =\n  a = 1\n  b\nnext = 2").unwrap();
        let section = doc.section("s").unwrap();
        assert_eq!(section.key("list").unwrap().nested_values(), ["a = 1", "b"]);
        assert_eq!(section.key("next").unwrap().value(), "2");
    }

    #[test]
    fn test_auto_increment_keys() {
        let doc = parse(LoadOptions::default(), "[s]\n- = a\n- = b\n[t]\n- = c\n[s]\n- = d").unwrap();
        let s = doc.section("s").unwrap();
        assert_eq!(s.key_strings(), vec!["#1", "#2", "#3"]);
        assert!(s.key("#3").unwrap().is_auto_increment());
        assert_eq!(doc.section("t").unwrap().key_strings(), vec!["#1"]);
    }

    #[test]
    fn test_boolean_key_with_inline_comment() {
        let options = LoadOptions::new().with_allow_boolean_keys(true);
        let doc = parse(options, "[mysqld]\nskip-name-resolve ; fast\n").unwrap();
        let key = doc.section("mysqld").unwrap().key("skip-name-resolve").unwrap();
        assert!(key.is_boolean());
        assert_eq!(key.value(), "true");
        assert_eq!(key.comment(), "; fast");
    }

    #[test]
    fn test_skip_unrecognizable_lines_keeps_quote_errors() {
        let options = LoadOptions::new().with_skip_unrecognizable_lines(true);
        let doc = parse(options.clone(), "garbage\n= nameless\nk = v").unwrap();
        assert_eq!(doc.section("").unwrap().key_strings(), vec!["k"]);

        let err = parse(options, "k = v\n\"abc = 1").unwrap_err();
        assert!(matches!(err, Error::UnclosedQuote { line: 2, .. }));
    }

    #[test]
    fn test_quoted_dash_is_a_plain_key() {
        let doc = parse(LoadOptions::default(), "[s]\n`-` = a\n- = b").unwrap();
        let s = doc.section("s").unwrap();
        assert_eq!(s.key_strings(), vec!["-", "#1"]);
        assert!(!s.key("-").unwrap().is_auto_increment());
    }

    #[test]
    fn test_custom_delimiters() {
        let options = LoadOptions::new().with_key_value_delimiters("?");
        let doc = parse(options, "[s]\nk1?v1\nk2 ? v=2").unwrap();
        assert_eq!(value(&doc, "s", "k1"), "v1");
        assert_eq!(value(&doc, "s", "k2"), "v=2");
    }
}
