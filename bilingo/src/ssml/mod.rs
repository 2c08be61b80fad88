//! Speech synthesis markup: generation, chunking and structural checks.
//!
//! Only tag structure is parsed here. Element names are compared literally
//! and no DTD is read, so only the predefined entities and character
//! references are accepted.

pub mod chunker;
pub mod generate;
pub mod voices;

pub use chunker::{MarkupChunk, chunk, voice_turns};
pub use generate::{AudioOutputFormat, SsmlOptions, generate_ssml};
pub use voices::{Gender, UNIVERSAL_VOICE, Voice, VoiceCatalog, VoiceChoice};

use std::ops::Range;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    /// `<name ...>`
    Open,
    /// `</name>`
    Close,
    /// `<name .../>`
    Empty,
    /// Comments, processing instructions, CDATA and DOCTYPE
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub kind: TagKind,
    pub name: &'a str,
    pub span: Range<usize>,
}

fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedMarkup(message.into())
}

/// Byte index one past `terminator`, searching from `from`.
fn find_after(document: &str, from: usize, terminator: &str, what: &str) -> Result<usize> {
    document[from..]
        .find(terminator)
        .map(|rel| from + rel + terminator.len())
        .ok_or_else(|| malformed(format!("unterminated {} at byte {}", what, from)))
}

/// Index of the `>` closing the tag opened at `start`, skipping quoted
/// attribute values.
fn find_tag_end(document: &str, start: usize) -> Result<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in document[start + 1..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Ok(start + 1 + offset),
            (None, '<') => break,
            (None, _) => {}
        }
    }
    Err(malformed(format!("unterminated tag at byte {}", start)))
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ':' | '_' | '-' | '.')
}

fn is_reference(name: &str) -> bool {
    if let Some(hex) = name.strip_prefix("#x") {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(decimal) = name.strip_prefix('#') {
        !decimal.is_empty() && decimal.chars().all(|c| c.is_ascii_digit())
    } else {
        matches!(name, "amp" | "lt" | "gt" | "quot" | "apos")
    }
}

/// Every `&` in `text` must start a predefined entity or a character
/// reference. `at` is the byte offset of `text` in the document.
fn check_references(text: &str, at: usize) -> Result<()> {
    for (offset, _) in text.match_indices('&') {
        let reference = &text[offset + 1..];
        let valid = reference
            .find(';')
            .is_some_and(|end| is_reference(&reference[..end]));
        if !valid {
            return Err(malformed(format!(
                "bare '&' or unknown entity at byte {}",
                at + offset
            )));
        }
    }
    Ok(())
}

/// Attributes are `name="value"` or `name='value'` pairs separated by
/// whitespace, each name at most once.
fn check_attributes(element: &str, attributes: &str, at: usize) -> Result<()> {
    let mut seen: Vec<&str> = Vec::new();
    let mut rest = attributes.trim_start();

    while !rest.is_empty() {
        let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_len);
        if name.is_empty() {
            return Err(malformed(format!(
                "invalid attribute in <{}> at byte {}",
                element, at
            )));
        }
        let value = after
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(|| malformed(format!("attribute {} of <{}> has no value", name, element)))?
            .trim_start();
        let quote = value
            .chars()
            .next()
            .filter(|c| matches!(c, '"' | '\''))
            .ok_or_else(|| {
                malformed(format!("unquoted value for attribute {} of <{}>", name, element))
            })?;
        let value_len = value[1..].find(quote).ok_or_else(|| {
            malformed(format!("unterminated value for attribute {} of <{}>", name, element))
        })?;
        let text = &value[1..1 + value_len];
        if text.contains('<') {
            return Err(malformed(format!(
                "'<' in attribute {} of <{}>",
                name, element
            )));
        }
        check_references(text, at)?;
        if seen.contains(&name) {
            return Err(malformed(format!(
                "duplicate attribute {} in <{}>",
                name, element
            )));
        }
        seen.push(name);

        rest = &value[value_len + 2..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(malformed(format!(
                "missing whitespace after attribute {} of <{}>",
                name, element
            )));
        }
        rest = rest.trim_start();
    }
    Ok(())
}

/// Tokenise every tag-like construct in `document`, in order.
pub(crate) fn scan(document: &str) -> Result<Vec<Tag<'_>>> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(rel) = document[pos..].find('<') {
        let start = pos + rel;
        let rest = &document[start..];

        let other_end = if rest.starts_with("<!--") {
            Some(find_after(document, start + 4, "-->", "comment")?)
        } else if rest.starts_with("<![CDATA[") {
            Some(find_after(document, start + 9, "]]>", "CDATA section")?)
        } else if rest.starts_with("<?") {
            Some(find_after(document, start + 2, "?>", "processing instruction")?)
        } else if rest.starts_with("<!") {
            Some(find_tag_end(document, start)? + 1)
        } else {
            None
        };
        if let Some(end) = other_end {
            tags.push(Tag {
                kind: TagKind::Other,
                name: "",
                span: start..end,
            });
            pos = end;
            continue;
        }

        let end = find_tag_end(document, start)?;
        let inner = &document[start + 1..end];
        let (kind, body) = if let Some(body) = inner.strip_prefix('/') {
            (TagKind::Close, body)
        } else if let Some(body) = inner.strip_suffix('/') {
            (TagKind::Empty, body)
        } else {
            (TagKind::Open, inner)
        };

        let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
        let (name, attributes) = body.split_at(name_len);
        if name.is_empty() {
            return Err(malformed(format!("tag without a name at byte {}", start)));
        }
        if !attributes.is_empty() && !attributes.starts_with(char::is_whitespace) {
            return Err(malformed(format!("invalid tag name in <{}> at byte {}", inner, start)));
        }
        if kind == TagKind::Close && !attributes.trim().is_empty() {
            return Err(malformed(format!("closing tag </{}> has attributes", name)));
        }
        if kind != TagKind::Close {
            check_attributes(name, attributes, start)?;
        }

        tags.push(Tag {
            kind,
            name,
            span: start..end + 1,
        });
        pos = end + 1;
    }

    Ok(tags)
}

/// Check that `document` has exactly one root element, balanced tags, no
/// text outside the root and well-formed attributes and references.
pub fn check_well_formed(document: &str) -> Result<()> {
    let tags = scan(document)?;
    let mut stack: Vec<&str> = Vec::new();
    let mut root_seen = false;
    let mut last_end = 0;

    for tag in &tags {
        let text = &document[last_end..tag.span.start];
        if stack.is_empty() && !text.trim().is_empty() {
            return Err(malformed(format!("text outside the root element at byte {}", last_end)));
        }
        check_references(text, last_end)?;
        last_end = tag.span.end;

        match tag.kind {
            TagKind::Other => {}
            TagKind::Open | TagKind::Empty if stack.is_empty() && root_seen => {
                return Err(malformed(format!("second root element <{}>", tag.name)));
            }
            TagKind::Open => {
                root_seen = true;
                stack.push(tag.name);
            }
            TagKind::Empty => root_seen = true,
            TagKind::Close => match stack.pop() {
                Some(open) if open == tag.name => {}
                Some(open) => {
                    return Err(malformed(format!(
                        "</{}> closes <{}>",
                        tag.name, open
                    )));
                }
                None => return Err(malformed(format!("unexpected </{}>", tag.name))),
            },
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("<{}> is never closed", open)));
    }
    if !document[last_end..].trim().is_empty() {
        return Err(malformed("text after the root element"));
    }
    if !root_seen {
        return Err(malformed("no root element"));
    }
    Ok(())
}

/// Escape text for use in element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
