//! Conversion of XML-style tagged model output into Markdown.
//!
//! The chat model is prompted to answer in semantically delimited sections,
//! `<section_name>content</section_name>`. This module rewrites each pair
//! into a bolded header plus body. It is a small explicit scanner rather
//! than a regex so that malformed markup surfaces as a typed error instead
//! of silently truncated output.

use thiserror::Error;

/// Errors from the tag-to-Markdown transform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// An opening tag had no matching closing tag anywhere after it.
    #[error("unclosed tag <{0}>")]
    UnclosedTag(String),
}

/// Rewrite every `<name>…</name>` pair into `**Name**:\ncontent`.
///
/// Rules, applied identically after every batch's model call:
/// - the header is the tag name with underscores replaced by spaces and each
///   word title-cased
/// - section content is trimmed and followed by one blank line
/// - text outside tags passes through unchanged; a `<` that does not start a
///   well-formed opening tag is literal text
/// - content between a pair is inserted raw; nested tags are not rewritten
/// - an opening tag with no matching close is a [`ParseError::UnclosedTag`]
/// - runs of three or more consecutive newlines collapse to exactly one
///   blank line, and the final result is trimmed
pub fn render_markdown(input: &str) -> Result<String, ParseError> {
    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if let Some((name, content_start)) = read_opening_tag(input, pos) {
                let closing = format!("</{name}>");
                match input[content_start..].find(&closing) {
                    Some(offset) => {
                        let content = &input[content_start..content_start + offset];
                        push_section(&mut output, name, content);
                        pos = content_start + offset + closing.len();
                        continue;
                    }
                    None => return Err(ParseError::UnclosedTag(name.to_string())),
                }
            }
        }
        // Literal byte; tag names are ASCII so byte-wise advance is safe
        // only on UTF-8 boundaries, so copy the whole char.
        let ch = input[pos..].chars().next().unwrap_or('\u{FFFD}');
        output.push(ch);
        pos += ch.len_utf8();
    }

    Ok(tidy(&output))
}

/// If `pos` points at a well-formed opening tag `<name>`, return the name and
/// the byte offset just past the `>`.
fn read_opening_tag(input: &str, pos: usize) -> Option<(&str, usize)> {
    let rest = &input[pos + 1..];
    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    if rest.as_bytes().get(name_len) != Some(&b'>') {
        return None;
    }
    Some((&rest[..name_len], pos + 1 + name_len + 1))
}

fn push_section(output: &mut String, name: &str, content: &str) {
    output.push_str("**");
    output.push_str(&title_case(name));
    output.push_str("**:\n");
    output.push_str(content.trim());
    output.push_str("\n\n");
}

/// `key_findings` → `Key Findings`.
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of 3+ newlines to exactly two and trim the ends.
fn tidy(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                result.push('\n');
            }
        } else {
            newlines = 0;
            result.push(ch);
        }
    }
    result.trim().to_string()
}
