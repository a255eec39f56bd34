//! Replacement templates
//!
//! A template is the replacement side of a regex rule. Groups are referenced
//! with a backslash: `\1`, `\12`, `\g<3>` or `\g<name>`. Every other
//! backslash sequence is kept verbatim so the `\@` (parent directory name)
//! and `\#` (counter) tokens survive the substitution and can be filled in
//! afterwards by [`replace_token`].

use regex::{Captures, Regex};

use crate::error::{RenameError, Result};

/// Token replaced with the parent directory name
pub const PARENT_TOKEN: char = '@';

/// Token replaced with the zero-padded counter
pub const COUNTER_TOKEN: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Index(usize),
    Named(String),
}

/// A parsed replacement template, validated against its pattern
#[derive(Debug, Clone)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parse `source`, checking every group reference exists in `regex`
    pub fn parse(source: &str, regex: &Regex) -> Result<Self> {
        let parts = parse_parts(source)?;

        for part in &parts {
            match part {
                Part::Index(i) if *i >= regex.captures_len() => {
                    return Err(RenameError::Usage(format!(
                        "Invalid group reference \\{} in replacement: {}",
                        i, source
                    )));
                }
                Part::Named(name) if !has_group(regex, name) => {
                    return Err(RenameError::Usage(format!(
                        "Unknown group name <{}> in replacement: {}",
                        name, source
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { parts })
    }

    /// Render the template for one match; unmatched groups render empty
    pub fn expand(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Index(i) => out.push_str(caps.get(*i).map_or("", |m| m.as_str())),
                Part::Named(name) => out.push_str(caps.name(name).map_or("", |m| m.as_str())),
            }
        }
        out
    }

    /// Replace every non-overlapping match of `regex` in `text`
    pub fn replace_all(&self, regex: &Regex, text: &str) -> String {
        regex
            .replace_all(text, |caps: &Captures<'_>| self.expand(caps))
            .into_owned()
    }
}

fn has_group(regex: &Regex, name: &str) -> bool {
    regex.capture_names().flatten().any(|n| n == name)
}

fn parse_parts(source: &str) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            literal.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('0') => {
                return Err(RenameError::Usage(format!(
                    "\\0 is not a group reference, use \\g<0> for the whole match: {}",
                    source
                )));
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while digits.len() < 2
                    && let Some(d) = chars.peek().copied()
                    && d.is_ascii_digit()
                {
                    digits.push(d);
                    chars.next();
                }
                flush(&mut parts, &mut literal);
                // At most two ASCII digits, always parses
                parts.push(Part::Index(digits.parse().unwrap_or_default()));
            }
            Some('g') => {
                chars.next();
                if chars.next() != Some('<') {
                    return Err(missing_group_name(source));
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(missing_group_name(source)),
                    }
                }
                if name.is_empty() {
                    return Err(missing_group_name(source));
                }
                flush(&mut parts, &mut literal);
                match name.parse::<usize>() {
                    Ok(i) => parts.push(Part::Index(i)),
                    Err(_) => parts.push(Part::Named(name)),
                }
            }
            Some('\\') => {
                chars.next();
                literal.push_str("\\\\");
            }
            _ => literal.push('\\'),
        }
    }

    flush(&mut parts, &mut literal);
    Ok(parts)
}

fn flush(parts: &mut Vec<Part>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(Part::Literal(std::mem::take(literal)));
    }
}

fn missing_group_name(source: &str) -> RenameError {
    RenameError::Usage(format!("Malformed \\g<...> group in replacement: {}", source))
}

/// Replace each `\<token>` in `text` with `value`.
///
/// A token whose backslash is itself preceded by a backslash is escaped:
/// the pair collapses to one backslash and the token stays literal, so
/// `\\#` becomes `\#`. Only the single preceding character is looked at;
/// longer backslash runs are not counted.
pub fn replace_token(text: &str, token: char, value: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' && bytes[i + 1] == token as u8 {
            if i > 0 && bytes[i - 1] == b'\\' {
                // Escaped: keep the first backslash, drop this one
                out.push_str(&text[last..i]);
                out.push(token);
            } else {
                out.push_str(&text[last..i]);
                out.push_str(value);
            }
            i += 2;
            last = i;
        } else {
            i += 1;
        }
    }

    out.push_str(&text[last..]);
    out
}
