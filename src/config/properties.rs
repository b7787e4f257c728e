//! `.properties` text parsing
//!
//! Supports the usual syntax: `#` and `!` comment lines, `=` / `:` /
//! whitespace separators, odd trailing backslash for line continuation, and
//! the `\t \n \r \f \uXXXX` escapes. Any other escaped character stands for
//! itself, so `\=` and `\ ` put separators inside keys.
//!
//! [`Properties`] exposes the parser to figment as a data format.

use figment::providers::Format;
use serde::de::{self, value::MapDeserializer, DeserializeOwned};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PropertiesError {
    pub line: usize,
    pub message: String,
}

/// Parse properties text into a key/value map. Later duplicates win.
pub fn parse(text: &str) -> Result<BTreeMap<String, String>, PropertiesError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n').enumerate();
    let mut entries = BTreeMap::new();

    while let Some((index, line)) = lines.next() {
        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let line_no = index + 1;
        let (key, value) = split_entry(&logical);
        entries.insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(entries)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

/// An odd number of trailing backslashes joins the next natural line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let unit = read_code_unit(&mut chars, line)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: the low half must follow as another \uXXXX.
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => read_code_unit(&mut chars, line)?,
                        _ => return Err(bad_escape(line, "unpaired surrogate in \\u escape")),
                    };
                    let decoded = char::decode_utf16([unit, low])
                        .collect::<Result<String, _>>()
                        .map_err(|_| bad_escape(line, "unpaired surrogate in \\u escape"))?;
                    out.push_str(&decoded);
                } else {
                    let decoded = char::from_u32(u32::from(unit))
                        .ok_or_else(|| bad_escape(line, "unpaired surrogate in \\u escape"))?;
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_code_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, PropertiesError> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad_escape(line, &format!("malformed \\uxxxx encoding '\\u{digits}'")));
    }
    u16::from_str_radix(&digits, 16)
        .map_err(|_| bad_escape(line, &format!("malformed \\uxxxx encoding '\\u{digits}'")))
}

fn bad_escape(line: usize, message: &str) -> PropertiesError {
    PropertiesError { line, message: message.to_string() }
}

/// figment format for `.properties` text: every key maps to a string value.
#[derive(Debug, Clone, Copy)]
pub struct Properties;

impl Format for Properties {
    type Error = de::value::Error;

    const NAME: &'static str = "Properties";

    fn from_str<'de, T: DeserializeOwned>(string: &'de str) -> Result<T, Self::Error> {
        let entries = parse(string).map_err(de::Error::custom)?;
        T::deserialize(MapDeserializer::new(entries.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators_and_comments() {
        let text = "# comment\n! also a comment\n\nfhir_version=R4\nserver.id : home\nserver.name Local Tester\n";
        let map = parse(text).expect("parse");
        assert_eq!(map.len(), 3);
        assert_eq!(map["fhir_version"], "R4");
        assert_eq!(map["server.id"], "home");
        assert_eq!(map["server.name"], "Local Tester");
    }

    #[test]
    fn keeps_trailing_whitespace_and_drops_leading() {
        let map = parse("cors.enabled =   true  \n").expect("parse");
        assert_eq!(map["cors.enabled"], "true  ");
    }

    #[test]
    fn empty_value_is_kept() {
        let map = parse("datasource.username=\nemail.host\n").expect("parse");
        assert_eq!(map["datasource.username"], "");
        assert_eq!(map["email.host"], "");
    }

    #[test]
    fn joins_continuation_lines() {
        let text = "supported_resource_types=Patient,\\\n    Observation,\\\r\n  Encounter\nnext=1";
        let map = parse(text).expect("parse");
        assert_eq!(map["supported_resource_types"], "Patient,Observation,Encounter");
        assert_eq!(map["next"], "1");
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let map = parse("path=C:\\\\\nnext=1\n").expect("parse");
        assert_eq!(map["path"], "C:\\");
        assert_eq!(map["next"], "1");
    }

    #[test]
    fn comment_line_does_not_continue() {
        let map = parse("# trailing \\\nkey=value\n").expect("parse");
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn escapes_in_keys_and_values() {
        let map = parse("a\\=b\\ c=tab\\there\nunicode=caf\\u00e9\nemoji=\\uD83D\\uDE00\n")
            .expect("parse");
        assert_eq!(map["a=b c"], "tab\there");
        assert_eq!(map["unicode"], "café");
        assert_eq!(map["emoji"], "😀");
    }

    #[test]
    fn second_separator_belongs_to_value() {
        let map = parse("key = = value\n").expect("parse");
        assert_eq!(map["key"], "= value");
    }

    #[test]
    fn later_duplicate_wins() {
        let map = parse("k=1\nk=2\n").expect("parse");
        assert_eq!(map["k"], "2");
    }

    #[test]
    fn malformed_unicode_escape_is_an_error() {
        let err = parse("ok=1\nbad=\\u12G4\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("malformed"));
    }

    #[test]
    fn leading_bom_is_not_part_of_the_first_key() {
        let map = parse("\u{feff}fhir_version=R5\n").expect("parse");
        assert_eq!(map.get("fhir_version").map(String::as_str), Some("R5"));
    }

    #[test]
    fn format_feeds_figment() {
        use figment::Figment;

        let merged: BTreeMap<String, String> = Figment::from(Properties::string("a=1\nb=2\n"))
            .merge(Properties::string("b=3\n"))
            .extract()
            .expect("extract");
        assert_eq!(merged["a"], "1");
        assert_eq!(merged["b"], "3");
    }

    #[test]
    fn format_reports_parse_errors() {
        use figment::Figment;

        let err = Figment::from(Properties::string("key=\\uZZZZ\n"))
            .extract::<BTreeMap<String, String>>()
            .unwrap_err();
        assert!(err.to_string().contains("line 1"), "got {err}");
    }
}
