//! Mapping between environment blocks and their native storage unit.
//!
//! A block is stored as a single file/object named `{app}.{env}.env` whose
//! body is dotenv-style `KEY=VALUE` lines. Files written by other dotenv
//! tooling must stay readable, so parsing tolerates comments, blank lines
//! and quoted values.

use shared_types::{EnvConfig, EnvKey};
use std::borrow::Cow;

use super::error::StorageError;

const FILE_SUFFIX: &str = "env";

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// File/object name for one environment block.
pub fn block_file_name(key: &EnvKey) -> String {
    format!("{}.{}.{FILE_SUFFIX}", key.application, key.environment)
}

/// Inverse of [`block_file_name`]. Returns `None` for names that are not
/// exactly `app.env.env`, so listing can skip unrelated files.
pub fn parse_file_name(name: &str) -> Option<EnvKey> {
    let parts: Vec<&str> = name.split('.').collect();
    match parts.as_slice() {
        [app, env, FILE_SUFFIX] if !app.is_empty() && !env.is_empty() => {
            Some(EnvKey::new(*app, *env))
        }
        _ => None,
    }
}

/// App and environment names become file/object name components, so the
/// characters the name codec uses (and path separators) are rejected before
/// any backend sees them.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains(['.', '/', '\\']) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Serializes a block as `KEY=VALUE` lines joined with the host line
/// terminator. Values are written raw and unexpanded; only values the line
/// format cannot carry verbatim (newlines, surrounding whitespace, leading
/// quotes) are double-quoted with dotenv-style escapes.
pub fn serialize_block(block: &EnvConfig) -> String {
    block
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_value(value)))
        .collect::<Vec<_>>()
        .join(LINE_ENDING)
}

fn encode_value(value: &str) -> Cow<'_, str> {
    if needs_quoting(value) {
        Cow::Owned(quote(value))
    } else {
        Cow::Borrowed(value)
    }
}

fn needs_quoting(value: &str) -> bool {
    value.contains('\n')
        || value.contains('\r')
        || value.starts_with('"')
        || value.starts_with('\'')
        || value != value.trim()
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Parses a dotenv-style body back into a block. Blank lines, `#` comments
/// and lines without a `=` are skipped. Double-quoted values get their
/// escapes decoded (the dotenv convention); single-quoted values are taken
/// literally; everything else is kept raw.
pub fn parse_block(content: &str) -> EnvConfig {
    let mut block = EnvConfig::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        block.insert(key.to_string(), decode_value(value.trim()));
    }
    block
}

fn decode_value(value: &str) -> String {
    if let Some(inner) = wrapped(value, '"') {
        unescape(inner)
    } else if let Some(inner) = wrapped(value, '\'') {
        inner.to_string()
    } else {
        value.to_string()
    }
}

/// The text between a matching pair of surrounding quotes, if any.
fn wrapped(value: &str, quote: char) -> Option<&str> {
    let rest = value.strip_prefix(quote)?;
    if rest.is_empty() {
        // A single bare quote is not a quoted value.
        return None;
    }
    rest.strip_suffix(quote)
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            // Unknown escapes are kept verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_round_trip() {
        let key = EnvKey::new("svc", "prod");
        let name = block_file_name(&key);
        assert_eq!(name, "svc.prod.env");
        assert_eq!(parse_file_name(&name), Some(key));
    }

    #[test]
    fn rejects_foreign_file_names() {
        assert_eq!(parse_file_name("README.md"), None);
        assert_eq!(parse_file_name("svc.env"), None);
        assert_eq!(parse_file_name("svc.prod.staging.env"), None);
        assert_eq!(parse_file_name(".prod.env"), None);
        assert_eq!(parse_file_name("svc..env"), None);
    }

    #[test]
    fn block_round_trip() {
        let mut block = EnvConfig::new();
        block.insert("A".to_string(), "1".to_string());
        block.insert("B".to_string(), "hello world".to_string());
        let body = serialize_block(&block);
        assert_eq!(parse_block(&body), block);
    }

    #[test]
    fn serialized_form_is_plain_key_value_lines() {
        let mut block = EnvConfig::new();
        block.insert("A".to_string(), "1".to_string());
        block.insert("B".to_string(), "2".to_string());
        assert_eq!(serialize_block(&block), format!("A=1{LINE_ENDING}B=2"));
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let body = "# generated\n\nA=1\n  # indented comment\nB=2\n";
        let block = parse_block(body);
        assert_eq!(block.len(), 2);
        assert_eq!(block["A"], "1");
        assert_eq!(block["B"], "2");
    }

    #[test]
    fn parse_accepts_crlf_and_quotes() {
        let body = "A=\"quoted value\"\r\nB='single'\r\nC=un\"balanced";
        let block = parse_block(body);
        assert_eq!(block["A"], "quoted value");
        assert_eq!(block["B"], "single");
        assert_eq!(block["C"], "un\"balanced");
    }

    #[test]
    fn parse_keeps_equals_in_value() {
        let block = parse_block("URL=http://host?a=1&b=2");
        assert_eq!(block["URL"], "http://host?a=1&b=2");
    }

    #[test]
    fn parse_skips_lines_without_separator() {
        let block = parse_block("not a pair\nA=1");
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn multiline_values_survive_a_round_trip() {
        let mut block = EnvConfig::new();
        block.insert("CERT".to_string(), "line one\nline two\r\nline three".to_string());
        block.insert("PLAIN".to_string(), "untouched".to_string());

        let body = serialize_block(&block);
        // The body itself stays one logical line per key.
        assert!(body.contains("CERT=\"line one\\nline two\\r\\nline three\""));
        assert_eq!(parse_block(&body), block);
    }

    #[test]
    fn awkward_values_survive_a_round_trip() {
        for value in ["\"looks quoted\"", "'single'", "  padded  ", "back\\slash\nnewline"] {
            let mut block = EnvConfig::new();
            block.insert("K".to_string(), (*value).to_string());
            assert_eq!(parse_block(&serialize_block(&block)), block, "value: {value:?}");
        }
    }

    #[test]
    fn unknown_escapes_in_quoted_values_are_kept() {
        let block = parse_block("A=\"c:\\temp\"");
        assert_eq!(block["A"], "c:\\temp");
    }

    #[test]
    fn validate_name_rejects_codec_characters() {
        assert!(validate_name("svc").is_ok());
        assert!(validate_name("svc-2_a").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a.b").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }
}
