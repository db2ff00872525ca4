//! The wrapped-literal file format (`window.changelogsData = [...];`) and the base64
//! transport encoding used by the contents API.
//!
//! Decoding is a strict JSON parse of the literal; anything that is not well-formed JSON
//! is rejected instead of being evaluated.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CmsError, CmsResult};
use crate::model::ChangelogEntry;

pub const CHANGELOG_VARIABLE: &str = "window.changelogsData";

/// Strips `{variable} =` and an optional trailing `;`, then parses the remainder as JSON.
pub fn decode_wrapped<T: DeserializeOwned>(text: &str, variable: &str) -> CmsResult<T> {
    let text = text.trim_start_matches('\u{feff}').trim();
    let rest = text.strip_prefix(variable).ok_or_else(|| {
        CmsError::Decode(format!("expected content to start with `{} =`", variable))
    })?;
    let rest = rest
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| CmsError::Decode(format!("expected `=` after `{}`", variable)))?;

    let mut literal = rest.trim();
    while let Some(stripped) = literal.strip_suffix(';') {
        literal = stripped.trim_end();
    }
    if literal.is_empty() {
        return Err(CmsError::Decode("empty literal".to_string()));
    }

    serde_json::from_str(literal).map_err(|e| CmsError::Decode(format!("parse literal: {}", e)))
}

/// Four-space indented JSON.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> CmsResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| CmsError::Decode(format!("serialize: {}", e)))?;
    String::from_utf8(buf).map_err(|e| CmsError::Decode(format!("serialized json is not utf-8: {}", e)))
}

/// `{variable} = <4-space indented JSON>;`
pub fn encode_wrapped<T: Serialize + ?Sized>(value: &T, variable: &str) -> CmsResult<String> {
    Ok(format!("{} = {};", variable, encode_pretty(value)?))
}

pub fn decode_changelog(text: &str) -> CmsResult<Vec<ChangelogEntry>> {
    decode_wrapped(text, CHANGELOG_VARIABLE)
}

pub fn encode_changelog(entries: &[ChangelogEntry]) -> CmsResult<String> {
    encode_wrapped(entries, CHANGELOG_VARIABLE)
}

/// Encodes file text for a contents API write.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes a contents API payload. The API wraps base64 at 60 columns, so whitespace is
/// dropped before decoding.
pub fn decode_content(encoded: &str) -> CmsResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CmsError::Decode(format!("base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CmsError::Decode(format!("content is not utf-8: {}", e)))
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
