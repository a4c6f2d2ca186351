use std::sync::LazyLock;

use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use crate::foundation::error::{CollageError, CollageResult};
use crate::theme::TagExtractor;

/// Field scraped by [`PatternTagExtractor::new`].
pub const DEFAULT_THEME_FIELD: &str = "theme";

#[derive(thiserror::Error, Debug)]
pub(crate) enum ThemeScrapeError {
    #[error("invalid hex in unicode escape: {0}")]
    Hex(#[from] std::num::ParseIntError),

    #[error("escape pair {0:04x} {1:04x} is not valid UTF-16")]
    Utf16(u16, u16),
}

/// Scrapes `"<field>": "<value>"` out of raw file bytes read as text.
///
/// A leading `\uXXXX\uXXXX` surrogate pair inside the value becomes an emoji prefix; every other
/// `\uXXXX` escape and anything outside printable ASCII is dropped from the label. A pair that
/// is not valid UTF-16 is dropped too and the plain label is kept.
#[derive(Debug, Clone)]
pub struct PatternTagExtractor {
    field: BytesRegex,
    escape_pair: Regex,
    escape: Regex,
}

impl PatternTagExtractor {
    /// Extractor for the `"theme"` field.
    pub fn new() -> CollageResult<Self> {
        Self::with_field(DEFAULT_THEME_FIELD)
    }

    /// Extractor for an arbitrary field name.
    pub fn with_field(field: &str) -> CollageResult<Self> {
        let compile_err =
            |e: regex::Error| CollageError::validation(format!("compile theme pattern: {e}"));
        let field = BytesRegex::new(&format!(
            r#"(?-u)"{}":\s*"([^"]+)""#,
            regex::escape(field)
        ))
        .map_err(compile_err)?;
        let escape_pair =
            Regex::new(r"\\u([0-9A-Fa-f]{4})\\u([0-9A-Fa-f]{4})").map_err(compile_err)?;
        let escape = Regex::new(r"\\u[0-9A-Fa-f]{4}").map_err(compile_err)?;
        Ok(Self {
            field,
            escape_pair,
            escape,
        })
    }

    fn scrape(&self, bytes: &[u8]) -> Option<String> {
        let caps = self.field.captures(bytes)?;
        let value = String::from_utf8_lossy(caps.get(1)?.as_bytes());

        let emoji = self.escape_pair.captures(&value).and_then(|pair| {
            decode_escape_pair(&pair[1], &pair[2])
                .inspect_err(|e| tracing::debug!(error = %e, "dropping undecodable emoji escape"))
                .ok()
        });

        let label: String = self
            .escape
            .replace_all(&value, "")
            .chars()
            .filter(|c| (' '..='~').contains(c))
            .collect();
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        Some(match emoji {
            Some(emoji) => format!("{emoji} {label}"),
            None => label.to_string(),
        })
    }
}

impl TagExtractor for PatternTagExtractor {
    fn extract_tag(&self, bytes: &[u8]) -> Option<String> {
        self.scrape(bytes)
    }
}

fn decode_escape_pair(hi: &str, lo: &str) -> Result<String, ThemeScrapeError> {
    let hi = u16::from_str_radix(hi, 16)?;
    let lo = u16::from_str_radix(lo, 16)?;
    char::decode_utf16([hi, lo])
        .collect::<Result<String, _>>()
        .map_err(|_| ThemeScrapeError::Utf16(hi, lo))
}

static DEFAULT_EXTRACTOR: LazyLock<Option<PatternTagExtractor>> =
    LazyLock::new(|| PatternTagExtractor::new().ok());

/// Scrape the `"theme"` field from `bytes`; `[]` when absent or unreadable.
pub fn extract_theme(bytes: &[u8]) -> Vec<String> {
    DEFAULT_EXTRACTOR
        .as_ref()
        .map(|x| x.extract(bytes))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/theme/pattern.rs"]
mod tests;
