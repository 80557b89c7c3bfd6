//! Text steganography.
//!
//! Two schemes are available:
//!
//! - [`TextScheme::ZeroWidth`]: each bit becomes an invisible character
//!   (U+2060 WORD JOINER for 0, U+2063 INVISIBLE SEPARATOR for 1). The run
//!   is always appended at the very end of the cover, so extraction can
//!   simply collect the two reserved characters in order and ignore
//!   everything else. Other invisible characters such as U+200D (used by
//!   emoji sequences and Indic conjuncts) are never touched.
//! - [`TextScheme::TrailingWhitespace`]: each line carries one bit as a
//!   trailing space (0) or tab (1).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CarrierAdapter, CarrierKind};
use crate::config::TextConfig;
use crate::error::StegoError;

/// Invisible character encoding a 0 bit.
pub const ZERO_WIDTH_ZERO: char = '\u{2060}';

/// Invisible character encoding a 1 bit.
pub const ZERO_WIDTH_ONE: char = '\u{2063}';

/// How bits are hidden in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TextScheme {
    #[default]
    ZeroWidth,
    TrailingWhitespace,
}

/// Text carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCarrier {
    text: String,
    scheme: TextScheme,
    /// Zero-width slots granted per visible character.
    density: usize,
}

impl TextCarrier {
    pub fn new(text: impl Into<String>, scheme: TextScheme, density: usize) -> Self {
        Self {
            text: text.into(),
            scheme,
            density,
        }
    }

    pub fn with_config(text: impl Into<String>, config: &TextConfig) -> Self {
        Self::new(text, config.scheme, config.density)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn scheme(&self) -> TextScheme {
        self.scheme
    }

    fn visible_chars(&self) -> usize {
        self.text.chars().filter(|c| !is_reserved(*c)).count()
    }

    fn embed_zero_width(&self, bits: &[u8]) -> String {
        let mut out: String = self.text.chars().filter(|c| !is_reserved(*c)).collect();
        out.reserve(bits.len() * ZERO_WIDTH_ZERO.len_utf8());
        out.extend(bits.iter().map(|&bit| if bit & 1 == 1 { ZERO_WIDTH_ONE } else { ZERO_WIDTH_ZERO }));
        out
    }

    fn embed_whitespace(&self, bits: &[u8]) -> String {
        let lines = self.text.split('\n').enumerate().map(|(i, line)| {
            let Some(&bit) = bits.get(i) else {
                return line.to_string();
            };
            let (body, cr) = match line.strip_suffix('\r') {
                Some(body) => (body, "\r"),
                None => (line, ""),
            };
            let mut out = body.trim_end_matches([' ', '\t']).to_string();
            out.push(if bit & 1 == 1 { '\t' } else { ' ' });
            out.push_str(cr);
            out
        });
        lines.collect::<Vec<_>>().join("\n")
    }
}

fn is_reserved(c: char) -> bool {
    c == ZERO_WIDTH_ZERO || c == ZERO_WIDTH_ONE
}

impl CarrierAdapter for TextCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Text
    }

    fn usable_units(&self) -> usize {
        match self.scheme {
            TextScheme::ZeroWidth => self.visible_chars().saturating_mul(self.density),
            TextScheme::TrailingWhitespace => self.text.split('\n').count(),
        }
    }

    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        let available = self.usable_bits();
        if bits.len() > available {
            return Err(StegoError::too_many_bits(bits.len(), available));
        }

        let text = match self.scheme {
            TextScheme::ZeroWidth => self.embed_zero_width(bits),
            TextScheme::TrailingWhitespace => self.embed_whitespace(bits),
        };

        debug!(bits = bits.len(), scheme = ?self.scheme, "embedded bits into text");
        Ok(Self {
            text,
            scheme: self.scheme,
            density: self.density,
        })
    }

    fn extract(&self) -> Vec<u8> {
        match self.scheme {
            TextScheme::ZeroWidth => self
                .text
                .chars()
                .filter_map(|c| match c {
                    ZERO_WIDTH_ZERO => Some(0),
                    ZERO_WIDTH_ONE => Some(1),
                    _ => None,
                })
                .collect(),
            TextScheme::TrailingWhitespace => self
                .text
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .map_while(|line| match line.chars().last() {
                    Some(' ') => Some(0),
                    Some('\t') => Some(1),
                    _ => None,
                })
                .collect(),
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        Ok(self.text.clone().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVER: &str = "This is cover text.";

    #[test]
    fn test_zero_width_capacity() {
        let carrier = TextCarrier::new(COVER, TextScheme::ZeroWidth, 8);
        // 19 visible chars * 8 slots = 152 bits = 19 bytes, minus 16 header
        assert_eq!(carrier.usable_bits(), 152);
        assert_eq!(carrier.capacity(), 3);
    }

    #[test]
    fn test_zero_width_appends_at_end() {
        let carrier = TextCarrier::new(COVER, TextScheme::ZeroWidth, 8);
        let stego = carrier.embed(&[1, 0, 1]).unwrap();

        assert!(stego.as_str().starts_with(COVER));
        assert_eq!(stego.as_str().chars().count(), COVER.chars().count() + 3);
        assert_eq!(stego.extract(), vec![1, 0, 1]);
    }

    #[test]
    fn test_zero_width_strips_existing_reserved_chars() {
        let dirty = format!("Hel{}lo{}", ZERO_WIDTH_ONE, ZERO_WIDTH_ZERO);
        let carrier = TextCarrier::new(dirty, TextScheme::ZeroWidth, 8);
        let stego = carrier.embed(&[0, 0]).unwrap();

        assert_eq!(stego.extract(), vec![0, 0]);
        assert!(stego.as_str().starts_with("Hello"));
    }

    #[test]
    fn test_zero_width_keeps_zwj_sequences() {
        let cover = "Family: \u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467} at home";
        let carrier = TextCarrier::new(cover, TextScheme::ZeroWidth, 8);
        let stego = carrier.embed(&[0, 1, 1, 0]).unwrap();

        assert!(stego.as_str().starts_with(cover));
        assert_eq!(stego.extract(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_zero_width_ignores_zwj_before_run() {
        let carrier = TextCarrier::new(COVER, TextScheme::ZeroWidth, 8);
        let stego = carrier.embed(&[1, 0, 0, 1]).unwrap();

        let prefixed = format!("\u{1F468}\u{200D}\u{1F469} {}", stego.as_str());
        let reparsed = TextCarrier::new(prefixed, TextScheme::ZeroWidth, 8);
        assert_eq!(reparsed.extract(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_zero_width_survives_surrounding_edits() {
        let carrier = TextCarrier::new(COVER, TextScheme::ZeroWidth, 8);
        let stego = carrier.embed(&[1, 1, 0, 1]).unwrap();

        let edited = format!("Prefix. {} Suffix.", stego.as_str());
        let reparsed = TextCarrier::new(edited, TextScheme::ZeroWidth, 8);
        assert_eq!(reparsed.extract(), vec![1, 1, 0, 1]);
    }

    #[test]
    fn test_whitespace_scheme() {
        let cover = "line one  \nline two\r\nline three\t\nline four";
        let carrier = TextCarrier::new(cover, TextScheme::TrailingWhitespace, 8);
        assert_eq!(carrier.usable_units(), 4);

        let stego = carrier.embed(&[1, 0, 1]).unwrap();
        assert_eq!(stego.as_str(), "line one\t\nline two \r\nline three\t\nline four");
        assert_eq!(stego.extract(), vec![1, 0, 1]);
    }

    #[test]
    fn test_whitespace_too_few_lines() {
        let carrier = TextCarrier::new("a\nb", TextScheme::TrailingWhitespace, 8);
        let result = carrier.embed(&[0, 1, 0]);
        assert!(matches!(result, Err(StegoError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_empty_cover_has_no_capacity() {
        let carrier = TextCarrier::new("", TextScheme::ZeroWidth, 8);
        assert_eq!(carrier.capacity(), 0);
        assert!(carrier.extract().is_empty());
    }
}
