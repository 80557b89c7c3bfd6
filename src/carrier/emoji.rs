//! Emoji symbol encoding.
//!
//! Bits are grouped MSB-first into 2- or 3-bit groups and each group is
//! written as one emoji from a disjoint alphabet. Decoding skips every
//! character outside the active alphabet, so the symbols may sit inside
//! ordinary prose. The group size is not recorded in the string.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CarrierAdapter, CarrierKind};
use crate::bits::{push_uint, read_uint};
use crate::config::EmojiConfig;
use crate::error::StegoError;

/// Alphabet for 2-bit groups, indexed by group value.
pub const TWO_BIT_ALPHABET: [char; 4] = ['\u{1F600}', '\u{1F603}', '\u{1F604}', '\u{1F601}'];

/// Alphabet for 3-bit groups, indexed by group value.
pub const THREE_BIT_ALPHABET: [char; 8] = [
    '\u{1F389}',
    '\u{1F38A}',
    '\u{1F388}',
    '\u{1F386}',
    '\u{1F387}',
    '\u{2728}',
    '\u{1F380}',
    '\u{1F381}',
];

/// Bits carried by one emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitsPerSymbol {
    #[default]
    #[value(name = "2")]
    Two,
    #[value(name = "3")]
    Three,
}

impl BitsPerSymbol {
    pub const fn bits(self) -> usize {
        match self {
            BitsPerSymbol::Two => 2,
            BitsPerSymbol::Three => 3,
        }
    }

    pub fn alphabet(self) -> &'static [char] {
        match self {
            BitsPerSymbol::Two => &TWO_BIT_ALPHABET,
            BitsPerSymbol::Three => &THREE_BIT_ALPHABET,
        }
    }

    fn lookup(self, symbol: char) -> Option<u32> {
        self.alphabet().iter().position(|&c| c == symbol).map(|i| i as u32)
    }
}

impl TryFrom<u8> for BitsPerSymbol {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(BitsPerSymbol::Two),
            3 => Ok(BitsPerSymbol::Three),
            other => Err(format!("bits per symbol must be 2 or 3, got {}", other)),
        }
    }
}

impl From<BitsPerSymbol> for u8 {
    fn from(value: BitsPerSymbol) -> Self {
        value.bits() as u8
    }
}

/// Maps bits to symbols. The final group is zero-padded.
pub fn encode_symbols(bits: &[u8], bits_per_symbol: BitsPerSymbol) -> String {
    let width = bits_per_symbol.bits();
    let alphabet = bits_per_symbol.alphabet();
    (0..bits.len().div_ceil(width))
        .map(|group| alphabet[read_uint(bits, group * width, width) as usize])
        .collect()
}

/// Maps symbols back to bits, skipping characters outside the alphabet.
pub fn decode_symbols(text: &str, bits_per_symbol: BitsPerSymbol) -> Vec<u8> {
    let width = bits_per_symbol.bits();
    let mut bits = Vec::new();
    for value in text.chars().filter_map(|c| bits_per_symbol.lookup(c)) {
        push_uint(&mut bits, value, width);
    }
    bits
}

/// Emoji carrier: optional prose followed by the symbol run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiCarrier {
    text: String,
    bits_per_symbol: BitsPerSymbol,
    max_symbols: usize,
}

impl EmojiCarrier {
    pub fn new(text: impl Into<String>, bits_per_symbol: BitsPerSymbol, max_symbols: usize) -> Self {
        Self {
            text: text.into(),
            bits_per_symbol,
            max_symbols,
        }
    }

    pub fn with_config(text: impl Into<String>, config: &EmojiConfig) -> Self {
        Self::new(text, config.bits_per_symbol, config.max_symbols)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn bits_per_symbol(&self) -> BitsPerSymbol {
        self.bits_per_symbol
    }
}

impl CarrierAdapter for EmojiCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Emoji
    }

    fn usable_units(&self) -> usize {
        self.max_symbols
    }

    fn bits_per_unit(&self) -> usize {
        self.bits_per_symbol.bits()
    }

    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        let available = self.usable_bits();
        if bits.len() > available {
            return Err(StegoError::too_many_bits(bits.len(), available));
        }

        // Symbols of the active alphabet already in the prose would be read
        // back as data.
        let mut text: String = self
            .text
            .chars()
            .filter(|&c| self.bits_per_symbol.lookup(c).is_none())
            .collect();
        let symbols = encode_symbols(bits, self.bits_per_symbol);
        debug!(bits = bits.len(), symbols = symbols.chars().count(), "encoded emoji symbols");
        text.push_str(&symbols);

        Ok(Self {
            text,
            bits_per_symbol: self.bits_per_symbol,
            max_symbols: self.max_symbols,
        })
    }

    fn extract(&self) -> Vec<u8> {
        decode_symbols(&self.text, self.bits_per_symbol)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        Ok(self.text.clone().into_bytes())
    }
}
