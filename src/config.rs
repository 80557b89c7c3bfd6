//! Carrier defaults loaded from `~/.stegkit/config.toml`.
//!
//! Every field is optional; a missing file means all defaults.
//!
//! ```toml
//! [emoji]
//! bits_per_symbol = 3
//! max_symbols = 65536
//!
//! [text]
//! scheme = "trailing-whitespace"
//! density = 8
//!
//! [network]
//! field = "tcp-isn"
//! max_packets = 4096
//! src = "10.0.0.2"
//! dst = "192.168.1.1"
//! src_port = 20
//! dst_port = 80
//! ```

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::carrier::network::packet::Endpoints;
use crate::carrier::{BitsPerSymbol, PacketField, TextScheme};

/// Default number of emoji symbols a generated string may hold.
pub const DEFAULT_MAX_SYMBOLS: usize = 1 << 20;

/// Default zero-width slots per visible character.
pub const DEFAULT_TEXT_DENSITY: usize = 8;

/// Default number of packets a fabricated capture may hold.
pub const DEFAULT_MAX_PACKETS: usize = 65_535;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    pub bits_per_symbol: BitsPerSymbol,
    pub max_symbols: usize,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            bits_per_symbol: BitsPerSymbol::default(),
            max_symbols: DEFAULT_MAX_SYMBOLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub scheme: TextScheme,
    /// Zero-width characters allowed per visible character.
    pub density: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            scheme: TextScheme::default(),
            density: DEFAULT_TEXT_DENSITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub field: PacketField,
    pub max_packets: usize,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            field: PacketField::default(),
            max_packets: DEFAULT_MAX_PACKETS,
            src: Ipv4Addr::new(10, 0, 0, 2),
            dst: Ipv4Addr::new(192, 168, 1, 1),
            src_port: 20,
            dst_port: 80,
        }
    }
}

impl NetworkConfig {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            src: self.src,
            dst: self.dst,
            src_port: self.src_port,
            dst_port: self.dst_port,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegConfig {
    pub emoji: EmojiConfig,
    pub text: TextConfig,
    pub network: NetworkConfig,
}

impl StegConfig {
    /// Loads the configuration from the default location, or defaults if
    /// the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".stegkit").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }
}
