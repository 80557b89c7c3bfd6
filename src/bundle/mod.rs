//! Multi-file payload bundles.
//!
//! Packs named files into one opaque payload before it reaches the codec and
//! splits it back afterwards. The codec itself never looks inside.
//!
//! Layout before compression (all integers big-endian):
//!
//! ```text
//! [2 bytes] entry count
//! per entry:
//!   [2 bytes] name length
//!   [N bytes] name (UTF-8, relative path with '/' separators)
//!   [4 bytes] data length
//!   [M bytes] data
//! ```

pub mod compression;

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur while packing or unpacking a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Invalid bundle: {0}")]
    Invalid(String),

    #[error("Unsafe entry name: {0}")]
    UnsafeName(String),

    #[error("Too many entries: {0} (max 65535)")]
    TooManyEntries(usize),

    #[error("Entry too large: {name} is {size} bytes")]
    EntryTooLarge { name: String, size: usize },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One named file inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// An ordered collection of named files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    entries: Vec<BundleEntry>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry after validating its name.
    pub fn add(&mut self, name: impl Into<String>, data: Vec<u8>) -> Result<(), BundleError> {
        let name = name.into();
        validate_name(&name)?;
        if data.len() > u32::MAX as usize {
            return Err(BundleError::EntryTooLarge { size: data.len(), name });
        }
        self.entries.push(BundleEntry { name, data });
        Ok(())
    }

    /// Adds a file from disk under its file name.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), BundleError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BundleError::UnsafeName(path.display().to_string()))?
            .to_string();
        let data = fs::read(path)?;
        self.add(name, data)
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes and compresses the bundle into a single payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        if self.entries.len() > u16::MAX as usize {
            return Err(BundleError::TooManyEntries(self.entries.len()));
        }

        let mut raw = Vec::new();
        raw.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            let name = entry.name.as_bytes();
            raw.extend_from_slice(&(name.len() as u16).to_be_bytes());
            raw.extend_from_slice(name);
            raw.extend_from_slice(&(entry.data.len() as u32).to_be_bytes());
            raw.extend_from_slice(&entry.data);
        }

        let packed = compression::compress(&raw)?;
        debug!(entries = self.entries.len(), raw = raw.len(), packed = packed.len(), "packed bundle");
        Ok(packed)
    }

    /// Decompresses and parses a payload produced by [`Bundle::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        let raw = compression::decompress(bytes)?;
        let mut reader = Reader { data: &raw, pos: 0 };

        let count = reader.u16()?;
        let mut bundle = Bundle::new();
        for _ in 0..count {
            let name_len = usize::from(reader.u16()?);
            let name = std::str::from_utf8(reader.take(name_len)?)
                .map_err(|_| BundleError::Invalid("entry name is not UTF-8".to_string()))?
                .to_string();
            let data_len = reader.u32()? as usize;
            let data = reader.take(data_len)?.to_vec();
            bundle.add(name, data)?;
        }

        if reader.pos != raw.len() {
            return Err(BundleError::Invalid(format!(
                "{} trailing bytes after last entry",
                raw.len() - reader.pos
            )));
        }
        Ok(bundle)
    }

    /// Writes every entry below `dir`, creating subdirectories as needed.
    /// Returns the written paths.
    pub fn unpack_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, BundleError> {
        let dir = dir.as_ref();
        let mut written = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            // Names were validated on insertion.
            let path = dir.join(&entry.name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &entry.data)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Rejects names that could escape the unpack directory.
fn validate_name(name: &str) -> Result<(), BundleError> {
    if name.is_empty() || name.len() > u16::MAX as usize || name.contains('\\') {
        return Err(BundleError::UnsafeName(name.to_string()));
    }
    let safe = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(BundleError::UnsafeName(name.to_string()));
    }
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], BundleError> {
        if self.data.len() - self.pos < n {
            return Err(BundleError::Invalid("unexpected end of bundle".to_string()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, BundleError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, BundleError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
