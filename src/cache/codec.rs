//! Compression Codec Module
//!
//! Reversible transform applied to string-like values before storage.

use std::fmt;

use crate::error::{CacheError, Result};

// == Compression Codec ==
/// Encodes text for storage and decodes it on read.
pub trait CompressionCodec: Send + Sync + fmt::Debug {
    /// Compresses text into bytes.
    fn encode(&self, text: &str) -> Result<Vec<u8>>;

    /// Restores text produced by [`CompressionCodec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<String>;
}

// == LZ4 Codec ==
/// LZ4 block compression with the uncompressed length prepended.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Codec {
    /// High-compression level, None for the fast default mode
    level: Option<i32>,
}

impl Lz4Codec {
    /// Codec using the default (fast) LZ4 mode.
    pub fn new() -> Self {
        Self { level: None }
    }

    /// Codec using high-compression mode at the given level.
    pub fn high_compression(level: i32) -> Self {
        Self { level: Some(level) }
    }
}

impl Default for Lz4Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionCodec for Lz4Codec {
    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mode = self.level.map(lz4::block::CompressionMode::HIGHCOMPRESSION);
        lz4::block::compress(text.as_bytes(), mode, true)
            .map_err(|e| CacheError::Codec(format!("LZ4 compression error: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        let raw = lz4::block::decompress(bytes, None)
            .map_err(|e| CacheError::Codec(format!("LZ4 decompression error: {}", e)))?;
        String::from_utf8(raw).map_err(|e| CacheError::Codec(format!("decoded text is not UTF-8: {}", e)))
    }
}
