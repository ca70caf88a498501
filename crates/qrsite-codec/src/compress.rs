//! Lossless compression adapter.
//!
//! The pipeline only depends on the [`Compressor`] trait. The shipped
//! implementation wraps a Zstandard frame in standard base64 so the stream is
//! plain ASCII and survives QR byte mode and text-based transports unchanged.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use zstd::stream::Encoder;

use crate::error::{CodecError, Result};

/// Default zstd level. Payloads are small, so favour ratio over speed.
pub const DEFAULT_LEVEL: i32 = 19;

/// A reversible text-to-stream transform.
///
/// `decompress(compress(x)) == x` must hold for every `x`, including the
/// empty string.
pub trait Compressor: Send + Sync {
    /// Compress `text` into an ASCII stream.
    fn compress(&self, text: &str) -> Result<String>;

    /// Restore the text produced by [`Compressor::compress`].
    fn decompress(&self, stream: &str) -> Result<String>;
}

/// Zstandard + base64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&self, text: &str) -> Result<String> {
        let mut frame = Vec::with_capacity(text.len() / 2 + 16);

        let mut encoder = Encoder::new(&mut frame, self.level)
            .map_err(|e| CodecError::Compress(e.to_string()))?;
        encoder
            .write_all(text.as_bytes())
            .map_err(|e| CodecError::Compress(e.to_string()))?;
        // `finish` writes the frame epilogue; without it the frame is truncated.
        encoder
            .finish()
            .map_err(|e| CodecError::Compress(e.to_string()))?;

        let stream = STANDARD.encode(&frame);
        tracing::debug!(
            input_len = text.len(),
            frame_len = frame.len(),
            stream_len = stream.len(),
            level = self.level,
            "compressed payload"
        );
        Ok(stream)
    }

    fn decompress(&self, stream: &str) -> Result<String> {
        let frame = STANDARD.decode(stream)?;

        let mut out = Vec::with_capacity(frame.len().saturating_mul(4));
        zstd::stream::copy_decode(frame.as_slice(), &mut out)
            .map_err(|e| CodecError::Decompress(e.to_string()))?;

        Ok(String::from_utf8(out)?)
    }
}
