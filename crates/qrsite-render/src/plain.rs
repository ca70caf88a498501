use std::path::Path;

use crate::error::{RenderError, Result};
use crate::traits::Renderer;

/// Writes payloads verbatim to `.txt` files.
///
/// Useful for inspecting framed shards and for deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainRenderer {
    max_payload: usize,
}

impl PlainRenderer {
    pub fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Renderer for PlainRenderer {
    fn render(&self, payload: &[u8], path: &Path) -> Result<()> {
        if payload.len() > self.max_payload {
            return Err(RenderError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }
        std::fs::write(path, payload).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn scan(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn max_payload(&self) -> usize {
        self.max_payload
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
