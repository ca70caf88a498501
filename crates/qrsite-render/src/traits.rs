use std::path::Path;

use crate::error::Result;

/// Converts a framed shard payload into an artifact file and back.
///
/// Implementations hold no per-shard state: one renderer is shared by every
/// worker of a build and `render`/`scan` may run concurrently.
pub trait Renderer: Send + Sync {
    /// Write `payload` as an artifact at `path`.
    fn render(&self, payload: &[u8], path: &Path) -> Result<()>;

    /// Read the payload back out of the artifact at `path`.
    fn scan(&self, path: &Path) -> Result<Vec<u8>>;

    /// Largest payload, in bytes, a single artifact can hold.
    fn max_payload(&self) -> usize;

    /// File extension of produced artifacts, without the dot.
    fn extension(&self) -> &'static str;
}
