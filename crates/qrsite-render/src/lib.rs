//! Artifact rendering for framed shards.
//!
//! A [`Renderer`] turns a framed shard payload into a file and scans it back.
//! Artifacts are named `qrcode_<index>.<ext>` so the shard index is known
//! from the filename alone, whatever order the files are discovered in.
//!
//! - [`QrRenderer`] writes QR code PNGs
//! - [`PlainRenderer`] writes the payload verbatim, for debugging and tests

pub mod artifact;
pub mod error;
pub mod plain;
pub mod qr;
pub mod traits;

pub use artifact::{artifact_path, discover, parse_artifact_index, Artifact, ARTIFACT_PREFIX};
pub use error::{RenderError, Result};
pub use plain::PlainRenderer;
pub use qr::{ErrorCorrection, QrRenderer, DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE};
pub use traits::Renderer;
