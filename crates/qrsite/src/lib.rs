//! Turn a web page into a set of QR codes and back.
//!
//! The page is minified, recoded, compressed, split into shards and framed
//! with a positional header, then every shard is rendered as one QR code.
//! Decoding scans the codes in any order and reverses every step.
//!
//! # Crate Structure
//!
//! - [`codec`]: Recoding and compression of the page text
//! - [`frame`]: Shard splitting, joining and header framing
//! - [`render`]: QR code and plain-text artifact renderers
//! - [`pipeline`]: Config, build and decode pipelines

/// Re-export codec types.
pub mod codec {
    pub use qrsite_codec::*;
}

/// Re-export frame types.
pub mod frame {
    pub use qrsite_frame::*;
}

/// Re-export render types.
pub mod render {
    pub use qrsite_render::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use qrsite_pipeline::*;
}
