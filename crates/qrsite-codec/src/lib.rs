//! Payload codecs for qrsite.
//!
//! Two reversible text transforms sit in front of shard framing:
//! - [`recode`] swaps well-known HTML/JS literals for two-character sentinel codes
//! - [`compress`] squeezes the recoded text into an ASCII-safe compressed stream
//!
//! Both stages guarantee an exact round trip. Neither knows anything about
//! shards or rendering.

pub mod compress;
pub mod error;
pub mod recode;

pub use compress::{Compressor, ZstdCompressor, DEFAULT_LEVEL};
pub use error::{CodecError, Result};
pub use recode::{decode, encode, TokenRule, TokenTable, CODE_BASE, SENTINEL};
