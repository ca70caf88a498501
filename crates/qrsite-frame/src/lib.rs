//! Shard splitting and framing.
//!
//! A compressed stream is cut into fixed-capacity [`Shard`]s and every shard
//! is framed with a fixed-width positional header:
//! - `M<len:4>:<app>/<author>/<license>/` project metadata, shard 0 only
//! - `<index:5>/<total:5>-` position header, every shard
//!
//! Every header field is fixed width or length prefixed, so the body may
//! contain any character, including `/` and `-`.

pub mod chunk;
pub mod codec;
pub mod error;
pub mod shard;

pub use chunk::{join, split};
pub use codec::{
    check_capacity, encode_shard, frame, unframe, FramedShard, UnframedShard, HEADER_SIZE,
    MAX_METADATA_LEN, MAX_SHARDS, META_TAG,
};
pub use error::{FrameError, Result};
pub use shard::{ProjectMetadata, Shard, ShardSet};
