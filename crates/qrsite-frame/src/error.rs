/// Errors that can occur while splitting, framing or reassembling shards.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Shard capacity must be at least one character.
    #[error("shard capacity must be greater than zero")]
    InvalidCapacity,

    /// The stream needs more shards than the header can number.
    #[error("too many shards ({total}, max {max})")]
    TooManyShards { total: usize, max: usize },

    /// The framed payload exceeds what the renderer can hold.
    #[error("shard {index} payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { index: u32, size: usize, max: usize },

    /// The shard header could not be parsed.
    #[error("invalid shard header: {0}")]
    InvalidHeader(String),

    /// A project metadata field cannot be framed.
    #[error("invalid project metadata {field}: {reason}")]
    InvalidMetadata { field: &'static str, reason: String },

    /// Project metadata was found on a shard other than shard 0.
    #[error("unexpected project metadata on shard {index}")]
    UnexpectedMetadata { index: u32 },

    /// The shard body or metadata is not valid UTF-8.
    #[error("shard content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A shard index is not below its total.
    #[error("shard index {index} out of range (total {total})")]
    IndexOutOfRange { index: u32, total: u32 },

    /// Shards disagree on the shard count.
    #[error("shard {index} reports total {found}, expected {expected}")]
    InconsistentTotal { index: u32, expected: u32, found: u32 },

    /// The same index appears more than once.
    #[error("duplicate shards: {indices:?}")]
    DuplicateShards { indices: Vec<u32> },

    /// One or more indices in `[0, total)` are absent.
    #[error("missing shards {missing:?} of {total}")]
    MissingShards { total: u32, missing: Vec<u32> },
}

pub type Result<T> = std::result::Result<T, FrameError>;
