/// Errors that can occur while recoding or compressing a payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A token table rule has an empty pattern.
    #[error("token rule {index} has an empty pattern")]
    EmptyPattern { index: usize },

    /// A token table pattern contains the sentinel marker or a code character.
    #[error("token pattern {pattern:?} contains a reserved sentinel character")]
    ReservedCharacter { pattern: String },

    /// An earlier pattern is a substring of a later one and would shadow it.
    #[error("token pattern {earlier:?} shadows later pattern {later:?}; list the longer pattern first")]
    ShadowedPattern { earlier: String, later: String },

    /// The token table has more rules than there are sentinel codes.
    #[error("token table too large ({len} rules, max {max})")]
    TableTooLarge { len: usize, max: usize },

    /// A sentinel marker is followed by a character that maps to no rule.
    #[error("unknown sentinel code {code:?} at byte offset {offset}")]
    UnknownSentinel { code: char, offset: usize },

    /// The recoded text ends with an unpaired sentinel marker.
    #[error("truncated sentinel at byte offset {offset}")]
    TruncatedSentinel { offset: usize },

    /// The underlying compressor failed.
    #[error("compression failed: {0}")]
    Compress(String),

    /// The underlying decompressor failed.
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// The compressed stream is not valid base64.
    #[error("invalid compressed stream: {0}")]
    InvalidStream(#[from] base64::DecodeError),

    /// The decompressed bytes are not valid UTF-8.
    #[error("decompressed payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
