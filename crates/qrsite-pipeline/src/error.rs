use std::fmt::Write as _;
use std::path::PathBuf;

use qrsite_codec::CodecError;
use qrsite_frame::FrameError;
use qrsite_render::RenderError;
use serde::Serialize;

/// Errors loading, validating or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file not found: {path} (run `qrsite init` first)")]
    NotFound { path: PathBuf },

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON or does not match the model.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration violates the config schema.
    #[error("config schema violation: {0}")]
    Schema(String),

    /// A value is well-typed but unusable.
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// `init` found an existing configuration file.
    #[error("config file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// The configuration file could not be written.
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Input/output checks that run before any pipeline work.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The input file does not exist or is not a file.
    #[error("input file not found: {path}")]
    InputMissing { path: PathBuf },

    /// The input file has the wrong extension.
    #[error("expected a '{expected}' input file, got {path}")]
    WrongExtension {
        path: PathBuf,
        expected: &'static str,
    },

    /// The input file could not be read as text.
    #[error("failed to read input {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output path exists and is not a directory.
    #[error("output path exists and is not a directory: {path}")]
    OutputCollision { path: PathBuf },
}

/// The minifier rejected the page.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    /// The minified output is not valid UTF-8.
    #[error("minified output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// One shard that failed to render or scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardFailure {
    pub index: u32,
    pub message: String,
}

/// Reassembly-time integrity failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// No artifacts were found to decode.
    #[error("no .{extension} artifacts found in {dir}")]
    NoArtifacts { dir: PathBuf, extension: &'static str },

    /// One or more artifacts could not be scanned.
    #[error("failed to scan {} artifact(s): {}", .failures.len(), format_failures(.failures))]
    ScanFailed { failures: Vec<ShardFailure> },

    /// An artifact's header could not be parsed.
    #[error("artifact {index} has an invalid header: {source}")]
    Header { index: u32, source: FrameError },

    /// The filename index and the header index disagree.
    #[error("artifact named for shard {file_index} contains shard {header_index}")]
    IndexMismatch { file_index: u32, header_index: u32 },

    /// Shard 0 carries no project metadata segment.
    #[error("shard 0 carries no project metadata")]
    MissingMetadata,
}

/// Errors that can occur in the encode and decode pipelines.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("minify error: {0}")]
    Minify(#[from] MinifyError),

    #[error("encoding error: {0}")]
    Encoding(#[from] CodecError),

    /// A framed shard does not fit the renderer.
    #[error("capacity error: {0}")]
    Capacity(FrameError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The artifact directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An artifact left by an earlier build could not be removed.
    #[error("failed to remove stale artifact {path}: {source}")]
    StaleArtifact {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Some shards failed to render; the others remain on disk.
    #[error("build failed: {} of {total} shard(s) failed: {}", .failures.len(), format_failures(.failures))]
    BuildFailed {
        total: u32,
        failures: Vec<ShardFailure>,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

fn format_failures(failures: &[ShardFailure]) -> String {
    let mut out = String::new();
    for (i, failure) in failures.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "#{}: {}", failure.index, failure.message);
    }
    out
}
