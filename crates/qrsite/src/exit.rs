use std::fmt;
use std::io;

use qrsite_pipeline::{ConfigError, PipelineError, ValidationError};
use qrsite_render::RenderError;

// Exit code constants aligned with sysexits.h where one fits.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG: i32 = 78;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    match err {
        ConfigError::Read { ref source, .. } | ConfigError::Write { ref source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        other => CliError::new(CONFIG, format!("{context}: {other}")),
    }
}

pub fn validation_error(context: &str, err: ValidationError) -> CliError {
    match err {
        ValidationError::InputUnreadable { source, path } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

pub fn render_error(context: &str, err: RenderError) -> CliError {
    match err {
        RenderError::Io(source) => io_error(context, source),
        RenderError::Read { ref source, .. } | RenderError::Write { ref source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

pub fn pipeline_error(context: &str, err: PipelineError) -> CliError {
    match err {
        PipelineError::Config(err) => config_error(context, err),
        PipelineError::Validation(err) => validation_error(context, err),
        PipelineError::Render(err) => render_error(context, err),
        PipelineError::OutputDir { path, source } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        PipelineError::StaleArtifact { path, source } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        PipelineError::Minify(_)
        | PipelineError::Encoding(_)
        | PipelineError::Capacity(_)
        | PipelineError::Frame(_)
        | PipelineError::Decode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        PipelineError::BuildFailed { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
