use std::path::Path;

use crate::config::SiteConfig;
use crate::error::ValidationError;

/// Required input extension.
pub const INPUT_EXTENSION: &str = "html";

/// Check the configured paths before any pipeline work.
///
/// The input must be an existing `.html` file. The output may be missing or
/// a directory; anything else at that path is a collision.
pub fn validate_paths(config: &SiteConfig) -> Result<(), ValidationError> {
    validate_input(&config.input_path)?;
    validate_output(&config.output_path)
}

fn validate_input(path: &Path) -> Result<(), ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::InputMissing {
            path: path.to_path_buf(),
        });
    }
    let ext = path.extension().and_then(|e| e.to_str());
    if ext != Some(INPUT_EXTENSION) {
        return Err(ValidationError::WrongExtension {
            path: path.to_path_buf(),
            expected: INPUT_EXTENSION,
        });
    }
    Ok(())
}

fn validate_output(path: &Path) -> Result<(), ValidationError> {
    if path.exists() && !path.is_dir() {
        return Err(ValidationError::OutputCollision {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
