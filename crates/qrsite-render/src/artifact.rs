use std::path::{Path, PathBuf};

use crate::error::Result;

/// Filename prefix of every artifact.
pub const ARTIFACT_PREFIX: &str = "qrcode_";

/// An artifact file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Shard index parsed from the filename.
    pub index: u32,
    pub path: PathBuf,
}

/// `<dir>/qrcode_<index>.<extension>`
pub fn artifact_path(dir: &Path, index: u32, extension: &str) -> PathBuf {
    dir.join(format!("{ARTIFACT_PREFIX}{index}.{extension}"))
}

/// Parse the shard index out of an artifact filename.
///
/// Returns `None` for anything that is not exactly `qrcode_<digits>.<extension>`.
pub fn parse_artifact_index(file_name: &str, extension: &str) -> Option<u32> {
    let stem = file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(extension)?
        .strip_suffix('.')?;

    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// List every artifact with `extension` in `dir`, in no particular order.
///
/// Files that do not match the artifact naming scheme are skipped.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(index) = parse_artifact_index(&file_name.to_string_lossy(), extension) else {
            continue;
        };
        artifacts.push(Artifact {
            index,
            path: entry.path(),
        });
    }

    tracing::debug!(
        dir = %dir.display(),
        count = artifacts.len(),
        "discovered artifacts"
    );
    Ok(artifacts)
}
