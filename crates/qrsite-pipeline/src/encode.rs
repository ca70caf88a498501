//! Build pipeline: page in, artifacts out.

use std::path::{Path, PathBuf};

use qrsite_codec::{recode, Compressor, TokenTable, ZstdCompressor};
use qrsite_frame::{check_capacity, frame, split, FramedShard, ProjectMetadata};
use qrsite_render::{artifact_path, discover, Renderer};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::{PipelineError, Result, ShardFailure, ValidationError};
use crate::minify::{HtmlMinifier, Minifier};
use crate::pool::run_pool;
use crate::validate::validate_paths;

/// Sizes observed at each sequential stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    /// Input page, bytes.
    pub input_bytes: usize,
    /// After minification, bytes.
    pub minified_bytes: usize,
    /// After recoding, bytes.
    pub recoded_bytes: usize,
    /// Compressed stream, characters.
    pub stream_len: usize,
    pub shard_capacity: usize,
    pub shards: u32,
}

/// Framed shards ready to render.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub framed: Vec<FramedShard>,
    pub stats: StageStats,
}

/// Result of rendering one shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub index: u32,
    pub path: PathBuf,
    pub wire_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-shard outcome of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub total: u32,
    pub artifacts: Vec<ArtifactOutcome>,
    pub stats: StageStats,
}

impl BuildReport {
    pub fn failures(&self) -> Vec<ShardFailure> {
        self.artifacts
            .iter()
            .filter_map(|a| {
                a.error.as_ref().map(|message| ShardFailure {
                    index: a.index,
                    message: message.clone(),
                })
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.artifacts.iter().all(ArtifactOutcome::is_ok)
    }

    /// Turn any failed shard into [`PipelineError::BuildFailed`].
    pub fn ensure_success(self) -> Result<Self> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(PipelineError::BuildFailed {
                total: self.total,
                failures,
            })
        }
    }
}

/// Encode pipeline bound to one configuration.
///
/// Every stage is swappable for tests; [`BuildPipeline::new`] wires the
/// configured defaults.
pub struct BuildPipeline<'a> {
    config: &'a SiteConfig,
    table: TokenTable,
    compressor: Box<dyn Compressor>,
    minifier: Box<dyn Minifier>,
    renderer: Box<dyn Renderer>,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            table: TokenTable::html_default(),
            compressor: Box::new(ZstdCompressor::new(config.compression_level)),
            minifier: Box::new(HtmlMinifier::from_config(&config.minify_config)),
            renderer: config.render.renderer(),
        }
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Box::new(minifier);
        self
    }

    pub fn with_table(mut self, table: TokenTable) -> Self {
        self.table = table;
        self
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Run the sequential stages: minify, recode, compress, split, frame.
    ///
    /// Fails before anything touches disk if a framed shard exceeds the
    /// renderer's payload ceiling.
    pub fn prepare(&self, page: &str, metadata: &ProjectMetadata) -> Result<PreparedBuild> {
        metadata.validate()?;
        let capacity = self.config.render.capacity();

        let minified = self.minifier.minify(page)?;
        tracing::debug!(before = page.len(), after = minified.len(), "minified");

        let recoded = recode::encode(&minified, &self.table);

        let stream = self.compressor.compress(&recoded)?;

        let set = split(&stream, capacity)?;
        let framed = frame(&set, metadata)?;

        let max = self.renderer.max_payload();
        for shard in &framed {
            check_capacity(shard, max).map_err(PipelineError::Capacity)?;
        }

        let stats = StageStats {
            input_bytes: page.len(),
            minified_bytes: minified.len(),
            recoded_bytes: recoded.len(),
            stream_len: stream.chars().count(),
            shard_capacity: capacity,
            shards: set.total(),
        };
        Ok(PreparedBuild { framed, stats })
    }

    /// Render every framed shard into `dir` on the worker pool.
    ///
    /// A failed shard does not stop the others; failures are recorded in
    /// the report. Artifacts from an earlier build are removed first, so the
    /// directory only ever holds the current shard set.
    pub fn render(&self, prepared: &PreparedBuild, dir: &Path) -> Result<BuildReport> {
        std::fs::create_dir_all(dir).map_err(|source| PipelineError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let extension = self.renderer.extension();
        self.clear_stale(dir, extension)?;

        let workers = self.config.render.workers();
        let artifacts = run_pool(&prepared.framed, workers, |shard| {
            let path = artifact_path(dir, shard.index, extension);
            let error = match self.renderer.render(&shard.payload, &path) {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(index = shard.index, error = %err, "shard failed to render");
                    Some(err.to_string())
                }
            };
            ArtifactOutcome {
                index: shard.index,
                path,
                wire_size: shard.wire_size(),
                error,
            }
        });

        let report = BuildReport {
            output_dir: dir.to_path_buf(),
            total: prepared.stats.shards,
            artifacts,
            stats: prepared.stats.clone(),
        };
        tracing::info!(
            output_dir = %dir.display(),
            total = report.total,
            failed = report.failures().len(),
            workers,
            "rendered shard set"
        );
        Ok(report)
    }

    fn clear_stale(&self, dir: &Path, extension: &str) -> Result<()> {
        let stale = discover(dir, extension)?;
        for artifact in &stale {
            std::fs::remove_file(&artifact.path).map_err(|source| {
                PipelineError::StaleArtifact {
                    path: artifact.path.clone(),
                    source,
                }
            })?;
        }
        if !stale.is_empty() {
            tracing::debug!(dir = %dir.display(), removed = stale.len(), "removed stale artifacts");
        }
        Ok(())
    }

    /// Validate paths, read the input page, prepare and render.
    pub fn build(&self) -> Result<BuildReport> {
        validate_paths(self.config)?;

        let input = &self.config.input_path;
        let page = std::fs::read_to_string(input).map_err(|source| {
            ValidationError::InputUnreadable {
                path: input.clone(),
                source,
            }
        })?;

        let prepared = self.prepare(&page, &self.config.metadata())?;
        self.render(&prepared, &self.config.output_path)
    }
}
