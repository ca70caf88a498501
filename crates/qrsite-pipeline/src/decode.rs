//! Decode pipeline: artifacts in, page out.
//!
//! Scans run on the worker pool; everything after the scan barrier is
//! single-threaded:
//!
//! ```text
//! scan all ─▶ parse headers ─▶ validate + sort ─▶ join ─▶ decompress ─▶ un-recode
//! ```

use std::path::Path;

use qrsite_codec::{recode, Compressor, TokenTable, ZstdCompressor};
use qrsite_frame::{join, unframe, ProjectMetadata, UnframedShard};
use qrsite_render::{discover, Artifact, Renderer};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::{DecodeError, Result, ShardFailure};
use crate::pool::run_pool;

/// A page recovered from a shard set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSite {
    /// The minified page.
    pub text: String,
    /// Project metadata from shard 0.
    pub metadata: ProjectMetadata,
    pub total: u32,
    /// Length of the reassembled compressed stream, characters.
    pub stream_len: usize,
}

pub struct DecodePipeline {
    table: TokenTable,
    compressor: Box<dyn Compressor>,
    renderer: Box<dyn Renderer>,
    workers: usize,
}

impl DecodePipeline {
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Self {
            table: TokenTable::html_default(),
            compressor: Box::new(ZstdCompressor::default()),
            renderer: Box::new(renderer),
            workers: 1,
        }
    }

    /// Scanner and worker count from the render section of `config`.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            table: TokenTable::html_default(),
            compressor: Box::new(ZstdCompressor::new(config.compression_level)),
            renderer: config.render.renderer(),
            workers: config.render.workers(),
        }
    }

    pub fn with_table(mut self, table: TokenTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Discover and scan every artifact in `dir`.
    ///
    /// Every artifact is scanned even if some fail; any failure is reported
    /// with all failing indices.
    pub fn scan_all(&self, dir: &Path) -> Result<Vec<(Artifact, Vec<u8>)>> {
        let extension = self.renderer.extension();
        let artifacts = discover(dir, extension)?;
        if artifacts.is_empty() {
            return Err(DecodeError::NoArtifacts {
                dir: dir.to_path_buf(),
                extension,
            }
            .into());
        }

        let scanned = run_pool(&artifacts, self.workers, |artifact| {
            self.renderer.scan(&artifact.path)
        });

        let mut payloads = Vec::with_capacity(artifacts.len());
        let mut failures = Vec::new();
        for (artifact, result) in artifacts.into_iter().zip(scanned) {
            match result {
                Ok(payload) => payloads.push((artifact, payload)),
                Err(err) => {
                    tracing::warn!(index = artifact.index, error = %err, "artifact failed to scan");
                    failures.push(ShardFailure {
                        index: artifact.index,
                        message: err.to_string(),
                    });
                }
            }
        }
        if !failures.is_empty() {
            failures.sort_by_key(|f| f.index);
            return Err(DecodeError::ScanFailed { failures }.into());
        }
        Ok(payloads)
    }

    /// Reassemble the page rendered into `dir`.
    pub fn decode_dir(&self, dir: &Path) -> Result<DecodedSite> {
        let scanned = self.scan_all(dir)?;

        let mut unframed = Vec::with_capacity(scanned.len());
        for (artifact, payload) in scanned {
            let shard = unframe(&payload).map_err(|source| DecodeError::Header {
                index: artifact.index,
                source,
            })?;
            if shard.shard.index != artifact.index {
                return Err(DecodeError::IndexMismatch {
                    file_index: artifact.index,
                    header_index: shard.shard.index,
                }
                .into());
            }
            unframed.push(shard);
        }

        let site = self.assemble(unframed)?;
        tracing::info!(
            dir = %dir.display(),
            total = site.total,
            bytes = site.text.len(),
            "decoded shard set"
        );
        Ok(site)
    }

    /// Reassemble from raw framed payloads in any order.
    pub fn decode_payloads<B: AsRef<[u8]>>(&self, payloads: &[B]) -> Result<DecodedSite> {
        let mut unframed = Vec::with_capacity(payloads.len());
        for (position, payload) in payloads.iter().enumerate() {
            let shard = unframe(payload.as_ref()).map_err(|source| DecodeError::Header {
                index: position as u32,
                source,
            })?;
            unframed.push(shard);
        }
        self.assemble(unframed)
    }

    fn assemble(&self, unframed: Vec<UnframedShard>) -> Result<DecodedSite> {
        let mut metadata = None;
        let mut shards = Vec::with_capacity(unframed.len());
        for item in unframed {
            if item.shard.index == 0 {
                metadata = item.metadata;
            }
            shards.push(item.shard);
        }

        let total = shards.len() as u32;
        let stream = join(shards)?;
        let metadata = metadata.ok_or(DecodeError::MissingMetadata)?;
        let recoded = self.compressor.decompress(&stream)?;
        let text = recode::decode(&recoded, &self.table)?;

        Ok(DecodedSite {
            text,
            metadata,
            total,
            stream_len: stream.chars().count(),
        })
    }
}
