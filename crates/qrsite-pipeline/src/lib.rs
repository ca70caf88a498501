//! Encode and decode pipelines for qrsite.
//!
//! Encode runs strictly in sequence, then renders in parallel:
//!
//! ```text
//! page ─▶ minify ─▶ recode ─▶ compress ─▶ split ─▶ frame ─▶ ┬▶ render(0)
//!                                                          ├▶ render(1)
//!                                                          └▶ render(n)
//! ```
//!
//! Decode scans every artifact in parallel, then validates, joins,
//! decompresses and un-recodes on one thread.
//!
//! All stages read one immutable [`SiteConfig`] passed by reference.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod minify;
mod pool;
pub mod validate;

pub use config::{
    MinifyConfig, MinifyTarget, RenderConfig, RendererKind, SiteConfig, CONFIG_FILE_NAME,
};
pub use decode::{DecodePipeline, DecodedSite};
pub use encode::{ArtifactOutcome, BuildPipeline, BuildReport, PreparedBuild, StageStats};
pub use error::{
    ConfigError, DecodeError, MinifyError, PipelineError, Result, ShardFailure, ValidationError,
};
pub use minify::{HtmlMinifier, Minifier};
pub use validate::validate_paths;
