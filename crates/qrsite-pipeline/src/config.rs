use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use qrsite_codec::DEFAULT_LEVEL;
use qrsite_frame::ProjectMetadata;
use qrsite_render::{
    ErrorCorrection, PlainRenderer, QrRenderer, Renderer, DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Default configuration file name, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "qrs-config.json";

/// JSON Schema the raw configuration must satisfy before deserialising.
const CONFIG_SCHEMA: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "type": "object",
    "required": ["app_name", "author", "license", "input_path", "output_path"],
    "properties": {
        "app_name": { "type": "string", "pattern": "^[^/]*$" },
        "author": { "type": "string", "pattern": "^[^/]*$" },
        "license": { "type": "string" },
        "input_path": { "type": "string", "minLength": 1 },
        "output_path": { "type": "string", "minLength": 1 },
        "minify_config": {
            "type": "object",
            "properties": {
                "html": { "$ref": "#/$defs/target" },
                "javascript": { "$ref": "#/$defs/target" },
                "css": { "$ref": "#/$defs/target" }
            }
        },
        "render": {
            "type": "object",
            "properties": {
                "kind": { "enum": ["qr", "plain"] },
                "error_correction": { "enum": ["L", "M", "Q", "H"] },
                "shard_capacity": { "type": ["integer", "null"], "minimum": 1 },
                "module_size": { "type": "integer", "minimum": 1 },
                "quiet_zone": { "type": "integer", "minimum": 0 },
                "workers": { "type": ["integer", "null"], "minimum": 1 }
            }
        },
        "compression_level": { "type": "integer", "minimum": 1, "maximum": 22 }
    },
    "$defs": {
        "target": {
            "type": "object",
            "properties": {
                "minify": { "type": "boolean" },
                "options": { "type": "object" }
            }
        }
    }
}"##;

/// The whole build configuration. Loaded once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub app_name: String,
    pub author: String,
    pub license: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub minify_config: MinifyConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

/// Per-language minification switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinifyConfig {
    #[serde(default)]
    pub html: MinifyTarget,
    #[serde(default)]
    pub javascript: MinifyTarget,
    #[serde(default)]
    pub css: MinifyTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinifyTarget {
    #[serde(default = "default_true")]
    pub minify: bool,
    /// Library options. Older configs name this after the minifier used.
    #[serde(
        default,
        alias = "htmlminifier_options",
        alias = "uglifyjs_options",
        alias = "csso_options"
    )]
    pub options: Map<String, Value>,
}

impl Default for MinifyTarget {
    fn default() -> Self {
        Self {
            minify: true,
            options: Map::new(),
        }
    }
}

impl MinifyTarget {
    /// Read a boolean option, falling back to `default` when absent or not a bool.
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.options
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// Which artifact renderer to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Qr,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub kind: RendererKind,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
    /// Characters of compressed stream per shard. Defaults per level.
    #[serde(default)]
    pub shard_capacity: Option<usize>,
    #[serde(default = "default_module_size")]
    pub module_size: u32,
    #[serde(default = "default_quiet_zone")]
    pub quiet_zone: u32,
    /// Render/scan worker threads. Defaults to available parallelism, max 8.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::Qr,
            error_correction: ErrorCorrection::L,
            shard_capacity: None,
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
            workers: None,
        }
    }
}

impl RenderConfig {
    /// Shard capacity, leaving room below the symbol limit for the header
    /// and shard 0 metadata.
    pub fn capacity(&self) -> usize {
        self.shard_capacity.unwrap_or(match self.error_correction {
            ErrorCorrection::L => 2048,
            ErrorCorrection::M => 1600,
            ErrorCorrection::Q => 1100,
            ErrorCorrection::H => 850,
        })
    }

    /// Build the configured renderer.
    ///
    /// The plain renderer enforces the same payload ceiling as the QR level,
    /// so a build that passes with one passes with the other.
    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self.kind {
            RendererKind::Qr => Box::new(
                QrRenderer::new(self.error_correction)
                    .with_module_size(self.module_size)
                    .with_quiet_zone(self.quiet_zone),
            ),
            RendererKind::Plain => Box::new(PlainRenderer::new(self.error_correction.max_payload())),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(8)
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_compression_level() -> i32 {
    DEFAULT_LEVEL
}

fn default_module_size() -> u32 {
    DEFAULT_MODULE_SIZE
}

fn default_quiet_zone() -> u32 {
    DEFAULT_QUIET_ZONE
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            app_name: "my-site".to_string(),
            author: String::new(),
            license: "MIT".to_string(),
            input_path: PathBuf::from("public/index.html"),
            output_path: PathBuf::from("qrcode"),
            minify_config: MinifyConfig::default(),
            render: RenderConfig::default(),
            compression_level: DEFAULT_LEVEL,
        }
    }
}

impl SiteConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config = Self::from_json(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse, schema-check and validate a configuration document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw)?;
        validate_schema(&value)?;
        let config: SiteConfig = serde_json::from_value(value)?;
        config.check()?;
        Ok(config)
    }

    /// Write the default configuration to `path`.
    ///
    /// Fails with [`ConfigError::AlreadyExists`] unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<Self, ConfigError> {
        let config = Self::default();
        let mut json = serde_json::to_string_pretty(&config)?;
        json.push('\n');

        let mut options = std::fs::OpenOptions::new();
        options.write(true);
        if force {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(path).map_err(|source| {
            if source.kind() == ErrorKind::AlreadyExists {
                ConfigError::AlreadyExists {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        file.write_all(json.as_bytes())
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Metadata framed onto shard 0.
    pub fn metadata(&self) -> ProjectMetadata {
        ProjectMetadata::new(&self.app_name, &self.author, &self.license)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.metadata()
            .validate()
            .map_err(|err| ConfigError::Invalid {
                field: "metadata",
                reason: err.to_string(),
            })?;
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigError::Invalid {
                field: "compression_level",
                reason: format!("{} is outside 1..=22", self.compression_level),
            });
        }
        if self.render.shard_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "render.shard_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.render.workers == Some(0) {
            return Err(ConfigError::Invalid {
                field: "render.workers",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_schema(value: &Value) -> Result<(), ConfigError> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| ConfigError::Schema(format!("config schema failed to compile: {err}")))?;

    let mut errors = validator.iter_errors(value);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(ConfigError::Schema(message));
    }
    Ok(())
}
