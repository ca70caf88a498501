use std::path::PathBuf;

use qrsite_pipeline::{ConfigError, DecodePipeline, RenderConfig, SiteConfig};
use qrsite_render::QrRenderer;

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{config_error, io_error, pipeline_error, CliResult, SUCCESS};
use crate::output::{print_decode_report, print_raw};

/// Artifact directory used when there is no config to read it from.
const FALLBACK_DIR: &str = "qrcode";

pub fn run(args: DecodeArgs, ctx: &Context) -> CliResult<i32> {
    let (decoder, configured_dir) = match SiteConfig::load(&ctx.config_path) {
        Ok(config) => (
            DecodePipeline::from_config(&config),
            config.output_path.clone(),
        ),
        Err(ConfigError::NotFound { .. }) => {
            tracing::debug!(
                path = %ctx.config_path.display(),
                "no config, decoding QR artifacts with defaults"
            );
            let decoder = DecodePipeline::new(QrRenderer::default())
                .with_workers(RenderConfig::default().workers());
            (decoder, PathBuf::from(FALLBACK_DIR))
        }
        Err(err) => return Err(config_error("decode", err)),
    };
    let dir = args.dir.unwrap_or(configured_dir);

    let site = decoder
        .decode_dir(&dir)
        .map_err(|err| pipeline_error("decode", err))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, site.text.as_bytes())
                .map_err(|err| io_error(&format!("decode: write {}", path.display()), err))?;
            print_decode_report(&site, &dir, &path, ctx.format);
        }
        None => print_raw(site.text.as_bytes()),
    }
    Ok(SUCCESS)
}
