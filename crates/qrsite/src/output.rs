use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use qrsite_frame::ProjectMetadata;
use qrsite_pipeline::{ArtifactOutcome, BuildReport, DecodedSite, StageStats};
use serde::Serialize;

const BUILD_SCHEMA_ID: &str = "https://schemas.3leaps.dev/qrsite/cli/v1/build-report.schema.json";
const DECODE_SCHEMA_ID: &str = "https://schemas.3leaps.dev/qrsite/cli/v1/decode-report.schema.json";
const INIT_SCHEMA_ID: &str = "https://schemas.3leaps.dev/qrsite/cli/v1/init-report.schema.json";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    schema_id: &'a str,
    output_dir: &'a Path,
    total: u32,
    failed: usize,
    stats: &'a StageStats,
    artifacts: &'a [ArtifactOutcome],
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    schema_id: &'a str,
    source_dir: &'a Path,
    output: &'a Path,
    total: u32,
    stream_len: usize,
    bytes: usize,
    metadata: &'a ProjectMetadata,
}

#[derive(Serialize)]
struct InitOutput<'a> {
    schema_id: &'a str,
    path: &'a Path,
    overwritten: bool,
}

pub fn print_build_report(report: &BuildReport, format: OutputFormat) {
    let failed = report.artifacts.iter().filter(|a| !a.is_ok()).count();
    match format {
        OutputFormat::Json => {
            let out = BuildOutput {
                schema_id: BUILD_SCHEMA_ID,
                output_dir: &report.output_dir,
                total: report.total,
                failed,
                stats: &report.stats,
                artifacts: &report.artifacts,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "SIZE", "PATH", "STATUS"]);
            for artifact in &report.artifacts {
                table.add_row(vec![
                    artifact.index.to_string(),
                    artifact.wire_size.to_string(),
                    artifact.path.display().to_string(),
                    artifact
                        .error
                        .clone()
                        .unwrap_or_else(|| "ok".to_string()),
                ]);
            }
            println!("{table}");
            println!(
                "{} shard(s), {failed} failed, {} -> {} bytes",
                report.total, report.stats.input_bytes, report.stats.stream_len
            );
        }
        OutputFormat::Pretty => {
            println!("qrsite build\n");
            println!("  Output:     {}", report.output_dir.display());
            println!("  Shards:     {} ({failed} failed)", report.total);
            println!("  Capacity:   {}", report.stats.shard_capacity);
            println!("  Input:      {} bytes", report.stats.input_bytes);
            println!("  Minified:   {} bytes", report.stats.minified_bytes);
            println!("  Recoded:    {} bytes", report.stats.recoded_bytes);
            println!("  Stream:     {} chars", report.stats.stream_len);
            for artifact in report.artifacts.iter().filter(|a| !a.is_ok()) {
                println!(
                    "  ! shard {}: {}",
                    artifact.index,
                    artifact.error.as_deref().unwrap_or_default()
                );
            }
        }
        OutputFormat::Raw => {
            for artifact in &report.artifacts {
                println!("{}", artifact.path.display());
            }
        }
    }
}

pub fn print_decode_report(site: &DecodedSite, source_dir: &Path, output: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodeOutput {
                schema_id: DECODE_SCHEMA_ID,
                source_dir,
                output,
                total: site.total,
                stream_len: site.stream_len,
                bytes: site.text.len(),
                metadata: &site.metadata,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let meta = &site.metadata;
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SHARDS", "BYTES", "APP", "AUTHOR", "LICENSE", "OUTPUT"])
                .add_row(vec![
                    site.total.to_string(),
                    site.text.len().to_string(),
                    meta.app_name.clone(),
                    meta.author.clone(),
                    meta.license.clone(),
                    output.display().to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let meta = &site.metadata;
            println!("qrsite decode\n");
            println!("  Source:     {}", source_dir.display());
            println!("  Output:     {}", output.display());
            println!("  Shards:     {}", site.total);
            println!("  Bytes:      {}", site.text.len());
            println!("  App:        {}", meta.app_name);
            println!("  Author:     {}", meta.author);
            println!("  License:    {}", meta.license);
        }
        OutputFormat::Raw => println!("{}", output.display()),
    }
}

pub fn print_init_report(path: &Path, overwritten: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = InitOutput {
                schema_id: INIT_SCHEMA_ID,
                path,
                overwritten,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let verb = if overwritten { "overwrote" } else { "created" };
            println!("{verb} {}", path.display());
        }
        OutputFormat::Raw => println!("{}", path.display()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
