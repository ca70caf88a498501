use qrsite_pipeline::{BuildPipeline, SiteConfig};

use crate::cmd::{BuildArgs, Context};
use crate::exit::{config_error, pipeline_error, CliResult, SUCCESS};
use crate::output::print_build_report;

pub fn run(_args: BuildArgs, ctx: &Context) -> CliResult<i32> {
    let config = SiteConfig::load(&ctx.config_path).map_err(|err| config_error("build", err))?;

    let report = BuildPipeline::new(&config)
        .build()
        .map_err(|err| pipeline_error("build", err))?;

    // Print every outcome, including failed shards, before failing.
    print_build_report(&report, ctx.format);
    report
        .ensure_success()
        .map_err(|err| pipeline_error("build", err))?;
    Ok(SUCCESS)
}
