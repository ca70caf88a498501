use qrsite_pipeline::SiteConfig;

use crate::cmd::{Context, InitArgs};
use crate::exit::{config_error, io_error, CliResult, SUCCESS};
use crate::output::print_init_report;

pub fn run(args: InitArgs, ctx: &Context) -> CliResult<i32> {
    let existed = ctx.config_path.exists();
    let config = SiteConfig::write_default(&ctx.config_path, args.force)
        .map_err(|err| config_error("init", err))?;
    tracing::info!(path = %ctx.config_path.display(), "wrote default config");

    // the page goes here before the first build
    if let Some(input_dir) = config
        .input_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(input_dir)
            .map_err(|err| io_error(&format!("init: {}", input_dir.display()), err))?;
        tracing::debug!(dir = %input_dir.display(), "created input directory");
    }

    print_init_report(&ctx.config_path, existed, ctx.format);
    Ok(SUCCESS)
}
