mod cli;
mod site;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            pages,
            output,
            public,
            config,
        } => {
            let options = site::BuildOptions {
                pages,
                output,
                public,
                config,
            };
            let report = site::build(&options)?;

            log::info!(
                "Build completed in {} ({} pages, {} public files, {} warnings)",
                options.output.display(),
                report.generated.len(),
                report.copied,
                report.warnings
            );
            if !report.failed.is_empty() {
                bail!("{} page(s) failed to build", report.failed.len());
            }
        }
    }

    Ok(())
}
