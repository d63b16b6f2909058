mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use roamport_core::SiteConfig;
use roamport_migrator::{
    default_profile_dir, MigrationLayout, MigrationOrchestrator, MigrationRequest,
};
use tracing::{error, info};

use crate::logging::init_logging;
use crate::render::{current_output_style, render_passthru, render_report_lines};

#[derive(Parser, Debug)]
#[command(name = "roamport")]
#[command(
    about = "Migrate a roaming profile from a legacy store into the local profile",
    long_about = None
)]
struct Cli {
    /// Share containing the managed and archived profile stores.
    #[arg(long)]
    root: PathBuf,
    /// Identity whose profile is migrated. Defaults to USERNAME, then USER.
    #[arg(long)]
    user: Option<String>,
    /// Local profile directory receiving data files.
    #[arg(long)]
    profile_dir: Option<PathBuf>,
    /// Site configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Registry key patterns to import, one per line.
    #[arg(long)]
    include_settings: Option<PathBuf>,
    /// Data paths to copy, one per line, relative to the data root.
    #[arg(long)]
    include_data: Option<PathBuf>,
    #[arg(long)]
    exclude_settings: Option<PathBuf>,
    #[arg(long)]
    exclude_data: Option<PathBuf>,
    /// Run even if a previous migration left its import marker.
    #[arg(long)]
    force: bool,
    /// Print the final profile descriptor as JSON.
    #[arg(long)]
    passthru: bool,
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("roamport: failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = SiteConfig::load(cli.config.as_deref())?;
    let user = resolve_user(cli.user.as_deref(), |name| std::env::var(name).ok())?;
    let profile_dir = match cli.profile_dir {
        Some(dir) => dir,
        None => default_profile_dir()?,
    };
    let layout = MigrationLayout::new(profile_dir, std::env::temp_dir());

    let request = MigrationRequest {
        share_root: cli.root,
        user,
        include_settings: cli.include_settings,
        exclude_settings: cli.exclude_settings,
        include_data: cli.include_data,
        exclude_data: cli.exclude_data,
        force: cli.force,
    };
    info!(
        user = %request.user,
        root = %request.share_root.display(),
        profile = %layout.profile_dir().display(),
        "starting profile migration"
    );

    let report = MigrationOrchestrator::new(&layout, &config).run(&request)?;

    let style = current_output_style();
    for line in render_report_lines(style, &report) {
        println!("{line}");
    }
    if cli.passthru {
        if let Some(descriptor) = &report.descriptor {
            println!("{}", render_passthru(descriptor)?);
        }
    }
    Ok(())
}

fn resolve_user<Lookup>(explicit: Option<&str>, lookup: Lookup) -> Result<String>
where
    Lookup: Fn(&str) -> Option<String>,
{
    if let Some(user) = explicit {
        return Ok(user.to_string());
    }
    ["USERNAME", "USER"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow!("no --user given and neither USERNAME nor USER is set"))
        .context("cannot resolve the migrating identity")
}
