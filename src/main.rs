// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use distro_id::probe::{Distribution, ProbeOptions};
use distro_id::report::{json, text};

#[derive(Parser)]
#[command(
    name = "distro-id",
    about = "Identify the running Linux distribution",
    version
)]
struct Cli {
    /// Output in machine readable JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Prefer the most precise version found across all sources
    #[arg(long)]
    best: bool,

    /// Use this os-release file instead of <conf-dir>/os-release
    #[arg(long, value_name = "PATH")]
    os_release_file: Option<PathBuf>,

    /// Use this legacy release file instead of searching the
    /// configuration directory
    #[arg(long, value_name = "PATH")]
    distro_release_file: Option<PathBuf>,

    /// Configuration directory to probe
    #[arg(long, value_name = "DIR")]
    conf_dir: Option<PathBuf>,

    /// Do not invoke the lsb_release command
    #[arg(long)]
    no_lsb: bool,

    /// Timeout in seconds for the lsb_release command
    #[arg(long, default_value = "5", value_name = "SECONDS")]
    lsb_timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the raw attributes reported by each data source
    Sources,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = ProbeOptions {
        include_lsb: !cli.no_lsb,
        os_release_file: cli.os_release_file.clone(),
        distro_release_file: cli.distro_release_file.clone(),
        conf_dir: cli.conf_dir.clone(),
        lsb_timeout: Duration::from_secs(cli.lsb_timeout),
    };
    let dist = Distribution::probe(options)?;

    match cli.command {
        Some(Commands::Sources) => cmd_sources(&dist),
        None => cmd_show(&dist, cli.json, cli.best),
    }
}

fn cmd_show(dist: &Distribution, as_json: bool, best: bool) -> Result<()> {
    if as_json {
        println!("{}", json::render(dist, best)?);
    } else {
        print!("{}", text::render(dist, best));
    }
    Ok(())
}

fn cmd_sources(dist: &Distribution) -> Result<()> {
    println!("{}", text::render_sources(dist));
    Ok(())
}
