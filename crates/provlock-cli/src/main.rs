#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::format_push_string)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use provlock_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "provlock")]
#[command(author, version, about = "Resolve provider checksums for dependency locks", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve the checksums of a provider version for the given platforms
    Hashes {
        /// Provider address, e.g. "hashicorp/null" or "registry.terraform.io/hashicorp/null"
        address: String,

        /// Provider version, e.g. "3.2.1"
        version: String,

        /// Target platforms in os_arch form (repeatable or comma-separated)
        #[arg(short, long = "platform", value_delimiter = ',', required = true)]
        platforms: Vec<String>,

        /// Root of the unpacked provider mirror
        #[arg(long, value_name = "DIR")]
        mirror: Option<PathBuf>,
    },

    /// Print the latest released version of a GitLab project
    Latest {
        /// Project in owner/project form
        source: String,

        /// GitLab API base URL
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        return commands::version::run();
    }

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::load(&cwd)
        .into_diagnostic()?
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Commands::Version => commands::version::run(),
        Commands::Hashes {
            address,
            version,
            platforms,
            mirror,
        } => {
            let config = match mirror {
                Some(dir) => config.with_mirror_dir(cwd.join(dir)),
                None => config,
            };
            commands::hashes::run(&config, &address, &version, &platforms, cli.json)
        }
        Commands::Latest { source, base_url } => {
            let config = match base_url {
                Some(url) => config.with_gitlab_base_url(url),
                None => config,
            };
            commands::latest::run(&config, &source)
        }
    }
}
