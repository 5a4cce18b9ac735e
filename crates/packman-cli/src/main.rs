//! packman command-line tool
//!
//! Installs git-hosted packages into a Unity project and keeps their
//! exported assets staged under `Assets/`.

mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use commands::Context;
use output::{resolve_color_choice, StyledOutput};
use packman::{find_project_root, Config, ProjectLayout};
use std::path::PathBuf;
use termcolor::ColorChoice;
use tracing::Level;

#[derive(Parser)]
#[command(name = "packman")]
#[command(about = "Git-backed package manager for Unity projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Project directory (defaults to the nearest directory with packman.json)
    #[arg(short = 'C', long = "project", global = true)]
    project: Option<PathBuf>,

    /// Configuration file (defaults to ~/.packman-config)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// When to use colors
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create packman.json in the project directory
    Init,

    /// Add packman's directories to .gitignore
    Gitignore,

    /// Install packages, or everything packman.json declares
    Install {
        /// References such as owner/repo, owner/repo?tag=v1.0
        packages: Vec<String>,
        /// Record the packages as dev dependencies
        #[arg(short = 'D', long)]
        dev: bool,
        /// Skip dev dependencies when installing everything
        #[arg(long, conflicts_with = "dev")]
        production: bool,
    },

    /// Remove packages and their cached and staged files
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Copy a staged export back into the package cache
    Copyback {
        package: String,
    },

    /// Open a cached package in the Unity editor
    Open {
        package: String,
    },

    /// Show or change global settings (unity, localRepo, gitHost)
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let color = resolve_color_choice(cli.color.as_deref());
    init_logging(cli.verbose, cli.quiet, color);

    if let Err(e) = run(cli, color) {
        let mut out = StyledOutput::new(color);
        out.stderr_error(&format!("error: {:#}\n", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool, color: ColorChoice) {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_ansi(color != ColorChoice::Never)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, color: ColorChoice) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let root = match (&cli.project, &cli.command) {
        (Some(project), _) => project.clone(),
        (None, Commands::Init | Commands::Gitignore) => cwd,
        (None, _) => find_project_root(&cwd).unwrap_or(cwd),
    };

    let config_path = match cli.config_file {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let ctx = Context {
        layout: ProjectLayout::new(root),
        config: Config::load_from(&config_path),
        config_path,
        out: StyledOutput::new(color),
    };

    match cli.command {
        Commands::Init => commands::init::execute(ctx),
        Commands::Gitignore => commands::gitignore::execute(ctx),
        Commands::Install {
            packages,
            dev,
            production,
        } => commands::install::execute(ctx, packages, dev, production),
        Commands::Remove { packages } => commands::remove::execute(ctx, packages),
        Commands::Copyback { package } => commands::copyback::execute(ctx, package),
        Commands::Open { package } => commands::open::execute(ctx, package),
        Commands::Config { key, value } => commands::config::execute(ctx, key, value),
    }
}
