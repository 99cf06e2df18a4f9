//! CLI parsing and command dispatch.

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    commands::{self, apply::ApplyOptions},
    error::Result,
};

/// Parsed command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "techskills",
    version,
    about = "Reconcile technician skills against skill groups"
)]
struct Cli {
    /// Control colored output.
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,
    /// Enable verbose (debug) logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    /// Path to the config file (defaults to ~/.techskills.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Command to execute (defaults to groups).
    #[command(subcommand)]
    command: Option<Command>,
}

/// Supported color output modes.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    /// Only colorize when stdout is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

// Commands are ordered alphabetically - maintain this order.
/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile technicians' skills with a group.
    Apply {
        /// Technician ids, names or emails.
        identifiers: Vec<String>,
        /// File with one identifier per line (# starts a comment).
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Group name or number (prompts when omitted).
        #[arg(long, short = 'g')]
        group: Option<String>,
        /// Removal mode: 1/add-only, 2/reset or 3/align (prompts when omitted).
        #[arg(long, short = 'm')]
        mode: Option<String>,
        /// Skill level sent with every new assignment.
        #[arg(long)]
        skill_level: Option<u32>,
        /// Activate inactive technicians instead of skipping them.
        #[arg(long)]
        activate_inactive: bool,
        /// Preview changes without sending them.
        #[arg(long, short = 'n')]
        dry_run: bool,
        /// Pick which of the group's skills to apply.
        #[arg(long, conflicts_with = "only")]
        select: bool,
        /// Apply only these 1-based skill positions, e.g. 1,2,5.
        #[arg(long)]
        only: Option<String>,
        /// Apply without prompting.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List skill groups and which of their skills exist remotely.
    #[command(alias = "ls")]
    Groups {
        /// List configured labels without logging in.
        #[arg(long)]
        offline: bool,
    },
    /// Write the default config file.
    Init,
    /// Remove a group's skills from technicians.
    Remove {
        /// Technician ids, names or emails.
        identifiers: Vec<String>,
        /// File with one identifier per line (# starts a comment).
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Group name or number.
        #[arg(long, short = 'g')]
        group: String,
        /// Preview changes without sending them.
        #[arg(long, short = 'n')]
        dry_run: bool,
        /// Remove without prompting.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Show a technician's skills and group coverage.
    Show {
        /// Technician id, name or email.
        identifier: String,
        /// Treat the identifier as the owning user's email.
        #[arg(long)]
        email: bool,
    },
}

/// Run the requested command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let color = cli.color.into_choice();
    let config = cli.config.as_deref();

    // Match arms are ordered alphabetically - maintain this order.
    match cli.command.unwrap_or(Command::Groups { offline: false }) {
        Command::Apply {
            identifiers,
            file,
            group,
            mode,
            skill_level,
            activate_inactive,
            dry_run,
            select,
            only,
            yes,
        } => {
            let options = ApplyOptions {
                identifiers,
                file,
                group,
                mode,
                skill_level,
                activate_inactive,
                dry_run,
                select,
                only,
                yes,
            };
            commands::apply::run(color, config, &options).await
        }
        Command::Groups { offline } => commands::groups::run(color, config, offline).await,
        Command::Init => commands::init::run(config).await,
        Command::Remove {
            identifiers,
            file,
            group,
            dry_run,
            yes,
        } => {
            commands::remove::run(
                color,
                config,
                &identifiers,
                file.as_deref(),
                &group,
                dry_run,
                yes,
            )
            .await
        }
        Command::Show { identifier, email } => {
            commands::show::run(color, config, &identifier, email).await
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,techskills={level}")));
    // A subscriber may already be installed when embedded; keep that one.
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        debug!("log subscriber already installed");
    }
}

impl ColorMode {
    /// Convert a CLI color mode into a color choice.
    fn into_choice(self) -> commands::ColorChoice {
        match self {
            Self::Auto => commands::ColorChoice::Auto,
            Self::Always => commands::ColorChoice::Always,
            Self::Never => commands::ColorChoice::Never,
        }
    }
}
