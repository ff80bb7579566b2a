use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use flowstate::{ChannelId, Result};
use std::io;
use std::path::PathBuf;

/// Exit status of `should-adjust --quiet` when the channel is not due yet
const EXIT_NOT_DUE: i32 = 2;

#[derive(Parser)]
#[command(name = "flowstate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Per-channel fee adjustment bookkeeping", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// State file (default: ~/.charge-lnd/flow_state.json)
    #[arg(long, global = true, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show when a channel was last adjusted
    Get {
        /// Channel ID
        channel: ChannelId,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Record an adjustment for a channel
    Set {
        /// Channel ID
        channel: ChannelId,

        /// Adjustment time in Unix epoch seconds (default: now)
        #[arg(long, value_name = "EPOCH_SECS")]
        at: Option<f64>,
    },

    /// Check whether a channel is due for another adjustment
    #[command(name = "should-adjust")]
    ShouldAdjust {
        /// Channel ID
        channel: ChannelId,

        /// Minimum hours between adjustments (0 disables throttling)
        #[arg(long, value_name = "HOURS", allow_negative_numbers = true)]
        every: f64,

        /// Print nothing; exit 0 when due, 2 when not
        #[arg(short, long)]
        quiet: bool,
    },

    /// Drop a channel's adjustment record
    Forget {
        /// Channel ID
        channel: ChannelId,
    },

    /// List all tracked channels
    List {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Print the resolved state file path
    Path,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    flowstate::utils::logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let state_file = cli.state_file;

    match cli.command {
        Commands::Get { channel, json } => {
            let store = flowstate::cli::open_store(state_file)?;
            flowstate::cli::get::run(&store, &channel, json)?;
        }

        Commands::Set { channel, at } => {
            let mut store = flowstate::cli::open_store(state_file)?;
            flowstate::cli::set::run(&mut store, &channel, at)?;
        }

        Commands::ShouldAdjust {
            channel,
            every,
            quiet,
        } => {
            let store = flowstate::cli::open_store(state_file)?;
            let due = flowstate::cli::should_adjust::run(&store, &channel, every, quiet)?;
            if quiet && !due {
                return Ok(EXIT_NOT_DUE);
            }
        }

        Commands::Forget { channel } => {
            let mut store = flowstate::cli::open_store(state_file)?;
            flowstate::cli::forget::run(&mut store, &channel)?;
        }

        Commands::List { json } => {
            let store = flowstate::cli::open_store(state_file)?;
            flowstate::cli::list::run(&store, json)?;
        }

        Commands::Path => {
            flowstate::cli::path::run(state_file)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "flowstate", &mut io::stdout());
        }
    }

    Ok(0)
}
