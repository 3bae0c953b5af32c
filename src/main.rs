//! OurToken CLI Application
//!
//! A command-line interface for deploying and operating the token ledger.

use clap::{Parser, Subcommand};
use ourtoken::api::{self, ApiState, ServerConfig};
use ourtoken::cli::{self, AppState};
use ourtoken::service::SharedLedger;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ourtoken")]
#[command(version)]
#[command(about = "A fixed-supply ERC-20 style token ledger", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".ourtoken_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the token, minting 100 OT to the deployer
    Deploy {
        /// Deployer address (hex or @label); random if omitted
        #[arg(long)]
        deployer: Option<String>,

        /// Replace an existing ledger
        #[arg(long)]
        force: bool,
    },

    /// Display token information
    Info,

    /// Show the balance of an account
    Balance {
        /// Account (hex or @label)
        account: String,
    },

    /// List accounts with non-zero balances
    Holders,

    /// Show how much a spender may still move from an owner
    Allowance {
        /// Owner (hex or @label)
        owner: String,

        /// Spender (hex or @label)
        spender: String,
    },

    /// Transfer tokens
    Transfer {
        /// Sender (hex or @label)
        #[arg(short, long)]
        from: String,

        /// Recipient (hex or @label)
        #[arg(short, long)]
        to: String,

        /// Amount (smallest units unless --tokens)
        amount: String,

        /// Interpret the amount in whole tokens ("1.5")
        #[arg(long)]
        tokens: bool,
    },

    /// Approve a spender
    Approve {
        /// Owner granting the allowance (hex or @label)
        #[arg(short, long)]
        owner: String,

        /// Spender (hex or @label)
        #[arg(short, long)]
        spender: String,

        /// Amount (smallest units unless --tokens)
        amount: String,

        /// Interpret the amount in whole tokens ("1.5")
        #[arg(long)]
        tokens: bool,
    },

    /// Transfer on behalf of an owner using an allowance
    TransferFrom {
        /// Spender performing the transfer (hex or @label)
        #[arg(short, long)]
        caller: String,

        /// Owner whose balance is debited (hex or @label)
        #[arg(short, long)]
        owner: String,

        /// Recipient (hex or @label)
        #[arg(short, long)]
        to: String,

        /// Amount (smallest units unless --tokens)
        amount: String,

        /// Interpret the amount in whole tokens ("1.5")
        #[arg(long)]
        tokens: bool,
    },

    /// Show recent events
    History {
        /// Number of events to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Address helpers
    Address {
        #[command(subcommand)]
        action: AddressCommands,
    },

    /// Export ledger to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import ledger from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Restore the ledger from a backup
    Restore {
        /// Backup index (0 is the most recent)
        #[arg(short, long, default_value = "0")]
        backup: usize,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Listen on all interfaces instead of localhost
        #[arg(long)]
        public: bool,
    },
}

#[derive(Subcommand)]
enum AddressCommands {
    /// Generate a random address
    New,

    /// Show the address derived from a label
    Label {
        /// Label, e.g. "bob"
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a deployed ledger
    match &cli.command {
        Commands::Deploy { deployer, force } => {
            let deployer = deployer.as_deref().map(cli::parse_account).transpose()?;
            return cli::cmd_deploy(&cli.data_dir, deployer, *force);
        }
        Commands::Address { action } => {
            return match action {
                AddressCommands::New => cli::cmd_address_new(),
                AddressCommands::Label { name } => cli::cmd_address_label(name),
            };
        }
        Commands::Import { input } => {
            return cli::cmd_import(&cli.data_dir, input);
        }
        Commands::Serve { port, public } => {
            let config = ServerConfig {
                host: if *public { [0, 0, 0, 0] } else { [127, 0, 0, 1] },
                port: *port,
            };
            return run_server(&config, cli.data_dir.clone());
        }
        _ => {}
    }

    let mut state = AppState::load(cli.data_dir.clone())?;
    let decimals = state.ledger.decimals();

    match cli.command {
        Commands::Deploy { .. }
        | Commands::Address { .. }
        | Commands::Import { .. }
        | Commands::Serve { .. } => unreachable!(),

        Commands::Info => cli::cmd_info(&state)?,

        Commands::Balance { account } => {
            cli::cmd_balance(&state, cli::parse_account(&account)?)?;
        }

        Commands::Holders => cli::cmd_holders(&state)?,

        Commands::Allowance { owner, spender } => {
            cli::cmd_allowance(
                &state,
                cli::parse_account(&owner)?,
                cli::parse_account(&spender)?,
            )?;
        }

        Commands::Transfer {
            from,
            to,
            amount,
            tokens,
        } => {
            cli::cmd_transfer(
                &mut state,
                cli::parse_account(&from)?,
                cli::parse_account(&to)?,
                cli::parse_amount(&amount, tokens, decimals)?,
            )?;
        }

        Commands::Approve {
            owner,
            spender,
            amount,
            tokens,
        } => {
            cli::cmd_approve(
                &mut state,
                cli::parse_account(&owner)?,
                cli::parse_account(&spender)?,
                cli::parse_amount(&amount, tokens, decimals)?,
            )?;
        }

        Commands::TransferFrom {
            caller,
            owner,
            to,
            amount,
            tokens,
        } => {
            cli::cmd_transfer_from(
                &mut state,
                cli::parse_account(&caller)?,
                cli::parse_account(&owner)?,
                cli::parse_account(&to)?,
                cli::parse_amount(&amount, tokens, decimals)?,
            )?;
        }

        Commands::History { count } => cli::cmd_history(&state, count)?,

        Commands::Export { output } => cli::cmd_export(&state, &output)?,

        Commands::Restore { backup } => cli::cmd_restore(&mut state, backup)?,
    }

    Ok(())
}

fn run_server(config: &ServerConfig, data_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::load(data_dir)?;
    let api_state = ApiState::new(SharedLedger::with_storage(
        state.ledger,
        Arc::new(state.storage),
    ));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(api::serve(config, api_state))?;

    Ok(())
}
