use std::path::PathBuf;
use std::str::FromStr as _;

use clap::{Parser, Subcommand, ValueHint};
use escrowfloor_client::oracle::FileOracle;
use escrowfloor_client::FloorClient;
use escrowfloor_core::interface::load_escrow_data;
use escrowfloor_core::{CreateParams, EscrowId, Party, Timestamp};

const DEFAULT_STATE_PATH: &str = "./templates/ledger_state.json";
const DEFAULT_PARAMS_PATH: &str = "./templates/create_params.json";
const DEFAULT_QUOTES_PATH: &str = "./templates/oracle_quotes.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create { params, state } => {
            let params: CreateParams = load_escrow_data(&params)?;

            let mut client = FloorClient::open(state)?;
            let escrow = client.create(&params)?;
            tracing::info!(escrow_id = %escrow.escrow_id, "escrow created");
        }
        Commands::Accept {
            escrow_id,
            counterparty,
            state,
        } => {
            let id = EscrowId::from_str(&escrow_id)?;
            let counterparty = Party::from_str(&counterparty)?;

            let mut client = FloorClient::open(state)?;
            let escrow = client.accept(&id, counterparty)?;
            tracing::info!(escrow_id = %escrow.escrow_id, "escrow accepted");
        }
        Commands::Settle {
            escrow_id,
            quotes,
            state,
            at,
        } => {
            let id = EscrowId::from_str(&escrow_id)?;
            let oracle = FileOracle::load(&quotes)?;

            let mut client = FloorClient::open(state)?;
            let report = client.settle(&id, &oracle, at).await?;
            tracing::info!(
                winner = %report.disbursement.recipient,
                amount = report.disbursement.amount,
                "escrow settled"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Cancel {
            escrow_id,
            caller,
            state,
            at,
        } => {
            let id = EscrowId::from_str(&escrow_id)?;
            let caller = Party::from_str(&caller)?;

            let mut client = FloorClient::open(state)?;
            let escrow = client.cancel(&id, &caller, at)?;
            tracing::info!(escrow_id = %escrow.escrow_id, "escrow cancelled, margin refunded");
        }
        Commands::Show { escrow_id, state } => {
            let id = EscrowId::from_str(&escrow_id)?;

            let client = FloorClient::open(state)?;
            let escrow = client.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&escrow)?);
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "escrowfloor-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a floor-price prediction escrow
    Create {
        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_PARAMS_PATH,
            value_hint = ValueHint::FilePath)]
        params: PathBuf,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_STATE_PATH,
            value_hint = ValueHint::FilePath)]
        state: PathBuf,
    },
    /// Accept an open escrow as counterparty
    Accept {
        #[arg(short, long)]
        escrow_id: String,

        #[arg(short, long)]
        counterparty: String,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_STATE_PATH,
            value_hint = ValueHint::FilePath)]
        state: PathBuf,
    },
    /// Settle an accepted escrow against an oracle quote
    Settle {
        #[arg(short, long)]
        escrow_id: String,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_QUOTES_PATH,
            value_hint = ValueHint::FilePath)]
        quotes: PathBuf,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_STATE_PATH,
            value_hint = ValueHint::FilePath)]
        state: PathBuf,

        /// Observation time override; defaults to the system clock
        #[arg(long)]
        at: Option<Timestamp>,
    },
    /// Cancel a never-accepted escrow after expiry
    Cancel {
        #[arg(short, long)]
        escrow_id: String,

        #[arg(short, long)]
        caller: String,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_STATE_PATH,
            value_hint = ValueHint::FilePath)]
        state: PathBuf,

        /// Cancellation time override; defaults to the system clock
        #[arg(long)]
        at: Option<Timestamp>,
    },
    /// Print an escrow record
    Show {
        #[arg(short, long)]
        escrow_id: String,

        #[arg(short, long,
            value_parser,
            default_value = DEFAULT_STATE_PATH,
            value_hint = ValueHint::FilePath)]
        state: PathBuf,
    },
}
