//! `eos-tx`: command line harness for the transaction pipeline.
//!
//! ```text
//! eos-tx [--config eos-tx.toml] [--url http://node:8888] <command>
//!
//!   info | block | account | balance | table | key-accounts | actions   read-only queries
//!   push | required-keys                                                pipeline runs
//! ```
//!
//! Commands that sign read the private key from `EOS_PRIVATE_KEY`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use eos_tx_pipeline::blockchain::requests::{DEFAULT_ACTIONS_OFFSET, DEFAULT_ACTIONS_POS};
use eos_tx_pipeline::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use eos_tx_pipeline::blockchain::{
    ActionArgs, ChainRpc, NodeClient, ResponseEnvelope, TableRowsRequest,
};
use eos_tx_pipeline::config::validation::validate_config;
use eos_tx_pipeline::config::{load_config, ClientConfig, ConfigError};
use eos_tx_pipeline::observability::logging;
use eos_tx_pipeline::TransactionPipeline;

#[derive(Parser)]
#[command(name = "eos-tx")]
#[command(about = "Build, sign and push EOSIO transactions", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node URL, overriding the configuration.
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chain head state
    Info,
    /// Show a block by number or id
    Block { block_num_or_id: String },
    /// Show an account
    Account { account: String },
    /// List accounts controlled by the key in EOS_PRIVATE_KEY
    KeyAccounts,
    /// Show recent actions of an account
    Actions {
        account: String,
        #[arg(long, default_value_t = DEFAULT_ACTIONS_POS, allow_hyphen_values = true)]
        pos: i64,
        #[arg(long, default_value_t = DEFAULT_ACTIONS_OFFSET, allow_hyphen_values = true)]
        offset: i64,
    },
    /// Show a token balance
    Balance {
        account: String,
        #[arg(long, default_value = "eosio.token")]
        code: String,
        #[arg(long)]
        symbol: String,
    },
    /// Read contract table rows
    Table {
        scope: String,
        code: String,
        table: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        reverse: bool,
    },
    /// Encode, sign and broadcast an action
    Push(ActionCommand),
    /// Show which keys an action requires, without broadcasting
    RequiredKeys(ActionCommand),
}

#[derive(clap::Args)]
struct ActionCommand {
    /// Contract account
    contract: String,
    /// Action name
    action: String,
    /// Authorizing account
    #[arg(long)]
    account: String,
    /// Action arguments as a JSON object
    #[arg(long, default_value = "{}")]
    args: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.url {
        config.node.url = url;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    let client = NodeClient::new(config.node.clone())?
        .with_metrics(config.observability.metrics_enabled);

    let envelope = match cli.command {
        Commands::Info => client.get_info().await,
        Commands::Block { block_num_or_id } => client.get_block(&block_num_or_id).await,
        Commands::Account { account } => client.get_account(&account).await,
        Commands::KeyAccounts => client.get_key_accounts(&private_key()?).await,
        Commands::Actions {
            account,
            pos,
            offset,
        } => client.get_actions_page(&account, pos, offset).await,
        Commands::Balance {
            account,
            code,
            symbol,
        } => client.get_currency_balance(&account, &code, &symbol).await,
        Commands::Table {
            scope,
            code,
            table,
            limit,
            reverse,
        } => {
            let request = TableRowsRequest::new(&scope, &code, &table)
                .limit(limit)
                .reverse(reverse);
            client.get_table_rows(&request).await
        }
        Commands::Push(cmd) => {
            let args = parse_args(&cmd.args)?;
            let pipeline = TransactionPipeline::new(client, &config.transaction);
            pipeline
                .push_transaction(&cmd.contract, &cmd.action, &cmd.account, &private_key()?, &args)
                .await
        }
        Commands::RequiredKeys(cmd) => {
            let args = parse_args(&cmd.args)?;
            let pipeline = TransactionPipeline::new(client, &config.transaction);
            pipeline
                .get_required_keys(&cmd.contract, &cmd.action, &cmd.account, &private_key()?, &args)
                .await
        }
    };

    print_envelope(&envelope)?;
    if !envelope.success {
        std::process::exit(1);
    }
    Ok(())
}

fn private_key() -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(PRIVATE_KEY_ENV_VAR)
        .map(|k| k.trim().to_string())
        .map_err(|_| format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR).into())
}

fn parse_args(raw: &str) -> Result<ActionArgs, Box<dyn std::error::Error>> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(format!("--args must be a JSON object, got {}", other).into()),
    }
}

fn print_envelope(envelope: &ResponseEnvelope) -> Result<(), Box<dyn std::error::Error>> {
    let body = envelope
        .payload_json()
        .or_else(|| serde_json::from_str(&envelope.raw).ok())
        .unwrap_or_else(|| serde_json::Value::String(envelope.raw.clone()));

    if envelope.success {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        eprintln!("Error: node call failed");
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}
