//! Workshop runner binary.
//!
//! Drives one of the two workflow pipelines to completion and prints the
//! structured run report. Gateway clients are constructed once here and
//! passed into the workflow functions, never held as ambient singletons.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use ledger_workflows::config::loader::{default_config, load_config};
use ledger_workflows::config::schema::OrchestratorConfig;
use ledger_workflows::ledger::account::UNIT;
use ledger_workflows::ledger::asset::Asset;
use ledger_workflows::observability::logging;
use ledger_workflows::workflows::{
    run_asset_issuance, run_vault_create_and_deposit, IssuanceParams, VaultParams,
};
use ledger_workflows::{HorizonClient, VaultGatewayClient, WorkflowError};

#[derive(Parser)]
#[command(name = "ledger-workflows")]
#[command(about = "Workshop workflows against the ledger and vault gateways", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults target the testnet.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a custom asset, seed a liquidity pool, and swap into it
    IssueAsset {
        /// Asset code (1-12 alphanumeric characters)
        #[arg(long, default_value = "WORK", value_parser = parse_asset_code)]
        code: String,

        /// Supply to issue, in whole units
        #[arg(long, default_value_t = 1_000_000)]
        supply: i64,
    },
    /// Create a vault with an initial deposit, then deposit again
    CreateVault {
        /// Initial deposit in base units of the vault asset
        #[arg(long, default_value_t = 100_000_000)]
        initial_deposit: i64,

        /// Follow-up deposit in base units
        #[arg(long, default_value_t = 50_000_000)]
        deposit: i64,
    },
}

fn parse_asset_code(value: &str) -> Result<String, String> {
    if Asset::is_valid_code(value) {
        Ok(value.to_string())
    } else {
        Err("asset code must be 1-12 alphanumeric characters".to_string())
    }
}

fn load(cli_config: Option<&PathBuf>) -> Result<OrchestratorConfig, Box<dyn std::error::Error>> {
    let config = match cli_config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {}", err);
            std::process::exit(2);
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(
        horizon = %config.network.horizon_url,
        vault_gateway = %config.vault_gateway.url,
        "ledger-workflows v0.1.0 starting"
    );

    if let Err(err) = run(&cli.command, &config).await {
        tracing::error!(error = %err, detail = ?err, "Workflow run failed");
        std::process::exit(1);
    }
}

async fn run(command: &Commands, config: &OrchestratorConfig) -> Result<(), WorkflowError> {
    let ledger = HorizonClient::new(&config.network)?;

    match command {
        Commands::IssueAsset { code, supply } => {
            let params = IssuanceParams {
                asset_code: code.clone(),
                supply: supply.saturating_mul(UNIT),
                ..Default::default()
            };
            let outcome =
                run_asset_issuance(&ledger, &config.network, &config.retries, params).await?;
            tracing::info!(
                asset = %outcome.asset,
                holder_balance = outcome.holder_asset_balance,
                pool_shares = outcome.pool_shares,
                "Asset issuance complete"
            );
            println!("{}", outcome.report.to_json());
        }
        Commands::CreateVault {
            initial_deposit,
            deposit,
        } => {
            let vault = VaultGatewayClient::new(&config.vault_gateway)?;
            let params = VaultParams {
                initial_deposit: i128::from(*initial_deposit),
                deposit_amount: i128::from(*deposit),
                slippage_bps: config.vault_gateway.slippage_bps,
                invest: config.vault_gateway.invest,
                ..Default::default()
            };
            let outcome = run_vault_create_and_deposit(
                &ledger,
                &vault,
                &config.network,
                &config.retries,
                Duration::from_millis(config.vault_gateway.settle_delay_ms),
                params,
            )
            .await?;
            tracing::info!(
                contract = %outcome.contract_address,
                depositor = %outcome.depositor,
                "Vault workflow complete"
            );
            println!("{}", outcome.report.to_json());
        }
    }

    Ok(())
}
