use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{info, warn};
use solana_sdk::pubkey::Pubkey;

use dbc_fee_desk::{
    cache::{FileStore, ReadThroughCache, SystemClock},
    config::{self, Config},
    dashboard::{ApiClient, HttpDrafter},
    error::ApiError,
    fees::{claim_all, ClaimPipeline},
    models::{ClaimBatchOutcome, FeeTotals, PoolRecord},
    solana::{SolanaClient, Wallet},
    utils::{format_pubkey, format_units, pubkey_from_str, sol_to_lamports},
};

/// Key of the persisted pool listing inside the cache directory
const POOLS_CACHE_KEY: &str = "dbc_pools_cache";
const SOL_DECIMALS: u32 = 9;

/// DBC fee desk dashboard
#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Browse DBC pools and claim partner trading fees", long_about = None)]
#[command(version)]
struct Cli {
    /// Fee desk API base URL (defaults to API_BASE_URL)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pools of the configured pool config
    Pools {
        /// Ignore both the local and the server cache
        #[arg(long)]
        refresh: bool,
    },

    /// Show fee metrics per pool and their totals
    Fees,

    /// Claim partner fees from every pool at or above the threshold
    ClaimAll {
        /// Minimum partner quote fee in SOL (defaults to CLAIM_THRESHOLD_SOL)
        #[arg(long)]
        threshold_sol: Option<String>,

        /// Keypair file of the fee claimer (defaults to KEYPAIR_PATH)
        #[arg(long)]
        keypair: Option<PathBuf>,
    },

    /// SOL balance of an address
    Balance { address: String },

    /// Token accounts owned by an address
    Tokens { address: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));

    let cli = Cli::parse();
    let config = config::load_config()?;
    let api = ApiClient::new(cli.api.as_deref().unwrap_or(&config.api_base_url));

    match cli.command {
        Commands::Pools { refresh } => show_pools(&api, &config, refresh).await,
        Commands::Fees => show_fees(&api).await,
        Commands::ClaimAll { threshold_sol, keypair } => {
            let threshold = threshold_sol.unwrap_or_else(|| config.claim_threshold_sol.clone());
            let keypair = keypair.unwrap_or_else(|| config.keypair_path.clone());
            run_claim_all(api, &config, &threshold, keypair).await
        }
        Commands::Balance { address } => {
            let address = pubkey_from_str(&address)?;
            let balance = api.balance(&address).await?;
            println!("{}: {} SOL", address, balance);
            Ok(())
        }
        Commands::Tokens { address } => {
            let address = pubkey_from_str(&address)?;
            let tokens = api.tokens(&address).await?;
            println!("{} token accounts for {}", tokens.len(), format_pubkey(&address));
            for token in tokens {
                println!(
                    "  {}  {}",
                    token.mint,
                    format_units(&token.amount, u32::from(token.decimals))
                );
            }
            Ok(())
        }
    }
}

async fn show_pools(api: &ApiClient, config: &Config, refresh: bool) -> Result<()> {
    let cache: ReadThroughCache<Vec<PoolRecord>> = ReadThroughCache::new(
        FileStore::new(&config.cache_dir, POOLS_CACHE_KEY),
        Arc::new(SystemClock),
        config.pool_cache_ttl_ms,
    );

    let cached = cache
        .get(refresh, || async {
            let page = api
                .pools(refresh)
                .await
                .map_err(|e| ApiError::transport("Failed to fetch pools", format!("{:#}", e)))?;
            if page.cached {
                info!("Server answered from its cache ({} ms old)", page.cache_age.unwrap_or(0));
            }
            Ok(page.pools)
        })
        .await?;

    match cached.age_ms {
        Some(age) => println!("{} pools (local cache, {} s old)", cached.payload.len(), age / 1000),
        None => println!("{} pools", cached.payload.len()),
    }
    for pool in cached.payload.iter() {
        let (name, symbol) = pool
            .metadata
            .as_ref()
            .map(|m| (m.name.as_deref().unwrap_or("?"), m.symbol.as_deref().unwrap_or("?")))
            .unwrap_or(("?", "?"));
        println!(
            "  {:<24} {:<8} pool {}  mint {}  quote reserve {}{}",
            name,
            symbol,
            format_pubkey(&pool.address),
            format_pubkey(&pool.base_mint),
            format_units(&pool.quote_reserve, SOL_DECIMALS),
            if pool.is_migrated { "  (migrated)" } else { "" }
        );
    }
    Ok(())
}

fn print_totals(totals: &FeeTotals) {
    println!("Totals");
    println!("  partner quote fee  {} SOL", format_units(&totals.partner_quote_fee, SOL_DECIMALS));
    println!("  partner base fee   {}", totals.partner_base_fee);
    println!("  creator quote fee  {} SOL", format_units(&totals.creator_quote_fee, SOL_DECIMALS));
    println!("  creator base fee   {}", totals.creator_base_fee);
    println!("  trading quote fee  {} SOL", format_units(&totals.total_trading_quote_fee, SOL_DECIMALS));
    println!("  trading base fee   {}", totals.total_trading_base_fee);
}

async fn show_fees(api: &ApiClient) -> Result<()> {
    let page = api.fees().await?;
    println!("Fees for config {} ({} pools)", page.config_address, page.fees.len());
    for fee in &page.fees {
        println!(
            "  {}  partner {} SOL  creator {} SOL",
            format_pubkey(&fee.pool_address),
            format_units(&fee.partner_quote_fee, SOL_DECIMALS),
            format_units(&fee.creator_quote_fee, SOL_DECIMALS)
        );
    }
    print_totals(&page.totals);
    Ok(())
}

async fn run_claim_all(api: ApiClient, config: &Config, threshold_sol: &str, keypair: PathBuf) -> Result<()> {
    let threshold = sol_to_lamports(threshold_sol)?;
    let wallet = Wallet::from_file(&keypair)?;
    let claimer: Pubkey = wallet.pubkey();
    let submitter = SolanaClient::new(config.rpc_url().context("Claiming needs RPC_URL to submit")?);

    let page = api.fees().await?;
    info!(
        "Claiming as {} with threshold {} SOL",
        format_pubkey(&claimer),
        format_units(&threshold, SOL_DECIMALS)
    );

    let pipeline = ClaimPipeline {
        drafter: HttpDrafter::new(api.clone()),
        signer: wallet,
        submitter,
        claimer,
        payer: claimer,
        receiver: None,
    };

    match claim_all(&page.fees, &threshold, &pipeline).await {
        ClaimBatchOutcome::NothingToClaim => {
            println!("No pools with at least {} SOL in partner fees", threshold_sol);
        }
        ClaimBatchOutcome::Completed(result) => {
            println!(
                "Claimed fees from {} pools, {} failed",
                result.success_count, result.fail_count
            );
        }
    }

    // Fees are refreshed whatever the outcome
    match api.fees().await {
        Ok(page) => print_totals(&page.totals),
        Err(e) => warn!("Failed to refresh fees: {:#}", e),
    }
    Ok(())
}
