mod api;

use api::{create_router, ApiState, BotMode};
use log::{error, info};
use solana_sdk::signature::Signer;
use std::sync::Arc;

use sol_mood_core::{
    error::CoreError,
    native::{NativeHttpClient, NativeRpcClient},
    rpc_client::RpcClient,
    settings::{PriceSource, Settings},
    transaction_signer::KeypairSigner,
    wallet::resolve_keypair,
    CorpusSentimentSource, DecisionPolicy, HttpPriceFeed, LedgerBalanceReader, LedgerTradeExecutor,
    PriceFeed, StaticPosts, StaticPriceFeed, TradeSizes, TradingService,
};

fn build_price_feed(settings: &Settings) -> Arc<dyn PriceFeed> {
    match settings.price_source {
        PriceSource::Http => Arc::new(HttpPriceFeed::new(NativeHttpClient::new(), settings)),
        PriceSource::Static => Arc::new(StaticPriceFeed::new(settings.symbol.clone(), settings.static_price)),
    }
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    env_logger::init();
    // Unconditional so a missing RUST_LOG still shows the binary started.
    println!(
        "sol_mood starting (pid {}), RUST_LOG={:?}",
        std::process::id(),
        std::env::var("RUST_LOG").ok()
    );

    let config_path = std::env::var("SOL_MOOD_CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let settings = Settings::from_file(&config_path)?;
    settings.validate()?;

    if std::env::args().any(|arg| arg == "--print-config") {
        println!("{}", settings.to_redacted_toml()?);
        return Ok(());
    }

    let is_real = std::env::args().any(|arg| arg == "--real");
    let mode = if is_real { BotMode::Real } else { BotMode::DryRun };
    info!(
        "Mode: {} | pair {} | rpc {}",
        if is_real { "REAL (transactions are sent)" } else { "dry-run (transactions are simulated)" },
        settings.symbol,
        settings.solana_rpc_url
    );

    let keypair = resolve_keypair(&settings, is_real)?;
    let wallet = keypair.pubkey();

    let rpc: Arc<dyn RpcClient> = Arc::new(NativeRpcClient::new(settings.solana_rpc_url.clone()));
    let executor = LedgerTradeExecutor::new(
        rpc.clone(),
        Arc::new(KeypairSigner::new(keypair)),
        settings.base_mint_pubkey()?,
        settings.counterparty_pubkey()?,
        is_real,
    );
    let balances = LedgerBalanceReader::new(rpc, wallet.to_string(), settings.base_mint.clone());
    let sentiment = CorpusSentimentSource::new(StaticPosts(settings.sentiment_posts.clone()));

    let service = TradingService::new(
        build_price_feed(&settings),
        Arc::new(sentiment),
        Arc::new(balances),
        Arc::new(executor),
        DecisionPolicy::from_settings(&settings),
        TradeSizes::from_settings(&settings),
        settings.fetch_timeout(),
    );

    let api_router = create_router(ApiState {
        service: Arc::new(service),
        mode,
        wallet: wallet.to_string(),
    });

    let bind_addr = format!("{}:{}", settings.api_host, settings.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.map_err(|e| {
        error!("Failed to bind API server to {}: {}", bind_addr, e);
        CoreError::from(e)
    })?;
    info!("API server listening on {}", bind_addr);

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("sol_mood stopped");
    Ok(())
}
