use loan_replay::config::{Config, EventSourceConfig};
use loan_replay::risk::{
    compute_liquidable_debt_curve, compute_number_of_active_borrowers,
    compute_number_of_active_users,
};
use loan_replay::{
    DecimalFactors, EventSource, FileEventSource, HashstackProtocol, IndexerEventSource,
    ReplayEngine, SqliteEventSource, Synchronizer, TokenRegistry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let source: Arc<dyn EventSource> = match &config.event_source {
        EventSourceConfig::File { path } => Arc::new(FileEventSource::new(path.clone())),
        EventSourceConfig::Sqlite { database_path } => {
            match SqliteEventSource::connect(database_path).await {
                Ok(source) => Arc::new(source),
                Err(e) => {
                    eprintln!("Failed to open event database: {}", e);
                    std::process::exit(1);
                }
            }
        }
        EventSourceConfig::Indexer { url } => Arc::new(IndexerEventSource::new(url.clone())),
    };

    let protocol = HashstackProtocol::new().with_verbose_user(config.verbose_user.clone());
    let mut engine = ReplayEngine::new(protocol, TokenRegistry::starknet_mainnet());
    let synchronizer = Synchronizer::new(
        source,
        config.protocol_address.to_string(),
        config.start_block,
    );

    let summary = match synchronizer.sync(&mut engine).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            std::process::exit(1);
        }
    };

    let store = engine.store();
    tracing::info!(
        events = summary.events_applied,
        loans = store.len(),
        last_block = ?summary.last_block,
        active_users = compute_number_of_active_users(store),
        active_borrowers = compute_number_of_active_borrowers(store),
        fingerprint = %store.fingerprint(),
        "replay complete"
    );

    let Some(scenario) = &config.risk_scenario else {
        return;
    };
    let decimals = DecimalFactors::starknet_mainnet();
    match compute_liquidable_debt_curve(
        store,
        &config.prices,
        &decimals,
        &scenario.collateral_token,
        &scenario.price_points,
        &scenario.debt_token,
    ) {
        Ok(curve) => {
            for point in curve {
                tracing::info!(
                    collateral_token = %scenario.collateral_token,
                    debt_token = %scenario.debt_token,
                    collateral_price = %point.collateral_price,
                    liquidable_debt_usd = %point.liquidable_debt_usd,
                    "liquidable debt"
                );
            }
        }
        Err(e) => {
            eprintln!("Risk query failed: {}", e);
            std::process::exit(1);
        }
    }
}
