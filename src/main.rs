//! Scheduler daemon for the wallet core.
//!
//! Runs the due-rule tick on a fixed interval, the cron-style external
//! trigger the rule engine expects.

use dotenvy::dotenv;
use member_wallet::{
    config,
    core::rules::{format_rule_run_summary, run_due_wallet_rules, seed_rules},
    errors::Result,
};
use std::{env, path::Path, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_TICK_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Database connection and schema
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    config::database::create_tables(&db).await?;

    // 4. Seed recurring rules from config.toml when present
    if Path::new("config.toml").exists() {
        let rules_config = config::rules::load_default_config()?;
        let created = seed_rules(&db, &rules_config)
            .await
            .inspect_err(|e| error!("Failed to seed wallet rules: {}", e))?;
        info!("Seeded {} wallet rules from config.toml", created);
    }

    // 5. Scheduler loop: run the due rules once per tick
    let tick_secs = env::var("WALLET_TICK_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TICK_SECS);
    info!("Starting wallet rule scheduler, tick every {}s", tick_secs);

    let mut interval = tokio::time::interval(Duration::from_secs(tick_secs));
    loop {
        interval.tick().await;
        match run_due_wallet_rules(&db).await {
            Ok(report) if report.outcomes.is_empty() => {}
            Ok(report) => info!("{}", format_rule_run_summary(&report)),
            Err(e) => error!("Wallet rule run failed: {}", e),
        }
    }
}
