//! bank_api - HTTP server entry point
//!
//! ```text
//! config/<env>.yaml ─▶ logging ─▶ PostgreSQL pool ─▶ repositories ─▶ gateway
//! ```
//!
//! Usage: `bank_api [--env|-e <env>]` (default env: `dev`)

use anyhow::{Context, Result};
use std::sync::Arc;

use bank_api::auth::JwtService;
use bank_api::config::AppConfig;
use bank_api::gateway::{self, state::AppState};
use bank_api::logging::init_logging;
use bank_api::repository::{PostgresBackend, TransactionManager};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&config)?;

    tracing::info!(
        "Starting bank_api ({}) in {} mode",
        env!("GIT_HASH"),
        env
    );

    let repos = PostgresBackend::connect(&config.postgres_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    repos
        .transactions
        .health_check()
        .await
        .context("PostgreSQL health check failed")?;

    let jwt = JwtService::new(
        config.security.jwt_secret.clone(),
        config.security.token_ttl_hours,
    );
    let state = Arc::new(AppState::new(repos, jwt));

    gateway::run_server(&config.listen_addr(), state).await
}
