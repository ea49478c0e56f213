//! dbcsv-server CLI

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use dbcsv_auth::{hash_password, AccountStore, SessionStore};
use dbcsv_core::Engine;
use dbcsv_server::config::{Cli, Command};
use dbcsv_server::{build_router, serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;

    match cli.command {
        Some(Command::HashPassword { ref password }) => {
            println!("{}", hash_password(password)?);
            Ok(())
        }
        Some(Command::Serve) | None => run(&cli).await,
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let engine = Engine::open(&cli.data_dir)
        .with_context(|| format!("loading data directory {}", cli.data_dir.display()))?;
    info!(schemas = ?engine.schemas(), "Loaded catalog");

    let accounts_path = cli.accounts_path();
    let accounts = if accounts_path.exists() {
        AccountStore::load(&accounts_path)?
    } else {
        warn!(
            path = %accounts_path.display(),
            "Accounts file not found, nobody can log in"
        );
        AccountStore::default()
    };
    info!(accounts = accounts.len(), "Loaded accounts");

    let sessions = SessionStore::new(Duration::minutes(cli.token_ttl_minutes));
    let state = AppState::new(engine, accounts, sessions)
        .with_fetch_many_default(cli.fetch_many_default);
    let router = Arc::new(build_router(Arc::new(state)));

    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;

    serve(listener, router, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    Ok(())
}
