//! Command line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::state::DEFAULT_FETCH_MANY_SIZE;

/// Serves SQL queries over CSV tables.
#[derive(Debug, Parser)]
#[command(name = "dbcsv-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "DBCSV_BIND", default_value = "127.0.0.1:8001")]
    pub bind: String,

    /// Directory holding one sub-directory per schema.
    #[arg(short, long, env = "DBCSV_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Accounts file (defaults to `<data-dir>/accounts.json`).
    #[arg(short, long, env = "DBCSV_ACCOUNTS")]
    pub accounts: Option<PathBuf>,

    /// Lifetime of issued access tokens.
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 30)]
    pub token_ttl_minutes: i64,

    /// Page size of `fetchmany` when the client sends none.
    #[arg(long, default_value_t = DEFAULT_FETCH_MANY_SIZE)]
    pub fetch_many_default: i64,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log filter directive, e.g. `dbcsv_server=debug`. Overrides `--verbose`.
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Print an Argon2 hash for the accounts file.
    HashPassword {
        /// Plain text password.
        password: String,
    },
}

impl Cli {
    /// Resolves the accounts file path.
    #[must_use]
    pub fn accounts_path(&self) -> PathBuf {
        self.accounts
            .clone()
            .unwrap_or_else(|| self.data_dir.join("accounts.json"))
    }

    /// Installs the global tracing subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or a subscriber is already set.
    pub fn init_logging(&self) -> anyhow::Result<()> {
        let builder = FmtSubscriber::builder().with_target(false);

        match &self.log_filter {
            Some(filter) => {
                let subscriber = builder.with_env_filter(EnvFilter::try_new(filter)?).finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            None => {
                let level = if self.verbose { Level::DEBUG } else { Level::INFO };
                let subscriber = builder.with_max_level(level).finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dbcsv-server"]).unwrap();
        assert_eq!(cli.bind, "127.0.0.1:8001");
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.accounts_path(), PathBuf::from("data/accounts.json"));
        assert_eq!(cli.fetch_many_default, 100);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_hash_password_subcommand() {
        let cli = Cli::try_parse_from(["dbcsv-server", "hash-password", "secret123"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::HashPassword { ref password }) if password == "secret123"
        ));
    }

    #[test]
    fn test_explicit_accounts() {
        let cli =
            Cli::try_parse_from(["dbcsv-server", "--accounts", "/etc/dbcsv/accounts.json"]).unwrap();
        assert_eq!(cli.accounts_path(), PathBuf::from("/etc/dbcsv/accounts.json"));
    }
}
