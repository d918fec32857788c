//! Provision a staff account directly in the database.
//!
//! Public registration only ever creates applicants, so operators use this
//! command to seed the first reviewers.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use design_desk::domain::{AccountService, Registration, RegistrationInput};
use design_desk::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_migrations,
};
use tokio::runtime::Builder;
use zeroize::Zeroizing;

const DATABASE_URL_ENV: &str = "DESIGN_DESK_DATABASE_URL";

/// `create-staff` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-staff",
    about = "Create a staff account that can review design requests",
    version
)]
struct CliArgs {
    #[arg(long, value_name = "name")]
    username: String,
    #[arg(long, value_name = "address")]
    email: String,
    #[arg(long = "first-name", value_name = "name")]
    first_name: String,
    #[arg(long = "last-name", value_name = "name")]
    last_name: String,
    /// Password for the account. Read from `DESIGN_DESK_STAFF_PASSWORD`
    /// when omitted so it stays out of shell history.
    #[arg(long, value_name = "secret", env = "DESIGN_DESK_STAFF_PASSWORD")]
    password: String,
    /// Database connection URL. Falls back to `DESIGN_DESK_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Apply pending migrations before inserting the account.
    #[arg(long)]
    migrate: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url.clone())?;
    let password = Zeroizing::new(args.password.clone());

    let registration = Registration::try_from_input(&RegistrationInput {
        username: &args.username,
        email: &args.email,
        first_name: &args.first_name,
        last_name: &args.last_name,
        password: password.as_str(),
        password_confirm: password.as_str(),
    })
    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    if args.migrate {
        let url = database_url.clone();
        let applied = tokio::task::spawn_blocking(move || run_migrations(&url))
            .await
            .map_err(|error| io::Error::other(format!("migration worker failed: {error}")))?
            .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
        println!("migrations_applied={}", applied.len());
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let accounts = AccountService::new(Arc::new(DieselUserRepository::new(pool)));
    let user = accounts
        .create_account(&registration, true)
        .await
        .map_err(|error| io::Error::other(format!("create staff account: {error}")))?;

    println!("user_id={}", user.id());
    println!("username={}", user.username());
    Ok(())
}

fn resolve_database_url(cli_value: Option<String>) -> io::Result<String> {
    cli_value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            env::var(DATABASE_URL_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("database URL missing: pass --database-url or set {DATABASE_URL_ENV}"),
            )
        })
}
