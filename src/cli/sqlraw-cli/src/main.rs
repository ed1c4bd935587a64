//! sqlraw CLI - Run the SQL raw user backend from the command line.

mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use sqlraw_auth::{hash, Actions, SqlRawBackend, UserBackend};
use sqlraw_storage_sqlite::SqliteConnector;

use crate::settings::Settings;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "sqlraw")]
#[command(about = "sqlraw - Authenticate and list users with administrator-supplied SQL queries")]
#[command(version)]
struct Cli {
    /// Settings file path
    #[arg(short, long, default_value = "config/sqlraw.toml", env = "SQLRAW_CONFIG")]
    config: PathBuf,

    /// Database URL (overrides [database] url from the settings file)
    #[arg(long, env = "SQLRAW_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which optional actions the configured queries support
    Capabilities,
    /// Check a user's password
    CheckPassword {
        /// Login name
        username: String,
        /// Password (or read from stdin if not provided)
        #[arg(long, env = "SQLRAW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Check whether a user exists
    UserExists {
        /// Login name
        username: String,
    },
    /// List users whose name contains a search string
    ListUsers {
        /// Substring to search for
        #[arg(long, default_value = "")]
        search: String,
        /// Maximum number of users
        #[arg(long)]
        limit: Option<u32>,
        /// Number of users to skip
        #[arg(long)]
        offset: Option<u32>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Hash a password with Argon2id (for preparing user tables)
    HashPassword {
        /// Password (or read from stdin if not provided)
        #[arg(long, env = "SQLRAW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ============================================================================
// Helpers
// ============================================================================

fn read_password(password: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(password) = password {
        return Ok(Zeroizing::new(password));
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;

    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn build_backend(cli: &Cli) -> Result<SqlRawBackend<SqliteConnector>> {
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    let database = settings.database(cli.database_url.as_deref())?;

    tracing::debug!(config = %cli.config.display(), "Backend configured");
    Ok(SqlRawBackend::new(settings.queries, SqliteConnector::new(database)))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_capabilities(backend: &SqlRawBackend<SqliteConnector>) -> bool {
    let queries = backend.config();

    println!("Backend: {}", backend.backend_name());
    println!(
        "  check_password: {}",
        yes_no(backend.implements_actions(Actions::CHECK_PASSWORD))
    );
    println!(
        "  user_exists:    {}",
        yes_no(queries.user_exists_query().is_some())
    );
    println!(
        "  get_users:      {}",
        yes_no(queries.get_users_query().is_some())
    );

    true
}

async fn cmd_check_password(
    backend: &SqlRawBackend<SqliteConnector>,
    username: &str,
    password: Option<String>,
) -> Result<bool> {
    let password = read_password(password)?;

    match backend.check_password(username, &password).await? {
        Some(uid) => {
            println!("Authenticated as '{}'", uid);
            Ok(true)
        },
        None => {
            println!("Not authenticated");
            Ok(false)
        },
    }
}

async fn cmd_user_exists(backend: &SqlRawBackend<SqliteConnector>, username: &str) -> Result<bool> {
    let exists = backend.user_exists(username).await?;

    if exists {
        println!("User '{}' exists", username);
    } else {
        println!("User '{}' not found", username);
    }

    Ok(exists)
}

async fn cmd_list_users(
    backend: &SqlRawBackend<SqliteConnector>,
    search: &str,
    limit: Option<u32>,
    offset: Option<u32>,
    format: OutputFormat,
) -> Result<bool> {
    let users = backend.get_users(search, limit, offset).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&users)?);
        },
        OutputFormat::Text => {
            if users.is_empty() {
                println!("No users found");
            } else {
                for user in &users {
                    println!("{}", user);
                }
            }
        },
    }

    Ok(!users.is_empty())
}

fn cmd_hash_password(password: Option<String>) -> Result<bool> {
    let password = read_password(password)?;
    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    println!("{}", hash::hash_password(&password)?);
    Ok(true)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let positive = match &cli.command {
        Commands::HashPassword { password } => cmd_hash_password(password.clone())?,
        Commands::Capabilities => cmd_capabilities(&build_backend(&cli)?),
        Commands::CheckPassword { username, password } => {
            cmd_check_password(&build_backend(&cli)?, username, password.clone()).await?
        },
        Commands::UserExists { username } => {
            cmd_user_exists(&build_backend(&cli)?, username).await?
        },
        Commands::ListUsers {
            search,
            limit,
            offset,
            format,
        } => cmd_list_users(&build_backend(&cli)?, search, *limit, *offset, *format).await?,
    };

    Ok(if positive {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
