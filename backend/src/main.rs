//! Backend entry-point: configuration, migrations, and server start-up.

mod server;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use clap::Parser;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::ServerConfig;

/// Embedded SQL migrations, applied on start-up when a database is
/// configured.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Command-line options; environment variables fill unset values.
#[derive(Debug, Parser)]
#[command(name = "backend", about = "Campus enrollment backend")]
struct Args {
    /// Socket address to bind.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// PostgreSQL connection URL; falls back to `DATABASE_URL`. Without one
    /// the server runs on the in-memory store (development only).
    #[arg(long)]
    database_url: Option<String>,

    /// File holding the session signing key; falls back to
    /// `SESSION_KEY_FILE`, then to an ephemeral key in debug builds.
    #[arg(long)]
    session_key_file: Option<PathBuf>,
}

fn load_session_key(args: &Args) -> std::io::Result<Key> {
    let key_path = args
        .session_key_file
        .clone()
        .or_else(|| env::var("SESSION_KEY_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("/var/run/secrets/session_key"));

    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                )))
            }
        }
    }
}

/// Apply pending migrations over a short-lived synchronous connection.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
        info!(count = applied.len(), "migrations applied");
        Ok(())
    })
    .await
    .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let key = load_session_key(&args)?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let database_url = args
        .database_url
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok());

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, args.bind);
    if let Some(url) = database_url {
        run_migrations(url.clone()).await?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(|e| std::io::Error::other(format!("pool construction failed: {e}")))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    info!(bind = %args.bind, "server started");
    server.await
}
