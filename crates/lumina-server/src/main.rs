//! lumina-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `LUMINA_*` environment variables, opens the SQLite store and serves the
//! reservation API over HTTP.
//!
//! # Seeding a deployment
//!
//! ```text
//! lumina-server bootstrap --building "Lumina Tower" \
//!   --admin-name "Ada" --admin-email ada@example.com
//! ```
//!
//! prints the first administrator's bearer token.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lumina_core::{BookingService, clock::SystemClock};
use lumina_server::{AppState, ServerConfig};
use lumina_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lumina amenity reservation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Create a building and its first administrator, then print the token.
  Bootstrap {
    #[arg(long)]
    building:    String,
    #[arg(long)]
    admin_name:  String,
    #[arg(long)]
    admin_email: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "~/.local/share/lumina/lumina.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LUMINA"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let bookings = BookingService::new(Arc::new(store), Arc::new(SystemClock));

  match cli.command.unwrap_or(Command::Serve) {
    Command::Bootstrap {
      building,
      admin_name,
      admin_email,
    } => {
      let (building, admin) = bookings
        .bootstrap(&building, &admin_name, &admin_email)
        .await
        .context("bootstrap failed")?;
      println!("building_id: {}", building.building_id);
      println!("admin_id:    {}", admin.resident.resident_id);
      println!("admin_token: {}", admin.token);
      Ok(())
    }
    Command::Serve => serve(bookings, server_cfg).await,
  }
}

async fn serve(bookings: BookingService<SqliteStore>, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState { bookings };
  let app = lumina_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
