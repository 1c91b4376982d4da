mod auth;
mod config;
mod error;
mod models;
mod routes;
mod storage;
mod templates;

use std::path::Path;
use std::sync::Arc;

use auth::token::AdminToken;
use axum::Router;
use clap::{Parser, Subcommand};
use config::Config;
use storage::{MemoryStore, PgStore, RsvpStore};
use tera::Tera;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub store: RsvpStore,
    pub admin_token: AdminToken,
    pub templates: Arc<Tera>,
}

#[derive(Parser)]
#[command(about = "Invitation RSVP server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep RSVPs in process memory instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },
    /// Print a random admin token suitable for ADMIN_TOKEN
    GenToken {
        #[arg(long, default_value_t = 32)]
        length: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { in_memory: false }) {
        Command::GenToken { length } => println!("{}", auth::token::generate(length)),
        Command::Serve { in_memory } => serve(in_memory).await,
    }
}

async fn serve(in_memory: bool) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let store = if in_memory {
        tracing::warn!("using in-memory storage; RSVPs will be lost on restart");
        RsvpStore::Memory(MemoryStore::new())
    } else {
        match PgStore::connect(&config).await {
            Ok(store) => RsvpStore::Postgres(store),
            Err(e) => {
                tracing::error!("failed to initialise database: {e}");
                std::process::exit(1);
            }
        }
    };

    let templates = match templates::load() {
        Ok(tera) => Arc::new(tera),
        Err(e) => {
            tracing::error!("failed to load templates: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        store,
        admin_token: config.admin_token.clone(),
        templates,
    };

    let app: Router = routes::api_router()
        .merge(routes::pages_router(Path::new(&config.static_dir)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
