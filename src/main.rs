use config::Config;
use middleware::configure_cors;
use repositories::PostgresRepo;
use routes::create_routes;
use services::board::BoardService;
use sqlx::postgres::PgPoolOptions;
use storage::LocalStorage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod storage;
mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub board_service: BoardService,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("board=debug,tower_http=debug")),
        )
        .init();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            error!("DATABASE_URL must be set: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(&config);
    if let Err(err) = storage.ensure_dir().await {
        error!(
            "Failed to create upload directory {}: {:?}",
            config.upload_dir.display(),
            err
        );
        std::process::exit(1);
    }

    let app_state = AppState {
        board_service: BoardService::new(Arc::new(PostgresRepo::new(pool)), storage),
        config: config.clone(),
    };

    let app = create_routes(Arc::new(app_state)).layer(configure_cors());

    let listener = match tokio::net::TcpListener::bind(format!("[::]:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {:?}", err);
        std::process::exit(1);
    }
}
