use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use configs::AppConfig;
use service::auth::hasher::CredentialHasher;
use service::auth::notifier::HttpProfileNotifier;
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::auth::token::TokenIssuer;
use service::auth::AuthService;

use crate::routes::{self, auth};

/// Restrict to the configured browser origin; stay permissive when none is
/// configured (local development).
fn build_cors(cfg: &AppConfig) -> anyhow::Result<CorsLayer> {
    match &cfg.cors.allowed_origin {
        Some(origin) => Ok(CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)),
        None => Ok(CorsLayer::very_permissive()),
    }
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

pub fn build_state(db: sea_orm::DatabaseConnection, cfg: &AppConfig) -> auth::ServerState {
    let tokens = TokenIssuer::new(
        cfg.jwt.key.clone(),
        cfg.jwt.issuer.clone(),
        cfg.jwt.audience.clone(),
        cfg.jwt.expiry_minutes,
    );
    let auth_svc = AuthService::new(
        Arc::new(SeaOrmUserRepository { db }),
        Arc::new(HttpProfileNotifier::new(cfg.profile.base_url.clone())),
        CredentialHasher::default(),
        tokens.clone(),
    );
    auth::ServerState { auth: Arc::new(auth_svc), tokens }
}

/// Public entry: load config, migrate, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = AppConfig::load_and_validate()?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;

    let state = build_state(db, &cfg);
    let cors = build_cors(&cfg)?;
    let app: Router = routes::build_router(cors, state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting auth server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
