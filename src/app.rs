/*
 * Responsibility
 * - Load Config -> build dependencies -> assemble the Router
 * - Apply middleware
 * - Serve with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware::http::{self, HttpLimits};
use crate::services::directory::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
use crate::services::sso::RoleResolver;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,sso_role_resolver=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting SSO role resolver in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, HttpLimits::new(config.request_timeout_seconds));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let directory: Arc<dyn UserDirectory> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .context("connecting to the user directory database")?;
            Arc::new(PgUserDirectory::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; every SSO login is treated as a new user");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    tracing::info!(
        directory = directory.backend_name(),
        mapped_roles = config.policy.role_mapping.len(),
        default_role = %config.policy.default_role,
        claims_role_path = %config.policy.claims_role_path,
        "sso policy loaded"
    );

    let resolver = RoleResolver::new(config.policy.clone(), directory);
    Ok(AppState::new(Arc::new(resolver)))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    http::apply(router, limits)
}
