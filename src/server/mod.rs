// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/server/mod.rs
// Version: 1.0.0
//
// This file implements the local HTTP API over the offline client. It builds
// the axum router and serves it on the configured address.
//
// Tree Location:
// - src/server/mod.rs (router and server loop)
// - Submodules: error, routes
// - Depends on: axum, tower-http, tokio

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::AppState;

use crate::store::OfflineClient;
use axum::Router;
use axum::routing::{get, post};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const LOG_TARGET: &str = "cmo::server";

/// Router with every API route, sharing `client` between requests
pub fn build_router(client: Arc<OfflineClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/entities/:entity",
            get(routes::list_entities).post(routes::create_entity),
        )
        .route(
            "/api/entities/:entity/:id",
            get(routes::get_entity)
                .put(routes::update_entity)
                .delete(routes::delete_entity),
        )
        .route("/api/auth/me", get(routes::me))
        .route("/api/auth/logout", post(routes::logout))
        .route("/api/app-logs", post(routes::log_app_visit))
        .route("/api/integrations/invoke-llm", post(routes::invoke_llm))
        .route("/api/integrations/send-email", post(routes::send_email))
        .route("/api/profitability", get(routes::profitability))
        .layer(cors)
        .with_state(client)
}

/// Serve the API on `bind` until the process stops.
pub async fn start_server(client: Arc<OfflineClient>, bind: SocketAddr) -> std::io::Result<()> {
    let app = build_router(client);

    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(target: LOG_TARGET, "❌ Failed to bind API server to {}: {}", bind, e);
            error!(target: LOG_TARGET, "💡 Make sure the port is not already in use");
            return Err(e);
        }
    };

    info!(target: LOG_TARGET, "🌐 Local API available at: http://{}/api", bind);
    info!(target: LOG_TARGET, "🩺 Health check: http://{}/api/health", bind);

    axum::serve(listener, app).await
}

// Changelog:
// - v1.0.0 (2026-10-19): Initial local API.
//   - Entity CRUD, auth placeholder, usage log, integration shims and the
//     profitability report over one shared offline client.
//   - Unknown entities answer 404, malformed bodies 400, both as JSON.
