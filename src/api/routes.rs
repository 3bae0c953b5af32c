//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

/// JSON 404 for unknown routes
async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(r#"{"error":"Not Found"}"#),
    )
        .into_response()
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ws", get(ws_handler))
        // Queries
        .route("/api/token", get(handlers::get_token_info))
        .route("/api/balances/{address}", get(handlers::get_balance))
        .route("/api/allowance", get(handlers::get_allowance))
        .route("/api/history", get(handlers::get_history))
        // Operations
        .route("/api/transfer", post(handlers::transfer))
        .route("/api/approve", post(handlers::approve))
        .route("/api/transferFrom", post(handlers::transfer_from))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(cors)
}

/// Bind and serve until the process is interrupted
pub async fn serve(config: &ServerConfig, state: ApiState) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log::info!("REST API listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Shutting down API server...");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[tokio::test]
    async fn test_fallback_is_json_404() {
        let response = fallback_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
