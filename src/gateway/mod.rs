//! HTTP gateway
//!
//! | Route                              | Auth |
//! |------------------------------------|------|
//! | `POST /accounts`                   | no   |
//! | `GET /accounts`                    | JWT  |
//! | `GET /accounts/{account_id}/balance` | JWT |
//! | `POST /login`                      | no   |
//! | `POST /transfers`, `GET /transfers` | JWT |
//! | `GET /health`                      | no   |

pub mod handlers;
pub mod middleware;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::auth::jwt_auth_middleware;
use crate::repository::Backend;
use state::AppState;

/// Build the complete router
pub fn router<B: Backend>(state: Arc<AppState<B>>) -> Router {
    let auth = from_fn_with_state(state.jwt.clone(), jwt_auth_middleware);

    Router::new()
        .route(
            "/accounts",
            post(handlers::create_account::<B>)
                .merge(get(handlers::list_accounts::<B>).route_layer(auth.clone())),
        )
        .route(
            "/accounts/{account_id}/balance",
            get(handlers::get_balance::<B>).route_layer(auth.clone()),
        )
        .route("/login", post(handlers::login::<B>))
        .route(
            "/transfers",
            post(handlers::create_transfer::<B>)
                .get(handlers::list_transfers::<B>)
                .route_layer(auth),
        )
        .route("/health", get(handlers::health_check::<B>))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(from_fn(middleware::request_logger))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn run_server<B: Backend>(addr: &str, state: Arc<AppState<B>>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")
}
