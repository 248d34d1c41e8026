use anyhow::Result;
use axum::{
    routing::{delete, get},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::{handlers, state::AppState};
use crate::storage::Provider;

/// Routes from URL paths to provider calls; each route is a direct
/// call-through. The static `/configs/clear` segment takes priority over
/// the `:app` capture.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/configs", get(handlers::get_all))
        .route("/configs/clear", delete(handlers::clear))
        .route(
            "/configs/:app",
            get(handlers::get_app_config)
                .post(handlers::set_app_config)
                .delete(handlers::delete_app_config),
        )
        .route(
            "/configs/:app/:env",
            get(handlers::get_env_config)
                .post(handlers::set_env_config)
                .delete(handlers::delete_env_config),
        )
        .route(
            "/configs/:app/:env/:key",
            get(handlers::get_config)
                .post(handlers::set_config)
                .delete(handlers::delete_config),
        )
        .with_state(state)
}

pub async fn start_server(provider: Provider, bind_address: SocketAddr) -> Result<()> {
    let app_state = Arc::new(AppState { provider });

    let app = router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Server listening on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
