use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::classifier::{PipelineContext, MAX_UPLOAD_BYTES};
use crate::server::{routes, static_files};

/// Build the Axum application
pub fn build_app(context: PipelineContext) -> Router {
    // Axum's default body cap is below the 5 MiB gate; raise it so oversize
    // uploads reach the gate and get the proper too-large answer.
    let body_limit = MAX_UPLOAD_BYTES + 1024 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/model", get(routes::model_status))
        .route("/predict", post(routes::predict));

    Router::new()
        .nest("/api", api_routes)
        .fallback(static_files::serve_static)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(context)
}

/// Run the server
pub async fn run_server(context: PipelineContext, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_app(context);

    log::info!("Starting shoelens demo server on {}", addr);
    log::info!("Open http://{} in your browser", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
