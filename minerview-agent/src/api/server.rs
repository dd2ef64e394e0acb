//! HTTP server assembly.
//!
//! Routes live under `/api` with any-origin CORS; the OpenAPI document
//! and Swagger UI are served at `/docs`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::miner::MinerClient;
use crate::tracing::prelude::*;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct SharedState {
    pub client: Arc<dyn MinerClient>,
}

#[derive(OpenApi)]
#[openapi(info(
    title = "minerview-agent",
    description = "Mining device telemetry gateway"
))]
struct ApiDoc;

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let (api, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", super::handlers::routes())
        .split_for_parts();

    api.layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the listener fails or the process exits.
pub async fn serve(listen: SocketAddr, state: SharedState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!("API server listening on {listen}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
