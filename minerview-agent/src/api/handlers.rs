//! API endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::api_client::types::{
    MinerQueryResponse, NormalizedRecord, ParamErrorResponse, QueryErrorResponse,
};
use crate::miner::MinerError;
use crate::normalize;
use crate::tracing::prelude::*;

/// Build the API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(get_miner_data))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Query parameters for the miners endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
struct MinerQuery {
    /// Device network address.
    ip: Option<String>,
}

/// Query a device and return its normalized telemetry.
#[utoipa::path(
    get,
    path = "/miners",
    tag = "miners",
    params(MinerQuery),
    responses(
        (status = OK, description = "Normalized device telemetry", body = MinerQueryResponse),
        (status = BAD_REQUEST, description = "Missing ip parameter", body = ParamErrorResponse),
        (status = BAD_GATEWAY, description = "Device unreachable or misbehaving", body = QueryErrorResponse),
    ),
)]
async fn get_miner_data(
    State(state): State<SharedState>,
    Query(query): Query<MinerQuery>,
) -> Response {
    let Some(ip) = query.ip.filter(|ip| !ip.is_empty()) else {
        let body = ParamErrorResponse {
            error: "IP parameter is required".to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match query_device(&state, &ip).await {
        Ok(data) => Json(MinerQueryResponse {
            success: true,
            ip,
            data,
        })
        .into_response(),
        Err(err) => {
            warn!("device query for {ip} failed: {err}");
            let body = QueryErrorResponse {
                success: false,
                error: format!("Failed to connect to miner at {ip}: {err}"),
            };
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

/// Connect, fetch one snapshot, normalize. The awaits here are the only
/// suspension points in a request.
async fn query_device(state: &SharedState, ip: &str) -> Result<NormalizedRecord, MinerError> {
    let handle = state.client.connect(ip).await?;
    let snapshot = handle.fetch_snapshot().await?;
    Ok(normalize::normalize(&snapshot))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::server::{SharedState, router};
    use crate::miner::snapshot::{Hashboard, HashrateReading, PoolReading};
    use crate::miner::{MinerClient, MinerError, MinerHandle, Snapshot};

    struct FakeMiner {
        snapshot: Snapshot,
    }

    #[async_trait]
    impl MinerClient for FakeMiner {
        async fn connect(&self, _addr: &str) -> Result<Box<dyn MinerHandle>, MinerError> {
            Ok(Box::new(FakeHandle(self.snapshot.clone())))
        }
    }

    struct FakeHandle(Snapshot);

    #[async_trait]
    impl MinerHandle for FakeHandle {
        async fn fetch_snapshot(&self) -> Result<Snapshot, MinerError> {
            Ok(self.0.clone())
        }
    }

    struct DeadMiner;

    #[async_trait]
    impl MinerClient for DeadMiner {
        async fn connect(&self, _addr: &str) -> Result<Box<dyn MinerHandle>, MinerError> {
            Err(MinerError::Unreachable("connection refused".to_string()))
        }
    }

    fn app(client: Arc<dyn MinerClient>) -> Router {
        router(SharedState { client })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_ip_is_a_400_with_the_exact_error_body() {
        let app = app(Arc::new(FakeMiner {
            snapshot: Snapshot::default(),
        }));
        let (status, body) = get(app, "/api/miners").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "IP parameter is required"}));
    }

    #[tokio::test]
    async fn empty_ip_is_treated_as_missing() {
        let app = app(Arc::new(FakeMiner {
            snapshot: Snapshot::default(),
        }));
        let (status, _) = get(app, "/api/miners?ip=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn successful_query_wraps_the_normalized_record() {
        let snapshot = Snapshot {
            model: Some("Antminer S19".to_string()),
            hashrate: Some(HashrateReading { rate: 95.5 }),
            hashboards: vec![Hashboard {
                chip_temp: Some(61.0),
                board_temp: None,
            }],
            pools: vec![PoolReading {
                url: crate::compat::pool_url::resolve("stratum+tcp://ckpool.org:3333"),
                user: Some("worker".to_string()),
                status: Some("ok".to_string()),
            }],
            ..Snapshot::default()
        };
        let app = app(Arc::new(FakeMiner { snapshot }));
        let (status, body) = get(app, "/api/miners?ip=10.0.0.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["ip"], json!("10.0.0.5"));
        assert_eq!(body["data"]["model"], json!("Antminer S19"));
        assert_eq!(body["data"]["hashrate_avg"], json!(95.5));
        assert_eq!(body["data"]["temperature"], json!(61.0));
        assert_eq!(body["data"]["primary_pool"], json!("Ckpool"));
        // Unpopulated fields are present with null values.
        assert_eq!(body["data"]["mac"], Value::Null);
        assert!(body["data"].as_object().unwrap().contains_key("voltage"));
    }

    #[tokio::test]
    async fn unreachable_device_is_a_502_naming_the_address() {
        let app = app(Arc::new(DeadMiner));
        let (status, body) = get(app, "/api/miners?ip=10.0.0.5").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], json!(false));
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("10.0.0.5"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app(Arc::new(DeadMiner));
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn api_responses_allow_any_origin() {
        let app = app(Arc::new(DeadMiner));
        let response = app
            .oneshot(
                Request::get("/api/health")
                    .header("origin", "http://dashboard.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("*")
        );
    }
}
