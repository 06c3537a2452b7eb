//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::catalog::LotCatalog;
use crate::error::ParseError;
use crate::filter::Filter;
use crate::lot::Lot;
use crate::version::VersionInfo;

/// Shared state behind every route.
pub struct ApiState {
    catalog: LotCatalog,
    version: VersionInfo,
}

impl ApiState {
    pub fn new(catalog: LotCatalog) -> Self {
        Self {
            catalog,
            version: VersionInfo::new(),
        }
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    pub fn catalog(&self) -> &LotCatalog {
        &self.catalog
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LotsQuery {
    pub permit: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
}

impl LotsQuery {
    /// Build the filter, taking omitted fields from `fallback`.
    pub fn into_filter(self, fallback: Filter) -> Result<Filter, ParseError> {
        Ok(Filter {
            permit: self.permit.map_or(Ok(fallback.permit), |p| p.parse())?,
            day: self.day.map_or(Ok(fallback.day), |d| d.parse())?,
            time: self.time.map_or(Ok(fallback.time), |t| t.parse())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub lots: usize,
    pub version: VersionInfo,
}

#[derive(Debug)]
pub struct ApiError(ParseError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "READY",
        lots: state.catalog.len(),
        version: state.version.clone(),
    })
}

async fn list_lots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LotsQuery>,
) -> Result<Json<Vec<Lot>>, ApiError> {
    let filter = query.into_filter(Filter::default()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected lot query");
        ApiError(e)
    })?;

    let lots = state.catalog.evaluate(&filter);
    tracing::debug!(
        permit = %filter.permit,
        day = %filter.day,
        time = %filter.time,
        available = lots.iter().filter(|l| l.available).count(),
        total = lots.len(),
        "Served lots"
    );
    Ok(Json(lots))
}

pub fn routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/api/lots", get(list_lots))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::{Day, Permit, TimeOfDay};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const CATALOG: &str = r#"[
        {"id": "y1", "name": "Yellow Yard", "type": "yellow", "position": [40.5, -74.45], "restrictions": "No permit needed after 5pm"},
        {"id": "r1", "name": "Red Deck", "type": "red", "position": [40.51, -74.46]},
        {"id": "b1", "name": "Blue Lot", "type": "blue", "position": [40.52, -74.47]}
    ]"#;

    fn app() -> Router {
        let catalog = LotCatalog::from_json(CATALOG.as_bytes()).unwrap();
        routes(Arc::new(ApiState::new(catalog)))
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, response_json(response).await)
    }

    #[tokio::test]
    async fn health_check_reports_catalog_size() {
        let (status, json) = get_json("/health-check").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "READY");
        assert_eq!(json["lots"], 3);
        assert!(json["version"]["parkview"].is_string());
    }

    #[tokio::test]
    async fn lots_weekday_business_hours_without_permit() {
        let (status, json) = get_json("/api/lots?permit=none&day=Tue&time=16:59").await;

        assert_eq!(status, StatusCode::OK);
        insta::with_settings!({ sort_maps => true }, {
            insta::assert_json_snapshot!(json, @r#"
            [
              {
                "available": false,
                "id": "y1",
                "name": "Yellow Yard",
                "position": [
                  40.5,
                  -74.45
                ],
                "restrictions": "No permit needed after 5pm",
                "type": "YELLOW"
              },
              {
                "available": false,
                "id": "r1",
                "name": "Red Deck",
                "position": [
                  40.51,
                  -74.46
                ],
                "restrictions": "",
                "type": "RED"
              },
              {
                "available": false,
                "id": "b1",
                "name": "Blue Lot",
                "position": [
                  40.52,
                  -74.47
                ],
                "restrictions": "",
                "type": "BLUE"
              }
            ]
            "#);
        });
    }

    #[tokio::test]
    async fn lots_open_at_five_pm() {
        let (_, json) = get_json("/api/lots?permit=none&day=Tue&time=17:00").await;
        assert_eq!(json[0]["available"], true);
    }

    #[tokio::test]
    async fn lots_honour_exact_permit() {
        let (_, json) = get_json("/api/lots?permit=RED&day=sun&time=03:00").await;
        let available: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|lot| lot["available"].as_bool().unwrap())
            .collect();
        assert_eq!(available, [false, true, false]);
    }

    #[tokio::test]
    async fn lots_reject_malformed_time() {
        let (status, json) = get_json("/api/lots?permit=none&day=Mon&time=25:61").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("25:61"));
    }

    #[tokio::test]
    async fn lots_reject_unknown_permit() {
        let (status, _) = get_json("/api/lots?permit=gold").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lots_default_missing_params() {
        let (status, json) = get_json("/api/lots").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 3);
        // Monday 09:00 without a permit: inside the yellow restriction window.
        assert_eq!(json[0]["available"], false);
    }

    #[tokio::test]
    async fn lots_fill_only_missing_params() {
        let (_, json) = get_json("/api/lots?day=Sat").await;
        assert_eq!(json[0]["available"], true);
        assert_eq!(json[1]["available"], false);
    }

    #[test]
    fn query_falls_back_per_field() {
        let fallback = Filter::new(Permit::Blue, Day::Sun, TimeOfDay::MIDNIGHT);
        let query = LotsQuery {
            permit: None,
            day: Some("wed".to_string()),
            time: None,
        };
        assert_eq!(
            query.into_filter(fallback).unwrap(),
            Filter::new(Permit::Blue, Day::Wed, TimeOfDay::MIDNIGHT)
        );
    }
}
