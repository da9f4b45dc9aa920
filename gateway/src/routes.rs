use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use geo_proximity::{geocode::reverse_geocode, Coordinate, SafeLocation};
use risk_engine::{assess, base_recommendations, zone_message, RiskAssessment, RiskSignals};
use threat_intel::lookup_or_none;

/// Posture check request body
#[derive(Deserialize)]
pub struct PostureCheckRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// IP or SSID; falls back to X-Forwarded-For, then loopback
    pub connection_identifier: Option<String>,
}

/// Posture check response envelope
#[derive(Serialize)]
pub struct PostureCheckResponse {
    pub assessment_id: uuid::Uuid,
    pub checked_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub assessment: RiskAssessment,
    pub message: String,
    pub recommendations: Vec<String>,
}

#[derive(Serialize)]
pub struct SafeLocationInfo {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Client-facing error with a generic message; detail stays in the logs
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Resolve the connection identifier: explicit body value, then the first
/// X-Forwarded-For hop, then loopback for direct connections.
fn resolve_identifier(body: Option<String>, headers: &HeaderMap) -> String {
    if let Some(id) = body.filter(|s| !s.trim().is_empty()) {
        return id;
    }
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return forwarded.to_string();
    }
    "127.0.0.1".to_string()
}

/// Validate coordinates before any scoring or collaborator call
fn validate_coordinates(req: &PostureCheckRequest) -> Result<Coordinate, ApiError> {
    let (lat, lon) = match (req.latitude, req.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(ApiError::bad_request(
                "Missing required fields: latitude and longitude",
            ))
        }
    };
    Coordinate::new(lat, lon)
        .map_err(|_| ApiError::bad_request("Invalid latitude or longitude"))
}

pub async fn check_posture(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PostureCheckRequest>,
) -> Result<Json<PostureCheckResponse>, ApiError> {
    let point = validate_coordinates(&req)?;
    let identifier = resolve_identifier(req.connection_identifier, &headers);

    // Proximity is in-memory; the two external lookups are independent and
    // issued concurrently. Threat lookup is skipped outside known regions.
    let proximity = state.safe_locations.classify(point);
    let region = reverse_geocode(point);

    let (network, threats) = tokio::join!(
        state.network.classify_identifier(&identifier),
        async {
            match &region {
                Some(info) => Some(lookup_or_none(state.threats.as_ref(), &info.region).await),
                None => None,
            }
        }
    );

    let signals = RiskSignals {
        within_safe_zone: proximity.within_safe_zone,
        nearest_safe_km: proximity.nearest_distance_km,
        network,
        threats,
    };
    let assessment = assess(&signals, &state.engine);

    if assessment.zone == risk_engine::Zone::Red {
        // Alert delivery is handled outside this service
        tracing::warn!(
            score = assessment.score,
            latitude = point.latitude,
            longitude = point.longitude,
            "Red zone assessment"
        );
    }

    let recommendations = base_recommendations(assessment.zone)
        .iter()
        .map(|r| r.to_string())
        .collect();

    Ok(Json(PostureCheckResponse {
        assessment_id: uuid::Uuid::new_v4(),
        checked_at: chrono::Utc::now().to_rfc3339(),
        region: region.map(|r| r.region),
        message: zone_message(assessment.zone).to_string(),
        recommendations,
        assessment,
    }))
}

pub async fn list_safe_locations(State(state): State<AppState>) -> Json<Vec<SafeLocationInfo>> {
    let locations = state
        .safe_locations
        .iter()
        .map(|l: &SafeLocation| SafeLocationInfo {
            id: l.id.clone(),
            name: l.name.clone(),
            latitude: l.coordinate.latitude,
            longitude: l.coordinate.longitude,
        })
        .collect();

    Json(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use network_trust::{
        IpMetadata, NetworkClassifier, NetworkError, NetworkMetadataProvider, SsidAllowList,
    };
    use std::collections::HashMap;
    use std::sync::Arc;
    use threat_intel::{StaticThreatFeed, ThreatReport};
    use tower::ServiceExt;

    struct StubProvider {
        isp: &'static str,
        org: &'static str,
    }

    #[async_trait]
    impl NetworkMetadataProvider for StubProvider {
        async fn fetch(&self, _identifier: &str) -> Result<IpMetadata, NetworkError> {
            Ok(IpMetadata {
                isp: self.isp.to_string(),
                org: self.org.to_string(),
            })
        }
    }

    fn test_state(provider: StubProvider, threats: StaticThreatFeed) -> crate::AppState {
        let safe_locations = geo_proximity::SafeLocationSet::from_locations(vec![SafeLocation {
            id: "home".to_string(),
            name: "Home".to_string(),
            coordinate: Coordinate::new(40.7128, -74.0060).unwrap(),
        }]);

        crate::AppState {
            safe_locations: Arc::new(safe_locations),
            network: Arc::new(NetworkClassifier::new(
                Arc::new(provider),
                SsidAllowList::default(),
            )),
            threats: Arc::new(threats),
            engine: risk_engine::EngineConfig::default(),
        }
    }

    async fn post_check(state: crate::AppState, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/posture/check")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state(
            StubProvider {
                isp: "Comcast",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let response = app(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_coordinates_rejected() {
        let state = test_state(
            StubProvider {
                isp: "Comcast",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let (status, json) = post_check(state, serde_json::json!({ "latitude": 40.7 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("latitude"));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let state = test_state(
            StubProvider {
                isp: "Comcast",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let (status, _) = post_check(
            state,
            serde_json::json!({ "latitude": 140.0, "longitude": -74.0 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_green_zone_at_home_on_residential_network() {
        let state = test_state(
            StubProvider {
                isp: "Comcast Cable",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let (status, json) = post_check(
            state,
            serde_json::json!({
                "latitude": 40.7128,
                "longitude": -74.0060,
                "connection_identifier": "203.0.113.7"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["assessment"]["score"], 0);
        assert_eq!(json["assessment"]["zone"], "Green");
        // Home is inside the New York region box, so the threat factor is evaluated
        assert_eq!(json["assessment"]["factors"].as_array().unwrap().len(), 3);
        assert_eq!(json["region"], "New York");
    }

    #[tokio::test]
    async fn test_red_zone_with_threats_on_unmatched_network() {
        let mut reports = HashMap::new();
        reports.insert(
            "New York".to_string(),
            ThreatReport {
                count: 3,
                kinds: vec!["Phishing Scam".to_string()],
            },
        );

        let state = test_state(
            StubProvider {
                isp: "Mystery Telecom",
                org: "",
            },
            StaticThreatFeed::new(reports),
        );

        // ~10km from home, unmatched ISP, active threats: 2 + 4 + 5 = 11
        let (status, json) = post_check(
            state,
            serde_json::json!({
                "latitude": 40.8028,
                "longitude": -74.0060,
                "connection_identifier": "203.0.113.7"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["assessment"]["score"], 11);
        assert_eq!(json["assessment"]["zone"], "Red");
        let actions = json["assessment"]["actions"].as_array().unwrap();
        assert!(!actions.is_empty());
    }

    #[tokio::test]
    async fn test_identifier_falls_back_to_forwarded_header() {
        let state = test_state(
            StubProvider {
                isp: "Comcast",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/posture/check")
                    .header("content-type", "application/json")
                    .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
                    .body(Body::from(
                        serde_json::json!({ "latitude": 40.7128, "longitude": -74.0060 })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_safe_locations() {
        let state = test_state(
            StubProvider {
                isp: "Comcast",
                org: "",
            },
            StaticThreatFeed::empty(),
        );

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/safe-locations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "home");
    }

    #[test]
    fn test_resolve_identifier_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());

        assert_eq!(
            resolve_identifier(Some("Office_WiFi".to_string()), &headers),
            "Office_WiFi"
        );
        assert_eq!(resolve_identifier(None, &headers), "203.0.113.9");
        assert_eq!(resolve_identifier(None, &HeaderMap::new()), "127.0.0.1");
    }
}
