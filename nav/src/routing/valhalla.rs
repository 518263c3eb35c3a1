//! Valhalla routing API client implementation
//!
//! Implements the RouteClient trait against a Valhalla `/route` endpoint:
//! one POST per fetch, trip shape plus the flattened maneuver instructions
//! pulled out of the response.

use async_trait::async_trait;
use pathcodec::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{RouteClient, RouteError};
use crate::config::RoutingConfig;
use crate::domain::Route;

/// Valhalla routing API client
pub struct ValhallaClient {
    base_url: String,
    costing: String,
    http: Client,
    timeout: Duration,
}

/// Response body subset: trip-level shape plus per-leg maneuver texts
#[derive(Debug, Deserialize)]
struct RouteResponse {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    shape: String,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    maneuvers: Vec<Maneuver>,
}

#[derive(Debug, Deserialize)]
struct Maneuver {
    instruction: String,
}

impl ValhallaClient {
    /// Create a new client from configuration
    pub fn from_config(config: &RoutingConfig) -> Result<Self, RouteError> {
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(RouteError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            costing: config.costing.clone(),
            http,
            timeout,
        })
    }

    /// Build the request body for the `/route` endpoint
    fn build_request_body(&self, origin: Coordinate, destination: Coordinate) -> serde_json::Value {
        serde_json::json!({
            "locations": [
                { "lat": origin.lat, "lon": origin.lon },
                { "lat": destination.lat, "lon": destination.lon },
            ],
            "costing": self.costing,
        })
    }
}

/// Flatten a response body into a Route
///
/// Legs and maneuvers collapse into one travel-ordered instruction list;
/// the shape string is carried verbatim.
fn parse_route(body: &str) -> Result<Route, RouteError> {
    let response: RouteResponse =
        serde_json::from_str(body).map_err(|e| RouteError::InvalidResponse(e.to_string()))?;

    let instructions = response
        .trip
        .legs
        .into_iter()
        .flat_map(|leg| leg.maneuvers)
        .map(|m| m.instruction)
        .collect();

    Ok(Route::new(response.trip.shape, instructions))
}

#[async_trait]
impl RouteClient for ValhallaClient {
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route, RouteError> {
        let url = format!("{}/route", self.base_url);
        let body = self.build_request_body(origin, destination);

        debug!(%url, origin_lat = origin.lat, origin_lon = origin.lon, "fetch_route: sending request");

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                RouteError::Timeout(self.timeout)
            } else {
                RouteError::Network(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RouteError::Timeout(self.timeout)
            } else {
                RouteError::Network(e)
            }
        })?;

        if !status.is_success() {
            return Err(RouteError::Backend {
                status: status.as_u16(),
                message: text,
            });
        }

        let route = parse_route(&text)?;
        debug!(
            instruction_count = route.instructions.len(),
            shape_len = route.shape.len(),
            "fetch_route: route received"
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "trip": {
            "shape": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
            "legs": [
                {
                    "maneuvers": [
                        { "instruction": "Turn right" },
                        { "instruction": "Continue for 1 km" }
                    ]
                },
                {
                    "maneuvers": [
                        { "instruction": "Turn left" },
                        { "instruction": "You have arrived" }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_route_flattens_legs() {
        let route = parse_route(SAMPLE_RESPONSE).unwrap();
        assert_eq!(route.shape, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
        assert_eq!(route.instructions.len(), 4);
        assert_eq!(route.instructions[0], "Turn right");
        assert_eq!(route.instructions[3], "You have arrived");
    }

    #[test]
    fn test_parse_route_without_legs() {
        let route = parse_route(r#"{"trip":{"shape":"??"}}"#).unwrap();
        assert!(route.instructions.is_empty());
    }

    #[test]
    fn test_parse_route_rejects_garbage() {
        assert!(matches!(
            parse_route("not json"),
            Err(RouteError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_route(r#"{"no_trip": true}"#),
            Err(RouteError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_build_request_body() {
        let config = RoutingConfig::default();
        let client = ValhallaClient::from_config(&config).unwrap();
        let body = client.build_request_body(Coordinate::new(48.0061, 0.1996), Coordinate::new(48.0, 0.2));

        assert_eq!(body["costing"], "auto");
        assert_eq!(body["locations"][0]["lat"], 48.0061);
        assert_eq!(body["locations"][1]["lon"], 0.2);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = RoutingConfig {
            base_url: "https://valhalla.example.com/".to_string(),
            ..Default::default()
        };
        let client = ValhallaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "https://valhalla.example.com");
    }
}
