//! Canned route client for offline runs
//!
//! Returns a fixed route after an optional delay, standing in for the
//! routing backend when there is no network: demo runs, integration
//! tests, development.

use async_trait::async_trait;
use pathcodec::Coordinate;
use std::time::Duration;
use tokio::time::sleep;

use super::{RouteClient, RouteError};
use crate::domain::Route;

/// Demo shape used when none is configured (three points in the Sierra
/// Nevada, the canonical sample for this path encoding)
pub const DEMO_SHAPE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

/// Route client that always returns the same route
pub struct CannedRouteClient {
    route: Route,
    delay: Duration,
}

impl CannedRouteClient {
    /// Serve the given route after `delay`
    pub fn new(route: Route, delay: Duration) -> Self {
        Self { route, delay }
    }

    /// A demo instance: the sample shape, four instructions, one second
    /// of simulated backend latency
    pub fn demo() -> Self {
        Self::new(
            Route::new(
                DEMO_SHAPE,
                vec![
                    "Turn right".to_string(),
                    "Continue straight for 1 km".to_string(),
                    "Turn left".to_string(),
                    "You have arrived at your destination".to_string(),
                ],
            ),
            Duration::from_secs(1),
        )
    }
}

#[async_trait]
impl RouteClient for CannedRouteClient {
    async fn fetch_route(&self, _origin: Coordinate, _destination: Coordinate) -> Result<Route, RouteError> {
        sleep(self.delay).await;
        Ok(self.route.clone())
    }
}
