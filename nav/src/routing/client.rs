//! RouteClient trait definition

use async_trait::async_trait;
use pathcodec::Coordinate;

use super::RouteError;
use crate::domain::Route;

/// Stateless routing backend client - each call is independent
///
/// This is the controller's entire view of the routing backend: given an
/// origin and the destination, produce a route or fail. Transport
/// concerns (signing, body encoding, transport-level retries) live behind
/// this trait; callers only see the result.
#[async_trait]
pub trait RouteClient: Send + Sync {
    /// Fetch a route from `origin` to `destination`
    ///
    /// Cancellation is cooperative: dropping the returned future must
    /// abandon the request.
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route, RouteError>;
}


#[cfg(test)]
mod tests {
    use super::mock::MockRouteClient;
    use super::*;

    #[tokio::test]
    async fn test_mock_client_returns_responses_in_order() {
        let client = MockRouteClient::new(vec![
            Ok(Route::new("abc", vec!["turn left".to_string()])),
            Ok(Route::new("def", vec!["turn right".to_string()])),
        ]);

        let origin = Coordinate::new(48.0, 2.0);
        let dest = Coordinate::new(48.1, 2.1);

        let first = client.fetch_route(origin, dest).await.unwrap();
        assert_eq!(first.shape, "abc");

        let second = client.fetch_route(origin, dest).await.unwrap();
        assert_eq!(second.shape, "def");

        assert_eq!(client.started(), 2);
        assert_eq!(client.completed(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_errors_when_exhausted() {
        let client = MockRouteClient::new(vec![]);
        let result = client
            .fetch_route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .await;
        assert!(matches!(result, Err(RouteError::InvalidResponse(_))));
    }
}
