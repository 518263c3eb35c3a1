//! Simulated position source
//!
//! A constant-speed walk from a start coordinate toward a target, with
//! optional random jitter on each emitted fix. Stands in for a live GPS
//! provider in demo runs and tests; once the walk reaches the target it
//! keeps reporting fixes there, the way a real receiver would.

use pathcodec::Coordinate;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;

use super::PositionSource;
use crate::config::SimulationConfig;
use crate::domain::PositionFix;

/// Meters per degree of latitude (and of longitude at the equator)
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Position source that walks a straight line toward a target
pub struct SimulatedPositionSource {
    start: Coordinate,
    target: Coordinate,
    config: SimulationConfig,
}

impl SimulatedPositionSource {
    pub fn new(start: Coordinate, target: Coordinate, config: SimulationConfig) -> Self {
        Self { start, target, config }
    }
}

impl PositionSource for SimulatedPositionSource {
    fn subscribe(&self) -> mpsc::Receiver<PositionFix> {
        let (tx, rx) = mpsc::channel(16);
        let start = self.start;
        let target = self.target;
        let config = self.config.clone();

        tokio::spawn(async move {
            run_walk(start, target, config, tx).await;
        });

        rx
    }
}

/// Emit fixes along the walk until the subscriber goes away
async fn run_walk(start: Coordinate, target: Coordinate, config: SimulationConfig, tx: mpsc::Sender<PositionFix>) {
    let step_m = config.speed_mps * config.interval().as_secs_f64();
    let mut current = start;
    let mut seq: u64 = 0;
    let mut ticker = tokio::time::interval(config.interval());

    loop {
        ticker.tick().await;

        let reported = jittered(current, config.jitter_m);
        let fix = PositionFix::new(reported, Some(config.accuracy_m), seq);

        if tx.send(fix).await.is_err() {
            debug!(seq, "simulated walk: subscriber dropped, stopping");
            return;
        }

        seq += 1;
        current = advance(current, target, step_m);
    }
}

/// Move `step_m` meters from `from` toward `to`, clamping at `to`
fn advance(from: Coordinate, to: Coordinate, step_m: f64) -> Coordinate {
    let remaining = from.distance_m(&to);
    if remaining <= step_m || remaining == 0.0 {
        return to;
    }

    let fraction = step_m / remaining;
    Coordinate::new(
        from.lat + (to.lat - from.lat) * fraction,
        from.lon + (to.lon - from.lon) * fraction,
    )
}

/// Apply up to `jitter_m` meters of uniform noise in each axis
fn jittered(point: Coordinate, jitter_m: f64) -> Coordinate {
    if jitter_m <= 0.0 {
        return point;
    }

    let mut rng = rand::rng();
    let north_m = rng.random_range(-jitter_m..=jitter_m);
    let east_m = rng.random_range(-jitter_m..=jitter_m);

    offset_m(point, north_m, east_m)
}

/// Offset a coordinate by meters north and east
fn offset_m(point: Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let dlat = north_m / METERS_PER_DEGREE;
    let dlon = east_m / (METERS_PER_DEGREE * point.lat.to_radians().cos().max(1e-6));
    Coordinate::new(point.lat + dlat, point.lon + dlon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SimulationConfig {
        SimulationConfig {
            interval_ms: 1,
            speed_mps: 10_000.0,
            jitter_m: 0.0,
            accuracy_m: 5.0,
        }
    }

    #[test]
    fn test_advance_moves_toward_target() {
        let from = Coordinate::new(48.0, 2.0);
        let to = Coordinate::new(48.01, 2.0);

        let next = advance(from, to, 100.0);
        let moved = from.distance_m(&next);
        assert!((moved - 100.0).abs() < 1.0, "moved {}", moved);
        assert!(next.distance_m(&to) < from.distance_m(&to));
    }

    #[test]
    fn test_advance_clamps_at_target() {
        let from = Coordinate::new(48.0, 2.0);
        let to = Coordinate::new(48.0001, 2.0);
        assert_eq!(advance(from, to, 1_000.0), to);
        assert_eq!(advance(to, to, 1_000.0), to);
    }

    #[test]
    fn test_offset_meters() {
        let origin = Coordinate::new(0.0, 0.0);
        let moved = offset_m(origin, 111.32, 0.0);
        assert!((moved.lat - 0.001).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_subscription_emits_ordered_fixes() {
        let source = SimulatedPositionSource::new(
            Coordinate::new(48.0, 2.0),
            Coordinate::new(48.1, 2.0),
            fast_config(),
        );

        let mut rx = source.subscribe();
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();

        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
        assert_eq!(third.seq, 2);

        // No jitter: each fix is strictly closer to the target
        let target = Coordinate::new(48.1, 2.0);
        assert!(second.coordinate.distance_m(&target) < first.coordinate.distance_m(&target));
    }

    #[tokio::test]
    async fn test_resubscribe_restarts_from_start() {
        let source = SimulatedPositionSource::new(
            Coordinate::new(48.0, 2.0),
            Coordinate::new(48.1, 2.0),
            fast_config(),
        );

        let mut first_sub = source.subscribe();
        let a = first_sub.recv().await.unwrap();
        drop(first_sub);

        let mut second_sub = source.subscribe();
        let b = second_sub.recv().await.unwrap();

        // A fresh subscription begins at the start again, not mid-walk
        assert_eq!(a.coordinate, b.coordinate);
        assert_eq!(b.seq, 0);
    }
}
