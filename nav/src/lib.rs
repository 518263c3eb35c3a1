//! NavSession - Live Navigation Session Controller
//!
//! Takes a stream of position fixes and a fixed destination, decides when
//! a new route must be fetched from a routing backend, decodes the
//! backend's compact path encoding, keeps the maneuver instruction list in
//! sync with the active route, and detects completion. The whole session
//! state is published as a single snapshot through a watch cell.
//!
//! # Core Concepts
//!
//! - **Replace, never patch**: a route is superseded wholesale; consumers
//!   never see an old path paired with new instructions
//! - **Known-good anchor**: reroute drift is measured from the fix that
//!   produced the displayed route, updated only on fetch success
//! - **Stale-while-revalidate**: a failed refresh keeps the displayed
//!   route; a transient network error never interrupts navigation
//! - **At most one fetch in flight**: a newer qualifying fix cancels the
//!   outstanding fetch outright
//!
//! # Modules
//!
//! - [`session`] - the controller actor and its handle
//! - [`routing`] - `RouteClient` trait, Valhalla and canned implementations
//! - [`position`] - `PositionSource` trait and the simulated walk source
//! - [`policy`] - pure reroute/arrival decision functions
//! - [`domain`] - fixes, routes, snapshots
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod policy;
pub mod position;
pub mod routing;
pub mod session;

// Re-export commonly used types
pub use config::{CompletionMode, Config, RoutingConfig, SessionConfig, SimulationConfig};
pub use domain::{ActiveRoute, PositionFix, Route, SessionFault, SessionSnapshot};
pub use pathcodec::Coordinate;
pub use position::{PositionSource, SimulatedPositionSource};
pub use routing::{CannedRouteClient, RouteClient, RouteError, ValhallaClient};
pub use session::{NavigationSession, SessionHandle};
