//! Routing backend clients
//!
//! The `RouteClient` trait is the controller's only view of the routing
//! backend; implementations cover the live Valhalla API and a canned
//! offline stand-in.

mod canned;
pub mod client;
mod error;
mod valhalla;

pub use canned::{CannedRouteClient, DEMO_SHAPE};
pub use client::RouteClient;
pub use error::RouteError;
pub use valhalla::ValhallaClient;
