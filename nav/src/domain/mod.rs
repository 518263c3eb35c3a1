//! Domain types shared across the session controller
//!
//! Value types only: position fixes as emitted by a source, routes as
//! returned by a routing backend, and the externally visible session
//! snapshot. All of them are immutable once constructed; the controller
//! replaces, never patches.

mod fix;
mod route;
mod snapshot;

pub use fix::PositionFix;
pub use route::Route;
pub use snapshot::{ActiveRoute, SessionFault, SessionSnapshot};
