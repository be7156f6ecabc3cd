//! REST surface of the sandbox lifecycle manager.
//!
//! Maps `spawn`, `stop` and `exec` requests onto the [`LifecycleManager`](crate::sandbox::LifecycleManager)
//! and translates its errors into coarse HTTP responses. Internal failure details are
//! logged, never returned.

mod api;
mod data;
mod handlers;
mod routes;
mod state;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use api::*;
pub use data::*;
pub use routes::*;
pub use state::*;
