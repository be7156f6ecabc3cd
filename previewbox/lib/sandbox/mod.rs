//! Sandbox lifecycle management.
//!
//! A sandbox moves through `Requested -> Running -> Stopping -> Removed`. Only `Running`
//! is observable: the registry entry is created once the runtime confirms the unit
//! started, and deleted when it is stopped.

mod manager;
mod models;
mod naming;
mod policy;
mod registry;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use manager::*;
pub use models::*;
pub use naming::*;
pub use policy::*;
pub use registry::*;
