//! Isolation runtime client.
//!
//! The lifecycle manager only talks to the container engine through the narrow
//! [`IsolationRuntime`] contract: create, start, stop, remove and exec.

mod docker;
mod mock;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use docker::*;
pub use mock::*;
pub use traits::*;
