//! Fixed configuration for the sandbox lifecycle manager.
//!
//! Everything that decides what a sandbox looks like (template image, exposed port,
//! startup command, isolation network, exec allow-list) is static configuration and
//! never caller input.

mod defaults;
mod preview;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use preview::*;
