//! `previewbox` provisions short-lived, isolated application preview sandboxes.
//!
//! # Overview
//!
//! A caller asks for a sandbox, previewbox launches a container running a template
//! application, labels it so the reverse proxy routes a generated hostname to it, and
//! later tears it down on request. In between, callers may run allow-listed commands
//! inside the sandbox and read back their combined output.
//!
//! # Architecture
//!
//! - **Runtime**: the [`IsolationRuntime`](runtime::IsolationRuntime) contract over the
//!   container engine, implemented for Docker by [`DockerRuntime`](runtime::DockerRuntime)
//! - **Routing**: the Traefik labels that bind a hostname to a sandbox
//! - **Sandbox**: the registry of live sandboxes and the
//!   [`LifecycleManager`](sandbox::LifecycleManager) that spawns, commands and stops them
//! - **Server**: the REST API in front of the lifecycle manager
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use previewbox::{
//!     config::PreviewConfig,
//!     runtime::DockerRuntime,
//!     sandbox::{LifecycleManager, SandboxRegistry},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Arc::new(DockerRuntime::connect().await?);
//!     let manager = LifecycleManager::new(
//!         runtime,
//!         Arc::new(SandboxRegistry::new()),
//!         PreviewConfig::default(),
//!     )?;
//!
//!     let sandbox = manager.spawn().await?;
//!     println!("{}", manager.exec(sandbox.get_id(), "ls -la").await?);
//!     manager.stop(sandbox.get_id()).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod routing;
pub mod runtime;
pub mod sandbox;
pub mod server;

pub use error::*;
