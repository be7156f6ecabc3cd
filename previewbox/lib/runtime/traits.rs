use std::collections::HashMap;

use bytes::Bytes;
use futures::stream::BoxStream;
use getset::Getters;
use typed_builder::TypedBuilder;

use crate::PreviewboxResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Combined stdout and stderr of a command, in the order the runtime produced it.
pub type OutputStream = BoxStream<'static, PreviewboxResult<Bytes>>;

/// Everything the runtime needs to create an isolated unit.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct UnitSpec {
    /// Name given to the unit.
    #[builder(setter(into))]
    name: String,

    /// Image the unit is created from.
    #[builder(setter(into))]
    image: String,

    /// Port the unit exposes to the isolation network.
    exposed_port: u16,

    /// Labels attached to the unit, read by the routing proxy.
    #[builder(default)]
    labels: HashMap<String, String>,

    /// Network the unit is attached to.
    #[builder(setter(into))]
    network: String,

    /// Startup command.
    command: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Creates, controls and commands isolated execution units.
///
/// Unit ids are assigned by the runtime and are unique for as long as the unit exists.
#[async_trait::async_trait]
pub trait IsolationRuntime: Send + Sync {
    /// Creates a unit and returns its runtime-assigned id. The unit is not started.
    async fn create(&self, spec: &UnitSpec) -> PreviewboxResult<String>;

    /// Starts a created unit.
    async fn start(&self, unit_id: &str) -> PreviewboxResult<()>;

    /// Stops a running unit.
    async fn stop(&self, unit_id: &str) -> PreviewboxResult<()>;

    /// Removes a unit.
    async fn remove(&self, unit_id: &str) -> PreviewboxResult<()>;

    /// Runs `argv` inside a unit and streams its combined stdout and stderr.
    async fn exec(&self, unit_id: &str, argv: &[String]) -> PreviewboxResult<OutputStream>;
}
