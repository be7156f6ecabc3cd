use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A sandbox the lifecycle manager believes is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct SandboxInfo {
    /// Runtime-assigned id, the sandbox's only external handle.
    #[builder(setter(into))]
    id: String,

    /// Generated name, also used to name the sandbox's routing rule.
    #[builder(setter(into))]
    name: String,

    /// Hostname the routing proxy serves the sandbox under.
    #[builder(setter(into))]
    hostname: String,

    /// Bookkeeping port. Routing does not use it and it is not guaranteed unique.
    port: u16,

    /// When the sandbox was provisioned.
    created_at: DateTime<Utc>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SandboxInfo {
    /// Address the sandbox's application can be previewed at.
    pub fn preview_url(&self) -> String {
        format!("http://{}", self.hostname)
    }
}
