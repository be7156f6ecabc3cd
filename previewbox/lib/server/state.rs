use std::sync::Arc;

use crate::sandbox::LifecycleManager;

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// Shared server state, cloned into every request handler.
#[derive(Clone)]
pub struct ServerState {
    manager: Arc<LifecycleManager>,
}

//-------------------------------------------------------------------------------------------------
// Methods
//-------------------------------------------------------------------------------------------------

impl ServerState {
    /// Creates the state around a lifecycle manager.
    pub fn new(manager: Arc<LifecycleManager>) -> Self {
        Self { manager }
    }

    /// Gets the lifecycle manager.
    pub fn manager(&self) -> &Arc<LifecycleManager> {
        &self.manager
    }
}
