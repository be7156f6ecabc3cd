use std::{future::Future, sync::Arc, time::Duration};

use futures::StreamExt;

use crate::{
    config::PreviewConfig,
    routing::RoutingRule,
    runtime::{IsolationRuntime, UnitSpec},
    PreviewboxError, PreviewboxResult,
};

use super::{CommandPolicy, SandboxInfo, SandboxNamer, SandboxRegistry};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Creates, commands and destroys sandboxes.
///
/// The manager is the only writer of the [`SandboxRegistry`]. Every registry mutation
/// is a single step taken after the runtime call it depends on has completed, so
/// concurrent requests never observe a half-applied change:
///
/// - spawn only inserts, under an id the runtime just assigned;
/// - stop removes unconditionally after its best-effort teardown, so racing stops of
///   the same id are harmless;
/// - exec never mutates the registry.
///
/// Every runtime call is bounded by the configured timeouts.
pub struct LifecycleManager {
    runtime: Arc<dyn IsolationRuntime>,
    registry: Arc<SandboxRegistry>,
    config: PreviewConfig,
    policy: CommandPolicy,
    namer: SandboxNamer,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LifecycleManager {
    /// Creates a manager that provisions sandboxes on `runtime` and records them in `registry`.
    ///
    /// Fails with [`PreviewboxError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        runtime: Arc<dyn IsolationRuntime>,
        registry: Arc<SandboxRegistry>,
        config: PreviewConfig,
    ) -> PreviewboxResult<Self> {
        config.validate()?;

        Ok(Self {
            policy: CommandPolicy::from_config(&config),
            namer: SandboxNamer::new(&config),
            runtime,
            registry,
            config,
        })
    }

    /// The registry the manager records sandboxes in.
    pub fn registry(&self) -> &Arc<SandboxRegistry> {
        &self.registry
    }

    /// The configuration sandboxes are provisioned from.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Provisions a new sandbox from the template image and registers it.
    ///
    /// The sandbox is only registered once the runtime confirms it started. If creation
    /// or start fails nothing is registered and [`PreviewboxError::Provision`] is returned;
    /// a unit that was created but failed to start is removed best-effort.
    pub async fn spawn(&self) -> PreviewboxResult<SandboxInfo> {
        let identity = self.namer.next_identity();
        let route = RoutingRule::host(
            &identity.name,
            &identity.hostname,
            *self.config.get_internal_port(),
        );

        let spec = UnitSpec::builder()
            .name(&identity.name)
            .image(self.config.get_image())
            .exposed_port(*self.config.get_internal_port())
            .labels(route.to_labels())
            .network(self.config.get_network())
            .command(self.config.get_command().clone())
            .build();

        tracing::debug!("provisioning sandbox {} at {}", identity.name, identity.hostname);

        let id = self
            .bounded("create", self.runtime.create(&spec))
            .await
            .map_err(|e| {
                tracing::error!("failed to create sandbox {}: {}", identity.name, e);
                PreviewboxError::provision(e)
            })?;

        if let Err(e) = self.bounded("start", self.runtime.start(&id)).await {
            tracing::error!("failed to start sandbox {} ({}): {}", identity.name, id, e);
            if let Err(cleanup) = self.bounded("remove", self.runtime.remove(&id)).await {
                tracing::warn!("failed to remove unstarted sandbox {}: {}", id, cleanup);
            }
            return Err(PreviewboxError::provision(e));
        }

        let info = SandboxInfo::builder()
            .id(&id)
            .name(identity.name.clone())
            .hostname(identity.hostname.clone())
            .port(identity.port)
            .created_at(identity.created_at())
            .build();

        self.registry.put(&id, info.clone()).await;

        tracing::info!(
            "spawned sandbox {} ({}) at {}",
            info.get_name(),
            id,
            info.get_hostname()
        );
        Ok(info)
    }

    /// Stops and removes a sandbox, then unregisters it.
    ///
    /// Fails with [`PreviewboxError::NotFound`] without touching the runtime if `id` is
    /// not registered. Stop and remove are best-effort: their failures are logged and
    /// swallowed, and the registry entry is removed regardless.
    pub async fn stop(&self, id: &str) -> PreviewboxResult<()> {
        if !self.registry.contains(id).await {
            return Err(PreviewboxError::NotFound(id.to_string()));
        }

        if let Err(e) = self.bounded("stop", self.runtime.stop(id)).await {
            tracing::warn!("ignoring failure to stop sandbox {}: {}", id, e);
        }

        if let Err(e) = self.bounded("remove", self.runtime.remove(id)).await {
            tracing::warn!("ignoring failure to remove sandbox {}: {}", id, e);
        }

        self.registry.remove(id).await;

        tracing::info!("stopped and removed sandbox {}", id);
        Ok(())
    }

    /// Runs an allow-listed command inside a sandbox and returns its combined output.
    ///
    /// The command line is split on whitespace; its first word must be on the allow-list.
    /// Unknown ids fail with [`PreviewboxError::NotFound`] and disallowed programs with
    /// [`PreviewboxError::CommandRejected`], both before the runtime is called. Runtime
    /// failures, including a failure mid-stream, surface as [`PreviewboxError::Exec`].
    pub async fn exec(&self, id: &str, command_line: &str) -> PreviewboxResult<String> {
        if !self.registry.contains(id).await {
            return Err(PreviewboxError::NotFound(id.to_string()));
        }

        let argv = self.policy.parse(command_line).inspect_err(|e| {
            tracing::warn!("rejected command in sandbox {}: {}", id, e);
        })?;

        tracing::debug!("executing {:?} in sandbox {}", argv, id);

        let run = async {
            let mut stream = self.runtime.exec(id, &argv).await?;
            let mut output: Vec<u8> = Vec::new();
            while let Some(chunk) = stream.next().await {
                output.extend_from_slice(&chunk?);
            }
            Ok::<_, PreviewboxError>(output)
        };

        let output = timeout("exec", self.config.exec_timeout(), run)
            .await
            .map_err(|e| {
                tracing::error!("failed to execute {:?} in sandbox {}: {}", argv, id, e);
                PreviewboxError::exec(id, e)
            })?;

        tracing::info!("executed {:?} in sandbox {}", argv, id);
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Returns a registered sandbox.
    pub async fn get(&self, id: &str) -> PreviewboxResult<SandboxInfo> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| PreviewboxError::NotFound(id.to_string()))
    }

    /// Returns all registered sandboxes, oldest first.
    pub async fn list(&self) -> Vec<SandboxInfo> {
        self.registry.list().await
    }

    /// Tears down every registered sandbox and returns how many were stopped.
    pub async fn shutdown(&self) -> usize {
        let sandboxes = self.registry.list().await;
        let results = futures::future::join_all(
            sandboxes
                .iter()
                .map(|sandbox| self.stop(sandbox.get_id())),
        )
        .await;

        let stopped = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!("tore down {} of {} sandboxes", stopped, sandboxes.len());
        stopped
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = PreviewboxResult<T>>,
    ) -> PreviewboxResult<T> {
        timeout(operation, self.config.runtime_timeout(), call).await
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

async fn timeout<T>(
    operation: &'static str,
    duration: Duration,
    call: impl Future<Output = PreviewboxResult<T>>,
) -> PreviewboxResult<T> {
    tokio::time::timeout(duration, call)
        .await
        .map_err(|_| PreviewboxError::RuntimeTimeout {
            operation,
            timeout: duration,
        })?
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
