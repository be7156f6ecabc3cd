//! Docker-backed isolation runtime using bollard.

use std::collections::HashMap;

use bollard::{
    container::{
        Config, CreateContainerOptions, LogOutput, NetworkingConfig, RemoveContainerOptions,
        StartContainerOptions, StopContainerOptions,
    },
    exec::{CreateExecOptions, StartExecResults},
    models::{EndpointSettings, HostConfig},
    Docker,
};
use futures::{future, StreamExt};

use crate::PreviewboxResult;

use super::{IsolationRuntime, OutputStream, UnitSpec};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An isolation runtime backed by a Docker engine.
///
/// Sandboxes are plain containers attached to the routing proxy's network.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DockerRuntime {
    /// Connects to the local Docker engine and checks that it answers.
    ///
    /// Honours `DOCKER_HOST`, falling back to `/var/run/docker.sock`.
    pub async fn connect() -> PreviewboxResult<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;

        tracing::info!("connected to docker engine");
        Ok(Self { docker })
    }

    /// Wraps an already configured bollard client.
    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait::async_trait]
impl IsolationRuntime for DockerRuntime {
    async fn create(&self, spec: &UnitSpec) -> PreviewboxResult<String> {
        let network = spec.get_network().clone();

        let config = Config {
            image: Some(spec.get_image().clone()),
            exposed_ports: Some(HashMap::from([(
                format!("{}/tcp", spec.get_exposed_port()),
                HashMap::new(),
            )])),
            labels: Some(spec.get_labels().clone()),
            cmd: Some(spec.get_command().clone()),
            host_config: Some(HostConfig {
                network_mode: Some(network.clone()),
                ..Default::default()
            }),
            networking_config: Some(NetworkingConfig {
                endpoints_config: HashMap::from([(network, EndpointSettings::default())]),
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.get_name().clone(),
            platform: None,
        };

        let response = self.docker.create_container(Some(options), config).await?;
        for warning in &response.warnings {
            tracing::warn!("docker create {}: {}", spec.get_name(), warning);
        }

        tracing::debug!("created container {} ({})", spec.get_name(), response.id);
        Ok(response.id)
    }

    async fn start(&self, unit_id: &str) -> PreviewboxResult<()> {
        self.docker
            .start_container(unit_id, None::<StartContainerOptions<String>>)
            .await?;

        tracing::debug!("started container {}", unit_id);
        Ok(())
    }

    async fn stop(&self, unit_id: &str) -> PreviewboxResult<()> {
        self.docker
            .stop_container(unit_id, None::<StopContainerOptions>)
            .await?;

        tracing::debug!("stopped container {}", unit_id);
        Ok(())
    }

    async fn remove(&self, unit_id: &str) -> PreviewboxResult<()> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };

        self.docker.remove_container(unit_id, Some(options)).await?;

        tracing::debug!("removed container {}", unit_id);
        Ok(())
    }

    async fn exec(&self, unit_id: &str, argv: &[String]) -> PreviewboxResult<OutputStream> {
        let exec = self
            .docker
            .create_exec(
                unit_id,
                CreateExecOptions {
                    cmd: Some(argv.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        match self.docker.start_exec(&exec.id, None).await? {
            StartExecResults::Attached { output, .. } => Ok(output
                .filter_map(|chunk| {
                    future::ready(match chunk {
                        Ok(LogOutput::StdOut { message })
                        | Ok(LogOutput::StdErr { message })
                        | Ok(LogOutput::Console { message }) => Some(Ok(message)),
                        Ok(LogOutput::StdIn { .. }) => None,
                        Err(e) => Some(Err(e.into())),
                    })
                })
                .boxed()),
            StartExecResults::Detached => {
                tracing::warn!("exec {} in {} started detached", exec.id, unit_id);
                Ok(futures::stream::empty().boxed())
            }
        }
    }
}
