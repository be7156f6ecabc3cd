use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use previewbox::{
    cli::{PreviewboxArgs, PreviewboxSubcommand},
    config::PreviewConfig,
    runtime::{DockerRuntime, IsolationRuntime, MockRuntime},
    sandbox::{LifecycleManager, SandboxRegistry},
    server::PreviewServer,
    PreviewboxResult,
};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> PreviewboxResult<()> {
    dotenvy::dotenv().ok();

    let args = PreviewboxArgs::parse();

    let default_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    fmt()
        .with_target(false)
        .with_env_filter(log_filter(default_level, directives.as_deref()))
        .init();

    match args.subcommand {
        Some(PreviewboxSubcommand::Serve {
            addr,
            config,
            cleanup_on_shutdown,
            dry_run,
        }) => {
            tracing::trace!("serving: addr={addr}, config={config:?}");
            let mut config = load_config(config).await?;
            if cleanup_on_shutdown {
                config.set_cleanup_on_shutdown(true);
            }

            let runtime: Arc<dyn IsolationRuntime> = if dry_run {
                tracing::warn!("dry run: sandboxes are simulated in memory");
                Arc::new(MockRuntime::new())
            } else {
                Arc::new(DockerRuntime::connect().await?)
            };

            let manager = Arc::new(LifecycleManager::new(
                runtime,
                Arc::new(SandboxRegistry::new()),
                config,
            )?);

            PreviewServer::new(addr, manager).serve().await?;
        }
        Some(PreviewboxSubcommand::Config { config }) => {
            print!("{}", load_config(config).await?.to_toml()?);
        }
        None => {
            PreviewboxArgs::command().print_help()?;
        }
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// Uses `RUST_LOG` directives when given, falling back to `default_level`.
fn log_filter(default_level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives.unwrap_or_default())
}

async fn load_config(path: Option<PathBuf>) -> PreviewboxResult<PreviewConfig> {
    match path {
        Some(path) => PreviewConfig::load(path).await,
        None => Ok(PreviewConfig::default()),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
