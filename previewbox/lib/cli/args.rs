use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::config::DEFAULT_SERVER_ADDR;

use super::styles;

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// `previewbox` provisions short-lived application preview sandboxes
#[derive(Debug, Parser)]
#[command(name = "previewbox", author, version, styles=styles::styles())]
pub struct PreviewboxArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<PreviewboxSubcommand>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Debug, Parser)]
pub enum PreviewboxSubcommand {
    /// Run the sandbox API server
    #[command(name = "serve")]
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value_t = *DEFAULT_SERVER_ADDR)]
        addr: SocketAddr,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop and remove all registered sandboxes when the server shuts down
        #[arg(long)]
        cleanup_on_shutdown: bool,

        /// Provision sandboxes on an in-memory runtime instead of Docker
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration as TOML
    #[command(name = "config")]
    Config {
        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = PreviewboxArgs::parse_from(["previewbox", "serve"]);
        let Some(PreviewboxSubcommand::Serve {
            addr,
            config,
            cleanup_on_shutdown,
            dry_run,
        }) = args.subcommand
        else {
            panic!("expected serve");
        };

        assert_eq!(addr, "0.0.0.0:3000".parse().unwrap());
        assert!(config.is_none());
        assert!(!cleanup_on_shutdown);
        assert!(!dry_run);
        assert!(!args.verbose);
    }

    #[test]
    fn test_serve_overrides() {
        let args = PreviewboxArgs::parse_from([
            "previewbox",
            "serve",
            "--addr",
            "127.0.0.1:8080",
            "--config",
            "previewbox.toml",
            "--cleanup-on-shutdown",
            "--dry-run",
            "-v",
        ]);
        let Some(PreviewboxSubcommand::Serve {
            addr,
            config,
            cleanup_on_shutdown,
            dry_run,
        }) = args.subcommand
        else {
            panic!("expected serve");
        };

        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config, Some(PathBuf::from("previewbox.toml")));
        assert!(cleanup_on_shutdown);
        assert!(dry_run);
        assert!(args.verbose);
    }
}
