use std::{ops::Range, path::Path, time::Duration};

use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{PreviewboxError, PreviewboxResult};

use super::{
    DEFAULT_ALLOWED_COMMANDS, DEFAULT_COMMAND, DEFAULT_DOMAIN, DEFAULT_EXEC_TIMEOUT_SECS,
    DEFAULT_HOST_PREFIX, DEFAULT_IMAGE, DEFAULT_INTERNAL_PORT, DEFAULT_NAME_PREFIX,
    DEFAULT_NETWORK, DEFAULT_PORT_RANGE_END, DEFAULT_PORT_RANGE_START,
    DEFAULT_RUNTIME_TIMEOUT_SECS,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The static configuration every sandbox is provisioned from.
///
/// All fields have defaults, so an empty TOML document is a valid configuration.
///
/// ```
/// use previewbox::config::PreviewConfig;
///
/// let config: PreviewConfig = toml::from_str("image = \"vite-base\"").unwrap();
/// assert_eq!(config.get_image(), "vite-base");
/// assert_eq!(*config.get_internal_port(), 5173);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
#[serde(default)]
pub struct PreviewConfig {
    /// The template image.
    #[builder(default = DEFAULT_IMAGE.to_string(), setter(into))]
    image: String,

    /// The port the template application listens on inside the sandbox.
    #[builder(default = DEFAULT_INTERNAL_PORT)]
    internal_port: u16,

    /// The startup command.
    #[builder(default = vec![DEFAULT_COMMAND.to_string()])]
    command: Vec<String>,

    /// The network sandboxes are attached to.
    #[builder(default = DEFAULT_NETWORK.to_string(), setter(into))]
    network: String,

    /// Programs that may be run inside a sandbox.
    #[builder(default = DEFAULT_ALLOWED_COMMANDS.iter().map(|c| c.to_string()).collect())]
    allowed_commands: Vec<String>,

    /// Prefix of generated sandbox names.
    #[builder(default = DEFAULT_NAME_PREFIX.to_string(), setter(into))]
    name_prefix: String,

    /// Prefix of generated sandbox hostnames.
    #[builder(default = DEFAULT_HOST_PREFIX.to_string(), setter(into))]
    host_prefix: String,

    /// Domain generated hostnames live under.
    #[builder(default = DEFAULT_DOMAIN.to_string(), setter(into))]
    domain: String,

    /// Timeout in seconds for create, start, stop and remove calls.
    #[builder(default = DEFAULT_RUNTIME_TIMEOUT_SECS)]
    runtime_timeout_secs: u64,

    /// Timeout in seconds for a whole exec.
    #[builder(default = DEFAULT_EXEC_TIMEOUT_SECS)]
    exec_timeout_secs: u64,

    /// Whether to tear down all registered sandboxes on graceful shutdown.
    #[builder(default)]
    cleanup_on_shutdown: bool,

    /// Range the bookkeeping port is drawn from.
    #[builder(default)]
    port_range: PortRange,
}

/// A half-open port range, `start..end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortRange {
    /// First port in the range.
    pub start: u16,

    /// First port past the range.
    pub end: u16,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PreviewConfig {
    /// Reads and validates a TOML configuration file.
    pub async fn load(path: impl AsRef<Path>) -> PreviewboxResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let config: PreviewConfig = toml::from_str(&contents)?;
        config.validate()?;

        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> PreviewboxResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that the configuration can provision working sandboxes.
    pub fn validate(&self) -> PreviewboxResult<()> {
        if self.image.trim().is_empty() {
            return invalid("image must not be empty");
        }

        if self.command.is_empty() || self.command.iter().all(|c| c.trim().is_empty()) {
            return invalid("command must not be empty");
        }

        if self.network.trim().is_empty() {
            return invalid("network must not be empty");
        }

        if self.internal_port == 0 {
            return invalid("internal_port must not be 0");
        }

        if self.allowed_commands.is_empty() {
            return invalid("allowed_commands must not be empty");
        }

        if let Some(bad) = self
            .allowed_commands
            .iter()
            .find(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            return invalid(format!(
                "allowed command {bad:?} must be a single non-empty program name"
            ));
        }

        for (field, value) in [
            ("name_prefix", &self.name_prefix),
            ("host_prefix", &self.host_prefix),
        ] {
            if !is_dns_label(value) {
                return invalid(format!("{field} {value:?} is not a valid DNS label"));
            }
        }

        if self.domain.is_empty() || !self.domain.split('.').all(is_dns_label) {
            return invalid(format!("domain {:?} is not a valid DNS name", self.domain));
        }

        if self.port_range.start >= self.port_range.end {
            return invalid(format!(
                "port_range {}..{} is empty",
                self.port_range.start, self.port_range.end
            ));
        }

        if self.runtime_timeout_secs == 0 || self.exec_timeout_secs == 0 {
            return invalid("timeouts must be greater than 0");
        }

        Ok(())
    }

    /// Timeout applied to create, start, stop and remove calls.
    pub fn runtime_timeout(&self) -> Duration {
        Duration::from_secs(self.runtime_timeout_secs)
    }

    /// Timeout applied to a whole exec.
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    /// Overrides the shutdown cleanup behaviour.
    pub fn set_cleanup_on_shutdown(&mut self, cleanup: bool) {
        self.cleanup_on_shutdown = cleanup;
    }
}

impl PortRange {
    /// Returns the range as a standard library range.
    pub fn as_range(&self) -> Range<u16> {
        self.start..self.end
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_PORT_RANGE_START,
            end: DEFAULT_PORT_RANGE_END,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn invalid<T>(reason: impl Into<String>) -> PreviewboxResult<T> {
    Err(PreviewboxError::InvalidConfig(reason.into()))
}

fn is_dns_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
