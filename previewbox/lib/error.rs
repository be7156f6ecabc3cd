use std::{
    error::Error,
    fmt::{self, Display},
    time::Duration,
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a previewbox-related operation.
pub type PreviewboxResult<T> = Result<T, PreviewboxError>;

/// An error that occurred while provisioning, commanding or tearing down a sandbox.
#[derive(pretty_error_debug::Debug, Error)]
pub enum PreviewboxError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// A spawned task panicked or was cancelled.
    #[error("join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    /// The configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error reported by the Docker engine.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// A call into the isolation runtime did not complete in time.
    #[error("runtime {operation} timed out after {timeout:?}")]
    RuntimeTimeout {
        /// The runtime operation that timed out.
        operation: &'static str,

        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The isolation runtime failed to create or start a sandbox.
    #[error("failed to provision sandbox: {0}")]
    Provision(#[source] Box<PreviewboxError>),

    /// No sandbox with the given id is registered.
    #[error("sandbox not found: {0}")]
    NotFound(String),

    /// The program is not on the command allow-list.
    #[error("command not allowed: {0:?}")]
    CommandRejected(String),

    /// The isolation runtime failed to run a command inside a sandbox.
    #[error("failed to execute command in sandbox {id}: {source}")]
    Exec {
        /// The sandbox the command targeted.
        id: String,

        /// The underlying runtime failure.
        #[source]
        source: Box<PreviewboxError>,
    },
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PreviewboxError {
    /// Creates a new `Custom` error.
    pub fn custom(error: impl Into<anyhow::Error>) -> PreviewboxError {
        PreviewboxError::Custom(AnyError {
            error: error.into(),
        })
    }

    /// Wraps a runtime failure as a provisioning error.
    pub fn provision(error: PreviewboxError) -> PreviewboxError {
        PreviewboxError::Provision(Box::new(error))
    }

    /// Wraps a runtime failure as an exec error for sandbox `id`.
    pub fn exec(id: impl Into<String>, error: PreviewboxError) -> PreviewboxError {
        PreviewboxError::Exec {
            id: id.into(),
            source: Box::new(error),
        }
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_error_downcasts_to_original() {
        let err = PreviewboxError::custom(std::io::Error::other("daemon went away"));
        let PreviewboxError::Custom(any) = &err else {
            panic!("expected a custom error");
        };

        assert!(any.downcast::<std::io::Error>().is_some());
        assert_eq!(err.to_string(), "daemon went away");
    }

    #[test]
    fn test_wrapped_errors_keep_their_cause() {
        let err = PreviewboxError::provision(PreviewboxError::custom(anyhow::anyhow!("no image")));
        assert_eq!(err.to_string(), "failed to provision sandbox: no image");
        assert_eq!(err.source().map(|s| s.to_string()), Some("no image".into()));

        let err = PreviewboxError::exec("abc", PreviewboxError::custom(anyhow::anyhow!("gone")));
        assert_eq!(
            err.to_string(),
            "failed to execute command in sandbox abc: gone"
        );
    }
}
