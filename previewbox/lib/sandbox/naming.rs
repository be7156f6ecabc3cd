use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::{PortRange, PreviewConfig};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Generates names, hostnames and bookkeeping ports for new sandboxes.
///
/// Names and hostnames embed a millisecond timestamp. Stamps are handed out strictly
/// increasing, so two spawns within the same millisecond still get distinct routes.
#[derive(Debug)]
pub struct SandboxNamer {
    last_stamp: AtomicU64,
    name_prefix: String,
    host_prefix: String,
    domain: String,
    port_range: PortRange,
}

/// The generated identity of a sandbox about to be provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxIdentity {
    /// Millisecond timestamp the identity was derived from.
    pub stamp: u64,

    /// Sandbox name, `<name_prefix>-<stamp>`.
    pub name: String,

    /// Sandbox hostname, `<host_prefix>-<stamp>.<domain>`.
    pub hostname: String,

    /// Bookkeeping port.
    pub port: u16,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SandboxNamer {
    /// Creates a namer from the configured prefixes, domain and port range.
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            last_stamp: AtomicU64::new(0),
            name_prefix: config.get_name_prefix().clone(),
            host_prefix: config.get_host_prefix().clone(),
            domain: config.get_domain().clone(),
            port_range: *config.get_port_range(),
        }
    }

    /// Generates the identity of the next sandbox.
    pub fn next_identity(&self) -> SandboxIdentity {
        let stamp = self.next_stamp();
        SandboxIdentity {
            stamp,
            name: format!("{}-{stamp}", self.name_prefix),
            hostname: format!("{}-{stamp}.{}", self.host_prefix, self.domain),
            port: rand::rng().random_range(self.port_range.as_range()),
        }
    }

    fn next_stamp(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

impl SandboxIdentity {
    /// The identity's stamp as a point in time.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.stamp as i64).unwrap_or_else(Utc::now)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
