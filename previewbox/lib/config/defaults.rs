use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::LazyLock,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The template image every sandbox is created from.
pub const DEFAULT_IMAGE: &str = "react-base-image";

/// The port the template application listens on inside the sandbox.
pub const DEFAULT_INTERNAL_PORT: u16 = 5173;

/// The startup command that compiles and serves the template application.
pub const DEFAULT_COMMAND: &str = "/compile_page.sh";

/// The network shared between sandboxes and the routing proxy.
pub const DEFAULT_NETWORK: &str = "traefik_traefik-net";

/// Programs that may be run inside a sandbox.
pub const DEFAULT_ALLOWED_COMMANDS: &[&str] = &["ls", "cat", "pwd", "npm", "echo"];

/// Prefix of generated sandbox names.
pub const DEFAULT_NAME_PREFIX: &str = "react-app";

/// Prefix of generated sandbox hostnames.
pub const DEFAULT_HOST_PREFIX: &str = "app";

/// Domain generated hostnames live under.
pub const DEFAULT_DOMAIN: &str = "localhost";

/// First port of the bookkeeping port range.
pub const DEFAULT_PORT_RANGE_START: u16 = 5000;

/// End (exclusive) of the bookkeeping port range.
pub const DEFAULT_PORT_RANGE_END: u16 = 6000;

/// Timeout in seconds for create, start, stop and remove calls.
pub const DEFAULT_RUNTIME_TIMEOUT_SECS: u64 = 30;

/// Timeout in seconds for a whole exec, including draining its output.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 300;

/// Default port for the HTTP server.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// The address the HTTP server listens on by default.
pub static DEFAULT_SERVER_ADDR: LazyLock<SocketAddr> = LazyLock::new(|| {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_SERVER_PORT))
});
