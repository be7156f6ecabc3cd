//! Routing metadata for the reverse proxy.
//!
//! previewbox never talks to the proxy. It attaches Traefik-style labels to every
//! sandbox at creation time and the proxy discovers the route from them.

use std::collections::HashMap;

use getset::Getters;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Label that opts a unit into routing.
pub const ENABLE_LABEL: &str = "traefik.enable";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A hostname route to a sandbox: `Host(<hostname>)` forwarded to `target_port`.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct RoutingRule {
    /// Whether routing is enabled for the unit.
    enable: bool,

    /// Name of the router and service the labels declare.
    router: String,

    /// The host-match rule.
    rule: String,

    /// Port inside the unit traffic is forwarded to.
    target_port: u16,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RoutingRule {
    /// Builds an enabled rule that routes `hostname` to `target_port` of the unit `router`.
    pub fn host(router: impl Into<String>, hostname: &str, target_port: u16) -> Self {
        Self {
            enable: true,
            router: router.into(),
            rule: format!("Host(`{hostname}`)"),
            target_port,
        }
    }

    /// Renders the rule as container labels.
    pub fn to_labels(&self) -> HashMap<String, String> {
        HashMap::from([
            (ENABLE_LABEL.to_string(), self.enable.to_string()),
            (
                format!("traefik.http.routers.{}.rule", self.router),
                self.rule.clone(),
            ),
            (
                format!(
                    "traefik.http.services.{}.loadbalancer.server.port",
                    self.router
                ),
                self.target_port.to_string(),
            ),
        ])
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_rule_labels() {
        let rule = RoutingRule::host("react-app-1700000000000", "app-1700000000000.localhost", 5173);
        let labels = rule.to_labels();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[ENABLE_LABEL], "true");
        assert_eq!(
            labels["traefik.http.routers.react-app-1700000000000.rule"],
            "Host(`app-1700000000000.localhost`)"
        );
        assert_eq!(
            labels["traefik.http.services.react-app-1700000000000.loadbalancer.server.port"],
            "5173"
        );
    }
}
