use serde::{Deserialize, Serialize};
use tracing::warn;

/// Highest debug level Ceph accepts for a subsystem
pub const MAX_DEBUG_RGW: i64 = 20;

/// Operator facing configuration of the charm, as returned by `config-get`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CharmConfig {
    /// Hostname advertised to clients instead of the load balancer address.
    #[serde(alias = "external_hostname")]
    pub external_hostname: Option<String>,

    /// Value of `debug rgw` in the ceph configuration, as set by the operator.
    pub debug_rgw: i64,
}

impl CharmConfig {
    /// The configured external hostname, treating an empty string as unset.
    pub fn external_hostname(&self) -> Option<&str> {
        self.external_hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    /// The `debug rgw` level to render, clamped to what Ceph accepts.
    pub fn debug_level(&self) -> u8 {
        let level = self.debug_rgw.clamp(0, MAX_DEBUG_RGW);
        if level != self.debug_rgw {
            warn!(
                "debug-rgw {} is outside 0..={MAX_DEBUG_RGW}, using {level}",
                self.debug_rgw
            );
        }
        // In 0..=20 after clamping
        level as u8
    }
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            external_hostname: None,
            debug_rgw: defaults::debug_rgw(),
        }
    }
}

pub(crate) mod defaults {
    pub fn debug_rgw() -> i64 {
        5
    }
}
