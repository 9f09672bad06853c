use std::collections::BTreeMap;

use indoc::formatdoc;
use serde::{Deserialize, Serialize};

use crate::CONTAINER_NAME;

/// Path of the ceph configuration inside the workload container
pub const CEPH_CONF_PATH: &str = "/etc/ceph/ceph.conf";

/// A Pebble configuration layer
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Layer {
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub services: BTreeMap<String, LayerService>,
}

/// A single service entry of a Pebble layer
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LayerService {
    /// How this entry combines with the same service in earlier layers
    #[serde(rename = "override")]
    pub override_: Override,
    pub summary: String,
    pub command: String,
    pub startup: Startup,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    Merge,
    Replace,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    Disabled,
}

impl Layer {
    /// The layer running the gateway in the foreground.
    pub fn radosgw() -> Self {
        Self {
            summary: "radosgw layer".into(),
            description: "pebble config layer for radosgw".into(),
            services: BTreeMap::from([(
                CONTAINER_NAME.into(),
                LayerService {
                    override_: Override::Replace,
                    summary: "radosgw".into(),
                    command: "/usr/bin/radosgw --no-mon-config -d --cluster ceph".into(),
                    startup: Startup::Enabled,
                },
            )]),
        }
    }
}

/// Render the ceph client configuration for a standalone dbstore gateway.
pub fn ceph_conf(debug_rgw: u8) -> String {
    formatdoc! {"
        [client]

        rgw backend store = dbstore
        rgw config store = dbstore
        debug rgw = {debug_rgw}
    "}
}
