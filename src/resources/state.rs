use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key under which the charm state is kept in Juju's unit state store
pub const STATE_KEY: &str = "radosgw-charm";

/// State that survives between hook invocations
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct StoredState {
    /// Last access url advertised in the unit status
    pub url: Option<String>,

    /// Set once the radosgw layer has been applied to the workload container
    pub ready: bool,

    /// The ceph configuration last pushed to the workload container
    pub ceph_conf: Option<String>,

    /// Relation ids whose events arrived before the charm was ready
    pub deferred: BTreeSet<String>,

    /// When the charm last handled a hook
    pub last_event: Option<DateTime<Utc>>,
}

impl StoredState {
    /// Record a relation event to be handled once the charm is ready.
    pub fn defer(&mut self, relation_id: &str) {
        self.deferred.insert(relation_id.to_string());
    }

    /// Take all deferred relation ids, leaving none behind.
    pub fn take_deferred(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.deferred)
    }
}
