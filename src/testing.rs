//! In-memory stand-ins for Juju, Pebble and Kubernetes used by unit tests

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    juju::{HookTools, Status},
    kubernetes::Cluster,
    pebble::{ExecOutput, Workload},
    resources::{CharmConfig, Layer},
    Error, Result,
};

/// `radosgw-admin user info` output for a user with one S3 key
pub fn user_json(username: &str) -> String {
    json!({
        "user_id": username,
        "display_name": username,
        "email": "",
        "suspended": 0,
        "max_buckets": 1000,
        "subusers": [],
        "keys": [{
            "user": username,
            "access_key": format!("{username}-access"),
            "secret_key": format!("{username}-secret"),
        }],
        "swift_keys": [],
        "caps": [],
        "op_mask": "read, write, delete",
        "bucket_quota": { "enabled": false, "max_size": -1 },
    })
    .to_string()
}

#[derive(Default)]
pub struct FakeHookTools {
    pub config: Mutex<CharmConfig>,
    pub params: Mutex<Value>,
    pub leader: bool,
    pub state: Mutex<BTreeMap<String, String>>,
    pub results: Mutex<BTreeMap<String, String>>,
    pub failures: Mutex<Vec<String>>,
    pub relations: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    pub statuses: Mutex<Vec<Status>>,
}

impl FakeHookTools {
    pub fn leader() -> Self {
        Self {
            leader: true,
            ..Default::default()
        }
    }

    pub fn relation(&self, id: &str) -> Option<BTreeMap<String, String>> {
        self.relations.lock().unwrap().get(id).cloned()
    }

    pub fn last_status(&self) -> Option<Status> {
        self.statuses.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HookTools for FakeHookTools {
    async fn config(&self) -> Result<CharmConfig> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn action_params(&self) -> Result<Value> {
        Ok(self.params.lock().unwrap().clone())
    }

    async fn action_set(&self, results: &BTreeMap<String, String>) -> Result<()> {
        self.results.lock().unwrap().extend(results.clone());
        Ok(())
    }

    async fn action_fail(&self, message: &str) -> Result<()> {
        self.failures.lock().unwrap().push(message.into());
        Ok(())
    }

    async fn relation_set_app(
        &self,
        relation_id: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.relations
            .lock()
            .unwrap()
            .entry(relation_id.into())
            .or_default()
            .extend(data.clone());
        Ok(())
    }

    async fn status_set(&self, status: &Status) -> Result<()> {
        self.statuses.lock().unwrap().push(status.clone());
        Ok(())
    }

    async fn is_leader(&self) -> Result<bool> {
        Ok(self.leader)
    }

    async fn state_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().get(key).cloned())
    }

    async fn state_set(&self, key: &str, value: &str) -> Result<()> {
        self.state.lock().unwrap().insert(key.into(), value.into());
        Ok(())
    }
}

/// A workload whose `radosgw-admin` knows a set of users
#[derive(Default)]
pub struct FakeWorkload {
    users: Mutex<BTreeMap<String, String>>,
    execs: Mutex<Vec<Vec<String>>>,
    pub layers: Mutex<Vec<(String, Layer, bool)>>,
    pub files: Mutex<BTreeMap<String, String>>,
    pub autostarts: Mutex<usize>,
    pub restarts: Mutex<Vec<String>>,
    exec_failure: Mutex<Option<(i32, String)>>,
}

impl FakeWorkload {
    pub fn with_user(self, username: &str) -> Self {
        self.users
            .lock()
            .unwrap()
            .insert(username.into(), user_json(username));
        self
    }

    pub fn execs(&self) -> Vec<Vec<String>> {
        self.execs.lock().unwrap().clone()
    }

    /// Make every following exec exit with `exit_code`
    pub fn fail_exec(&self, exit_code: i32, stderr: &str) {
        *self.exec_failure.lock().unwrap() = Some((exit_code, stderr.into()));
    }

    pub fn clear_exec_failure(&self) {
        *self.exec_failure.lock().unwrap() = None;
    }
}

#[async_trait]
impl Workload for FakeWorkload {
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()> {
        self.layers
            .lock()
            .unwrap()
            .push((label.into(), layer.clone(), combine));
        Ok(())
    }

    async fn autostart(&self) -> Result<()> {
        *self.autostarts.lock().unwrap() += 1;
        Ok(())
    }

    async fn restart(&self, services: &[&str]) -> Result<()> {
        self.restarts
            .lock()
            .unwrap()
            .extend(services.iter().map(|s| s.to_string()));
        Ok(())
    }

    async fn push(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.into());
        Ok(())
    }

    async fn exec(&self, command: &[String]) -> Result<ExecOutput> {
        self.execs.lock().unwrap().push(command.to_vec());

        if let Some((exit_code, stderr)) = self.exec_failure.lock().unwrap().clone() {
            return Err(Error::ExecError {
                command: command.first().cloned().unwrap_or_default(),
                exit_code,
                stderr,
            });
        }

        let args: Vec<&str> = command.iter().map(String::as_str).collect();
        let uid = args
            .iter()
            .find_map(|a| a.strip_prefix("--uid="))
            .unwrap_or_default()
            .to_string();
        let mut users = self.users.lock().unwrap();

        match args.get(..3) {
            Some(["radosgw-admin", "user", "info"]) => match users.get(&uid) {
                Some(user) => Ok(ExecOutput {
                    stdout: user.clone(),
                    stderr: String::new(),
                }),
                None => Err(Error::ExecError {
                    command: "radosgw-admin".into(),
                    exit_code: 22,
                    stderr: "could not fetch user info: no user info saved".into(),
                }),
            },
            Some(["radosgw-admin", "user", "create"]) => {
                let user = user_json(&uid);
                users.insert(uid, user.clone());
                Ok(ExecOutput {
                    stdout: user,
                    stderr: String::new(),
                })
            }
            _ => Ok(ExecOutput::default()),
        }
    }
}

/// A cluster whose app Service has an optional load balancer address
#[derive(Default)]
pub struct FakeCluster {
    pub address: Option<String>,
    pub patched: Mutex<Vec<(String, String)>>,
}

impl FakeCluster {
    pub fn with_address(address: &str) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Cluster for FakeCluster {
    async fn load_balancer_address(&self, _namespace: &str, _name: &str) -> Result<Option<String>> {
        Ok(self.address.clone())
    }

    async fn patch_service(&self, namespace: &str, app: &str) -> Result<()> {
        self.patched
            .lock()
            .unwrap()
            .push((namespace.into(), app.into()));
        Ok(())
    }
}

// Tests keep an `Arc` to each fake so they can inspect it after the charm ran

#[async_trait]
impl<T: HookTools> HookTools for Arc<T> {
    async fn config(&self) -> Result<CharmConfig> {
        self.as_ref().config().await
    }

    async fn action_params(&self) -> Result<Value> {
        self.as_ref().action_params().await
    }

    async fn action_set(&self, results: &BTreeMap<String, String>) -> Result<()> {
        self.as_ref().action_set(results).await
    }

    async fn action_fail(&self, message: &str) -> Result<()> {
        self.as_ref().action_fail(message).await
    }

    async fn relation_set_app(
        &self,
        relation_id: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.as_ref().relation_set_app(relation_id, data).await
    }

    async fn status_set(&self, status: &Status) -> Result<()> {
        self.as_ref().status_set(status).await
    }

    async fn is_leader(&self) -> Result<bool> {
        self.as_ref().is_leader().await
    }

    async fn state_get(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().state_get(key).await
    }

    async fn state_set(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().state_set(key, value).await
    }
}

#[async_trait]
impl<T: Workload> Workload for Arc<T> {
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()> {
        self.as_ref().add_layer(label, layer, combine).await
    }

    async fn autostart(&self) -> Result<()> {
        self.as_ref().autostart().await
    }

    async fn restart(&self, services: &[&str]) -> Result<()> {
        self.as_ref().restart(services).await
    }

    async fn push(&self, path: &str, content: &str) -> Result<()> {
        self.as_ref().push(path, content).await
    }

    async fn exec(&self, command: &[String]) -> Result<ExecOutput> {
        self.as_ref().exec(command).await
    }
}

#[async_trait]
impl<T: Cluster> Cluster for Arc<T> {
    async fn load_balancer_address(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        self.as_ref().load_balancer_address(namespace, name).await
    }

    async fn patch_service(&self, namespace: &str, app: &str) -> Result<()> {
        self.as_ref().patch_service(namespace, app).await
    }
}
