use std::{collections::BTreeMap, fmt::Display, process::Stdio};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::{resources::CharmConfig, Error, Result};

/// What Juju tells the charm about the hook being run
#[derive(Debug, Clone, PartialEq)]
pub struct HookContext {
    /// The hook or action path, e.g. `hooks/config-changed`
    pub dispatch_path: String,
    pub model_name: String,
    pub unit_name: String,
    pub relation_id: Option<String>,
    pub action_name: Option<String>,
}

impl HookContext {
    /// Read the hook context from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(Error::MissingEnvironment(key))
        };

        Ok(Self {
            dispatch_path: required("JUJU_DISPATCH_PATH")?,
            model_name: required("JUJU_MODEL_NAME")?,
            unit_name: required("JUJU_UNIT_NAME")?,
            relation_id: lookup("JUJU_RELATION_ID").filter(|v| !v.is_empty()),
            action_name: lookup("JUJU_ACTION_NAME").filter(|v| !v.is_empty()),
        })
    }

    /// The application name, i.e. the unit name without its number.
    pub fn app_name(&self) -> &str {
        self.unit_name
            .split_once('/')
            .map_or(self.unit_name.as_str(), |(app, _)| app)
    }

    pub fn event(&self) -> Event {
        Event::parse(&self.dispatch_path, self.relation_id.as_deref())
    }
}

/// A relation instance, identified the way Juju does (`object-storage:3`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRef {
    pub name: String,
    pub id: String,
}

/// The lifecycle event a hook invocation carries
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Install,
    UpgradeCharm,
    PebbleReady { container: String },
    ConfigChanged,
    UpdateStatus,
    RelationJoined(RelationRef),
    RelationChanged(RelationRef),
    RelationBroken(RelationRef),
    Action { name: String },
    Other(String),
}

impl Event {
    pub fn parse(dispatch_path: &str, relation_id: Option<&str>) -> Self {
        if let Some(name) = dispatch_path.strip_prefix("actions/") {
            return Event::Action { name: name.into() };
        }

        let Some(hook) = dispatch_path.strip_prefix("hooks/") else {
            return Event::Other(dispatch_path.into());
        };

        let relation = |name: &str| {
            relation_id.map(|id| RelationRef {
                name: name.into(),
                id: id.into(),
            })
        };

        match hook {
            "install" => Event::Install,
            "upgrade-charm" => Event::UpgradeCharm,
            "config-changed" => Event::ConfigChanged,
            "update-status" => Event::UpdateStatus,
            _ => {
                if let Some(container) = hook.strip_suffix("-pebble-ready") {
                    Event::PebbleReady {
                        container: container.into(),
                    }
                } else if let Some(r) = hook.strip_suffix("-relation-joined").and_then(relation) {
                    Event::RelationJoined(r)
                } else if let Some(r) = hook.strip_suffix("-relation-changed").and_then(relation) {
                    Event::RelationChanged(r)
                } else if let Some(r) = hook.strip_suffix("-relation-broken").and_then(relation) {
                    Event::RelationBroken(r)
                } else {
                    Event::Other(hook.into())
                }
            }
        }
    }
}

/// Workload status shown by `juju status`
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Active(String),
    Waiting(String),
    Maintenance(String),
    Blocked(String),
}

impl Status {
    fn parts(&self) -> (&'static str, &str) {
        match self {
            Status::Active(m) => ("active", m.as_str()),
            Status::Waiting(m) => ("waiting", m.as_str()),
            Status::Maintenance(m) => ("maintenance", m.as_str()),
            Status::Blocked(m) => ("blocked", m.as_str()),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (name, message) = self.parts();
        write!(f, "{name}: {message}")
    }
}

/// The hook tools Juju puts on the path while a hook runs
#[async_trait]
pub trait HookTools: Send + Sync {
    async fn config(&self) -> Result<CharmConfig>;

    /// Parameters of the running action
    async fn action_params(&self) -> Result<Value>;

    async fn action_set(&self, results: &BTreeMap<String, String>) -> Result<()>;

    async fn action_fail(&self, message: &str) -> Result<()>;

    /// Write to the application data bag of a relation
    async fn relation_set_app(
        &self,
        relation_id: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<()>;

    async fn status_set(&self, status: &Status) -> Result<()>;

    async fn is_leader(&self) -> Result<bool>;

    async fn state_get(&self, key: &str) -> Result<Option<String>>;

    async fn state_set(&self, key: &str, value: &str) -> Result<()>;
}

/// Run a command to completion, returning its stdout.
///
/// Failures carry the tool name and stderr, never the arguments: they may
/// contain secrets.
pub(crate) async fn run_tool(tool: &str, command: &mut Command) -> Result<String> {
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::ToolError {
            tool: tool.into(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().into(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Hook tools invoked as processes
#[derive(Debug, Default, Clone)]
pub struct JujuCli;

impl JujuCli {
    async fn run(&self, tool: &str, args: &[String]) -> Result<String> {
        debug!("Running hook tool {tool}");
        run_tool(tool, Command::new(tool).args(args)).await
    }

    async fn run_json<T: DeserializeOwned>(&self, tool: &str, args: &[String]) -> Result<T> {
        let mut args = args.to_vec();
        args.push("--format=json".into());
        let stdout = self.run(tool, &args).await?;

        Ok(serde_json::from_str(&stdout)?)
    }
}

fn key_values(data: &BTreeMap<String, String>) -> impl Iterator<Item = String> + '_ {
    data.iter().map(|(k, v)| format!("{k}={v}"))
}

fn relation_set_args(relation_id: &str, data: &BTreeMap<String, String>) -> Vec<String> {
    ["-r".into(), relation_id.into(), "--app".into()]
        .into_iter()
        .chain(key_values(data))
        .collect()
}

fn status_set_args(status: &Status) -> Vec<String> {
    let (name, message) = status.parts();
    vec![name.into(), message.into()]
}

fn state_set_args(key: &str, value: &str) -> Vec<String> {
    vec![format!("{key}={value}")]
}

/// Pick one key out of `state-get --format=json` output.
fn parse_state(stdout: &str, key: &str) -> Result<Option<String>> {
    if stdout.trim().is_empty() {
        return Ok(None);
    }

    let state: Option<BTreeMap<String, String>> = serde_json::from_str(stdout)?;
    Ok(state.and_then(|mut s| s.remove(key)))
}

#[async_trait]
impl HookTools for JujuCli {
    async fn config(&self) -> Result<CharmConfig> {
        self.run_json("config-get", &[]).await
    }

    async fn action_params(&self) -> Result<Value> {
        self.run_json("action-get", &[]).await
    }

    async fn action_set(&self, results: &BTreeMap<String, String>) -> Result<()> {
        let args: Vec<String> = key_values(results).collect();
        self.run("action-set", &args).await.map(|_| ())
    }

    async fn action_fail(&self, message: &str) -> Result<()> {
        self.run("action-fail", &[message.into()]).await.map(|_| ())
    }

    async fn relation_set_app(
        &self,
        relation_id: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.run("relation-set", &relation_set_args(relation_id, data))
            .await
            .map(|_| ())
    }

    async fn status_set(&self, status: &Status) -> Result<()> {
        self.run("status-set", &status_set_args(status))
            .await
            .map(|_| ())
    }

    async fn is_leader(&self) -> Result<bool> {
        self.run_json("is-leader", &[]).await
    }

    async fn state_get(&self, key: &str) -> Result<Option<String>> {
        // `state-get` fails on unknown keys, so fetch the whole map
        let stdout = self
            .run("state-get", &["--format=json".into()])
            .await?;
        parse_state(&stdout, key)
    }

    async fn state_set(&self, key: &str, value: &str) -> Result<()> {
        self.run("state-set", &state_set_args(key, value))
            .await
            .map(|_| ())
    }
}
