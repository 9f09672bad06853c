use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{juju::run_tool, resources::Layer, Error, Result};

/// Default location of the pebble client inside the charm container
pub const PEBBLE_BINARY: &str = "/charm/bin/pebble";

/// Output of a command that ran to a zero exit code in the workload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The workload container, as seen through Pebble
#[async_trait]
pub trait Workload: Send + Sync {
    /// Add a configuration layer under `label`
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()>;

    /// Start all services marked `startup: enabled`
    async fn autostart(&self) -> Result<()>;

    async fn restart(&self, services: &[&str]) -> Result<()>;

    /// Write `content` to `path` in the container, creating parent directories
    async fn push(&self, path: &str, content: &str) -> Result<()>;

    /// Run a command in the container.
    ///
    /// A non-zero exit code of the command is reported as
    /// [`Error::ExecError`]; failing to reach the container is not.
    async fn exec(&self, command: &[String]) -> Result<ExecOutput>;
}

/// Talks to the workload's Pebble daemon through the pebble client binary
#[derive(Debug, Clone)]
pub struct PebbleCli {
    binary: PathBuf,
    socket: PathBuf,
}

impl PebbleCli {
    pub fn new(binary: impl Into<PathBuf>, socket: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            socket: socket.into(),
        }
    }

    /// Client for a named container of this unit.
    ///
    /// `PEBBLE_BINARY` overrides the client location.
    pub fn for_container(container: &str) -> Self {
        let binary = std::env::var("PEBBLE_BINARY").unwrap_or_else(|_| PEBBLE_BINARY.into());
        Self::new(
            binary,
            Path::new("/charm/containers")
                .join(container)
                .join("pebble.socket"),
        )
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.env("PEBBLE_SOCKET", &self.socket);
        command
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let tool = format!("pebble {}", args.first().copied().unwrap_or_default());
        run_tool(&tool, self.command().args(args)).await
    }

    async fn exec_with_stdin(&self, command: &[String], stdin: Option<&str>) -> Result<ExecOutput> {
        let mut child = self
            .command()
            .args(exec_args(command))
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).await?;
            // Close stdin so the remote command sees EOF
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        exec_result(
            command,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )
    }
}

/// Messages the pebble client prints when it never reached the daemon
const CLIENT_FAILURES: &[&str] = &[
    "error: cannot communicate with server",
    "error: cannot connect",
];

fn exec_args(command: &[String]) -> Vec<String> {
    ["exec".to_string(), "--".to_string()]
        .into_iter()
        .chain(command.iter().cloned())
        .collect()
}

fn add_args<'a>(label: &'a str, path: &'a str, combine: bool) -> Vec<&'a str> {
    let mut args = vec!["add", label, path];
    if combine {
        args.push("--combine");
    }
    args
}

/// Shell script run in the workload that writes its stdin to `path`
fn push_script(path: &str) -> String {
    let parent = Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".into());
    format!("mkdir -p '{parent}' && cat > '{path}'")
}

/// Map the outcome of `pebble exec` to the command's result.
///
/// Only an exit of the command itself is an [`Error::ExecError`]. A client
/// that could not reach Pebble, or was killed, is a [`Error::ToolError`].
fn exec_result(
    command: &[String],
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
) -> Result<ExecOutput> {
    let client_failed = CLIENT_FAILURES
        .iter()
        .any(|marker| stderr.trim_start().starts_with(marker));

    match exit_code {
        Some(0) => Ok(ExecOutput { stdout, stderr }),
        Some(exit_code) if !client_failed => Err(Error::ExecError {
            command: command.first().cloned().unwrap_or_default(),
            exit_code,
            stderr,
        }),
        _ => Err(Error::ToolError {
            tool: "pebble exec".into(),
            stderr: stderr.trim().into(),
        }),
    }
}

#[async_trait]
impl Workload for PebbleCli {
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()> {
        let path = std::env::temp_dir().join(format!("{label}-layer.yaml"));
        tokio::fs::write(&path, serde_yaml::to_string(layer)?).await?;

        let path = path.to_string_lossy().into_owned();
        self.run(&add_args(label, &path, combine)).await.map(|_| ())
    }

    async fn autostart(&self) -> Result<()> {
        self.run(&["autostart"]).await.map(|_| ())
    }

    async fn restart(&self, services: &[&str]) -> Result<()> {
        let args: Vec<&str> = std::iter::once("restart")
            .chain(services.iter().copied())
            .collect();
        self.run(&args).await.map(|_| ())
    }

    async fn push(&self, path: &str, content: &str) -> Result<()> {
        self.exec_with_stdin(&["sh".into(), "-c".into(), push_script(path)], Some(content))
            .await
            .map(|_| ())
    }

    async fn exec(&self, command: &[String]) -> Result<ExecOutput> {
        self.exec_with_stdin(command, None).await
    }
}
