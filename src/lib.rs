use thiserror::Error;

/// Typed data exchanged with Juju, Pebble and the relation bus
pub mod resources;

/// Event dispatch for a single hook invocation
pub mod operator;

/// Juju hook environment and hook tools
pub mod juju;

/// Pebble access to the workload container
pub mod pebble;

/// Kubernetes API access
pub mod kubernetes;

/// radosgw-admin invocation and output handling
pub mod radosgw_admin;

/// Log and trace integrations
pub mod telemetry;

// Internal only
mod handlers;

#[cfg(test)]
pub(crate) mod testing;

/// Name of the workload container and of the Pebble service running in it
pub const CONTAINER_NAME: &str = "radosgw";

/// Port the RADOS Gateway listens on
pub const RADOSGW_PORT: u16 = 7480;

/// Endpoint name of the object storage relation
pub const OBJECT_STORAGE_RELATION: &str = "object-storage";

#[derive(Error, Debug)]
pub enum Error {
    #[error("SerializationError: {0}")]
    SerializationError(#[source] serde_json::Error),

    #[error("YamlError: {0}")]
    YamlError(#[source] serde_yaml::Error),

    #[error("Kube Error: {0}")]
    KubeError(#[source] kube::Error),

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    /// A command run in the workload container exited with a non-zero code
    #[error("Exec Error: {command} exited with code {exit_code}")]
    ExecError {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// A Juju hook tool or the pebble client failed
    #[error("{tool} failed: {stderr}")]
    ToolError { tool: String, stderr: String },

    #[error("missing environment variable {0}")]
    MissingEnvironment(&'static str),

    #[error("IllegalUser: {0}")]
    IllegalUser(String),

    #[error("IllegalParams: {0}")]
    IllegalParams(String),
}
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::YamlError(e)
    }
}

impl From<kube::Error> for Error {
    fn from(e: kube::Error) -> Self {
        Error::KubeError(e)
    }
}
