use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::{
    pebble::Workload,
    resources::Credentials,
    Error, Result, RADOSGW_PORT,
};

/// The user the charm hands out over the object storage relation
pub const OBJECT_STORE_USER: &str = "object-store";

/// Runs `radosgw-admin` inside the workload container
pub struct RadosgwAdmin<'a> {
    workload: &'a dyn Workload,
}

/// The fields of a `radosgw-admin user info` document the charm relies on
#[derive(Deserialize, Debug)]
struct UserInfo {
    #[serde(default)]
    keys: Vec<UserKey>,
}

#[derive(Deserialize, Debug)]
struct UserKey {
    access_key: String,
    secret_key: String,
}

impl<'a> RadosgwAdmin<'a> {
    pub fn new(workload: &'a dyn Workload) -> Self {
        Self { workload }
    }

    /// Run a command in the workload container and return its stdout.
    ///
    /// The command itself is never logged since it may carry secrets. When
    /// `exception_on_error` is false a failing command yields `None`.
    pub async fn run_cmd(&self, cmd: &[String], exception_on_error: bool) -> Result<Option<String>> {
        match self.workload.exec(cmd).await {
            Ok(output) => {
                debug!("Command complete");
                for line in output.stdout.lines() {
                    debug!("    {line}");
                }
                Ok(Some(output.stdout))
            }
            Err(Error::ExecError {
                command,
                exit_code,
                stderr,
            }) => {
                error!("Exited with code {exit_code}. Stderr:");
                for line in stderr.lines() {
                    error!("    {line}");
                }

                if exception_on_error {
                    Err(Error::ExecError {
                        command,
                        exit_code,
                        stderr,
                    })
                } else {
                    Ok(None)
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn run_checked(&self, cmd: Vec<String>) -> Result<String> {
        // With exception_on_error set a failure is always an Err
        Ok(self.run_cmd(&cmd, true).await?.unwrap_or_default())
    }

    pub async fn get_user(&self, username: &str) -> Result<String> {
        self.run_checked(user_info_command(username)).await
    }

    pub async fn create_user(&self, username: &str) -> Result<String> {
        info!(r#"Creating radosgw user "{username}""#);
        self.run_checked(user_create_command(username)).await
    }

    /// Look up a user, creating it when the lookup fails.
    pub async fn get_or_create_user(&self, username: &str) -> Result<String> {
        match self.get_user(username).await {
            Err(Error::ExecError { .. }) => self.create_user(username).await,
            other => other,
        }
    }
}

pub fn user_info_command(username: &str) -> Vec<String> {
    vec![
        "radosgw-admin".into(),
        "user".into(),
        "info".into(),
        format!("--uid={username}"),
    ]
}

pub fn user_create_command(username: &str) -> Vec<String> {
    vec![
        "radosgw-admin".into(),
        "user".into(),
        "create".into(),
        format!("--uid={username}"),
        format!("--display-name={username}"),
    ]
}

/// Recursively replace underscores with hyphens in object keys.
pub fn hyphenate(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.replace('_', "-"), hyphenate(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(hyphenate).collect()),
        other => other,
    }
}

/// Build relation credentials from `radosgw-admin user info` output.
pub fn credentials_from_user(user: &str, namespace: &str, service: &str) -> Result<Credentials> {
    let info: UserInfo = serde_json::from_str(user)?;
    let key = info
        .keys
        .into_iter()
        .next()
        .ok_or_else(|| Error::IllegalUser("user has no S3 keys".into()))?;

    Ok(Credentials {
        access_key: key.access_key,
        namespace: namespace.into(),
        port: RADOSGW_PORT,
        secret_key: key.secret_key,
        secure: false,
        service: service.into(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{user_json, FakeWorkload};

    #[test]
    fn uid_is_not_quoted() {
        assert_eq!(
            user_create_command("alice"),
            ["radosgw-admin", "user", "create", "--uid=alice", "--display-name=alice"]
        );
    }

    #[test]
    fn hyphenates_nested_keys() {
        let user = hyphenate(json!({
            "user_id": "alice",
            "keys": [{ "access_key": "AK", "secret_key": "SK" }],
            "bucket_quota": { "max_size_kb": 0 },
        }));

        assert_eq!(
            user,
            json!({
                "user-id": "alice",
                "keys": [{ "access-key": "AK", "secret-key": "SK" }],
                "bucket-quota": { "max-size-kb": 0 },
            })
        );
    }

    #[test]
    fn credentials_from_first_key() {
        let creds = credentials_from_user(&user_json("object-store"), "ceph", "radosgw").unwrap();

        assert_eq!(creds.access_key, "object-store-access");
        assert_eq!(creds.secret_key, "object-store-secret");
        assert_eq!(creds.namespace, "ceph");
        assert_eq!(creds.service, "radosgw");
        assert_eq!(creds.port, 7480);
        assert!(!creds.secure);
    }

    #[test]
    fn user_without_keys_is_illegal() {
        let err = credentials_from_user(r#"{"user_id": "x", "keys": []}"#, "ceph", "radosgw")
            .unwrap_err();

        assert!(matches!(err, Error::IllegalUser(_)));
    }

    #[tokio::test]
    async fn existing_user_is_not_recreated() {
        let workload = FakeWorkload::default().with_user("alice");
        let admin = RadosgwAdmin::new(&workload);

        let user = admin.get_or_create_user("alice").await.unwrap();

        assert!(user.contains("alice-access"));
        assert_eq!(workload.execs().len(), 1);
    }

    #[tokio::test]
    async fn missing_user_is_created() {
        let workload = FakeWorkload::default();
        let admin = RadosgwAdmin::new(&workload);

        let user = admin.get_or_create_user("bob").await.unwrap();

        assert!(user.contains("bob-secret"));
        assert_eq!(
            workload.execs(),
            vec![user_info_command("bob"), user_create_command("bob")]
        );
    }

    #[tokio::test]
    async fn failures_can_be_swallowed() {
        let workload = FakeWorkload::default();
        let admin = RadosgwAdmin::new(&workload);

        let output = admin
            .run_cmd(&user_info_command("nobody"), false)
            .await
            .unwrap();

        assert_eq!(output, None);
    }
}
