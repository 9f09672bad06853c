use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Interface versions advertised on the object storage relation.
pub const SUPPORTED_VERSIONS: &str = "- v1";

/// Access credentials handed to an object storage consumer.
///
/// Fields are declared in alphabetical order so the serialized form has
/// sorted keys.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Credentials {
    /// S3 access key of the `object-store` user
    pub access_key: String,

    /// Model (and Kubernetes namespace) the gateway runs in
    pub namespace: String,

    /// Port the gateway listens on
    pub port: u16,

    /// S3 secret key of the `object-store` user
    pub secret_key: String,

    /// Whether the endpoint speaks TLS
    pub secure: bool,

    /// Name of the Kubernetes Service fronting the gateway
    pub service: String,
}

impl Credentials {
    /// The application data bag published on the relation.
    pub fn relation_data(&self) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::from([
            ("data".into(), serde_yaml::to_string(self)?),
            ("_supported_versions".into(), SUPPORTED_VERSIONS.into()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            access_key: "AK0001".into(),
            namespace: "ceph".into(),
            port: 7480,
            secret_key: "s3cr3t".into(),
            secure: false,
            service: "radosgw".into(),
        }
    }

    #[test]
    fn data_is_sorted_yaml() {
        let data = credentials().relation_data().unwrap();

        assert_eq!(
            data["data"],
            indoc! {"
                access-key: AK0001
                namespace: ceph
                port: 7480
                secret-key: s3cr3t
                secure: false
                service: radosgw
            "}
        );
    }

    #[test]
    fn advertises_v1() {
        let data = credentials().relation_data().unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["_supported_versions"], "- v1");
    }

    #[test]
    fn consumers_can_read_it_back() {
        let data = credentials().relation_data().unwrap();
        let parsed: Credentials = serde_yaml::from_str(&data["data"]).unwrap();

        assert_eq!(parsed, credentials());
    }
}
