use std::collections::BTreeMap;

use schemars::{schema::RootSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{config::defaults, CreateUserParams};
use crate::{Result, CONTAINER_NAME, OBJECT_STORAGE_RELATION};

/// Contents of `metadata.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    pub name: String,
    pub display_name: String,
    pub summary: String,
    pub description: String,

    /// Features the Juju controller must provide
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumes: Vec<String>,

    #[serde(default)]
    pub containers: BTreeMap<String, Container>,

    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,

    #[serde(default)]
    pub provides: BTreeMap<String, Relation>,
}

/// A workload container, created from an oci-image resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Container {
    pub resource: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_source: Option<String>,
}

/// A relation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Relation {
    /// The interface schema that this relation conforms to
    pub interface: String,

    /// Which schema versions this charm accepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

/// A single entry of `actions.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub description: String,
    pub params: BTreeMap<String, Value>,
    pub required: Vec<String>,
    pub additional_properties: bool,
}

/// Contents of `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub options: BTreeMap<String, ConfigOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigOption {
    #[serde(rename = "type")]
    pub kind: ConfigType,
    pub default: Value,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    String,
    Int,
    Boolean,
}

impl Metadata {
    pub fn radosgw() -> Self {
        let image = format!("{CONTAINER_NAME}-image");

        Self {
            name: "ceph-radosgw-k8s".into(),
            display_name: "Ceph RADOS Gateway".into(),
            summary: "S3 compatible object storage backed by Ceph RGW".into(),
            description: "Runs a standalone Ceph RADOS Gateway on Kubernetes and \
                          hands out S3 credentials over the object-storage relation."
                .into(),
            assumes: vec!["k8s-api".into()],
            containers: BTreeMap::from([(
                CONTAINER_NAME.into(),
                Container {
                    resource: image.clone(),
                },
            )]),
            resources: BTreeMap::from([(
                image,
                Resource {
                    kind: "oci-image".into(),
                    description: "OCI image providing radosgw and radosgw-admin".into(),
                    upstream_source: Some("quay.io/ceph/ceph:v18".into()),
                },
            )]),
            provides: BTreeMap::from([(
                OBJECT_STORAGE_RELATION.into(),
                Relation {
                    interface: OBJECT_STORAGE_RELATION.into(),
                    versions: vec!["v1".into()],
                },
            )]),
        }
    }
}

impl Action {
    fn from_schema(description: &str, schema: RootSchema) -> Result<Self> {
        let object = *schema.schema.object.unwrap_or_default();
        let params = object
            .properties
            .into_iter()
            .map(|(name, schema)| -> Result<(String, Value)> {
                Ok((name, serde_json::to_value(schema)?))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            description: description.into(),
            params,
            required: object.required.into_iter().collect(),
            additional_properties: false,
        })
    }
}

/// All actions the charm exposes.
pub fn actions() -> Result<BTreeMap<String, Action>> {
    Ok(BTreeMap::from([(
        "create-user".into(),
        Action::from_schema(
            "Get or create a gateway user and return its keys.",
            schema_for!(CreateUserParams),
        )?,
    )]))
}

impl Config {
    pub fn radosgw() -> Self {
        Self {
            options: BTreeMap::from([
                (
                    "external-hostname".into(),
                    ConfigOption {
                        kind: ConfigType::String,
                        default: Value::String(String::new()),
                        description: "Hostname advertised to clients. When empty the load \
                                      balancer address of the service is used."
                            .into(),
                    },
                ),
                (
                    "debug-rgw".into(),
                    ConfigOption {
                        kind: ConfigType::Int,
                        default: Value::from(defaults::debug_rgw()),
                        description: "Debug level of the gateway (debug rgw).".into(),
                    },
                ),
            ]),
        }
    }
}
