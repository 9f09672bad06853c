use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::util::intstr::IntOrString,
};
use kube::{
    api::{Patch, PatchParams},
    core::ObjectMeta,
    Api, Client,
};
use tracing::info;

use crate::{Result, RADOSGW_PORT};

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "radosgw-charm";

/// The parts of the Kubernetes API the charm needs
#[async_trait]
pub trait Cluster: Send + Sync {
    /// First ingress address of a Service's load balancer, if one is assigned
    async fn load_balancer_address(&self, namespace: &str, name: &str) -> Result<Option<String>>;

    /// Make the application's Service a load balancer exposing the gateway port
    async fn patch_service(&self, namespace: &str, app: &str) -> Result<()>;
}

pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect with the in-cluster service account (or local kubeconfig)
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }
}

#[async_trait]
impl Cluster for KubeCluster {
    async fn load_balancer_address(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        let services = Api::<Service>::namespaced(self.client.clone(), namespace);
        let service = services.get(name).await?;

        Ok(load_balancer_address(&service))
    }

    async fn patch_service(&self, namespace: &str, app: &str) -> Result<()> {
        let services = Api::<Service>::namespaced(self.client.clone(), namespace);

        info!(r#"Patching service "{namespace}/{app}" to LoadBalancer"#);
        let params = PatchParams::apply(FIELD_MANAGER).force();
        services
            .patch(app, &params, &Patch::Apply(load_balancer_service(app)))
            .await?;

        Ok(())
    }
}

/// Hostname, or failing that IP, of the first load balancer ingress entry.
pub fn load_balancer_address(service: &Service) -> Option<String> {
    let ingress = service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?;

    ingress
        .hostname
        .clone()
        .filter(|h| !h.is_empty())
        .or_else(|| ingress.ip.clone().filter(|ip| !ip.is_empty()))
}

/// The desired shape of the application's Service.
pub fn load_balancer_service(app: &str) -> Service {
    let port = i32::from(RADOSGW_PORT);

    Service {
        metadata: ObjectMeta {
            name: Some(app.into()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".into()),
            selector: Some(BTreeMap::from([(
                "app.kubernetes.io/name".into(),
                app.into(),
            )])),
            ports: Some(vec![ServicePort {
                name: Some(app.into()),
                port,
                protocol: Some("TCP".into()),
                target_port: Some(IntOrString::Int(port)),

                ..Default::default()
            }]),

            ..Default::default()
        }),
        status: None,
    }
}
