use tracing::info;

use crate::{
    juju::Status,
    operator::RadosgwCharm,
    resources::{ceph_conf, CharmConfig, Layer, CEPH_CONF_PATH},
    Result, CONTAINER_NAME, RADOSGW_PORT,
};

impl RadosgwCharm {
    /// Make the app Service reachable from outside the cluster
    pub(crate) async fn on_install(&mut self) -> Result<()> {
        let hook = &self.ctx.hook;
        self.ctx
            .cluster
            .patch_service(&hook.model_name, hook.app_name())
            .await
    }

    /// Configure and start the gateway once its container is up.
    pub(crate) async fn on_radosgw_pebble_ready(&mut self) -> Result<()> {
        let config = self.ctx.juju.config().await?;
        self.push_ceph_conf(&config).await?;

        let workload = &self.ctx.workload;
        workload
            .add_layer(CONTAINER_NAME, &Layer::radosgw(), true)
            .await?;
        workload.autostart().await?;

        info!("radosgw layer applied");
        self.state.ready = true;
        self.refresh_status(&config).await
    }

    /// Apply changed options to a running gateway.
    ///
    /// The gateway is only restarted when its ceph configuration changed.
    pub(crate) async fn on_config_changed(&mut self) -> Result<()> {
        let config = self.ctx.juju.config().await?;
        if !self.ready() {
            return self.wait_for_container().await;
        }

        if self.state.ceph_conf.as_deref() != Some(ceph_conf(config.debug_level()).as_str()) {
            self.push_ceph_conf(&config).await?;
            info!("ceph configuration changed, restarting radosgw");
            self.ctx.workload.restart(&[CONTAINER_NAME]).await?;
        }

        self.refresh_status(&config).await
    }

    pub(crate) async fn on_update_status(&mut self) -> Result<()> {
        if !self.ready() {
            return self.wait_for_container().await;
        }

        let config = self.ctx.juju.config().await?;
        self.refresh_status(&config).await
    }

    /// The address clients should use to reach the gateway.
    ///
    /// Prefers the `external-hostname` option, then the load balancer address
    /// of the app's Service.
    pub async fn external_host(&self, config: &CharmConfig) -> Result<Option<String>> {
        if let Some(hostname) = config.external_hostname() {
            return Ok(Some(hostname.to_string()));
        }

        let hook = &self.ctx.hook;
        self.ctx
            .cluster
            .load_balancer_address(&hook.model_name, hook.app_name())
            .await
    }

    pub async fn access_url(&self, config: &CharmConfig) -> Result<Option<String>> {
        Ok(self
            .external_host(config)
            .await?
            .map(|host| format!("http://{host}:{RADOSGW_PORT}")))
    }

    async fn push_ceph_conf(&mut self, config: &CharmConfig) -> Result<()> {
        let conf = ceph_conf(config.debug_level());
        self.ctx.workload.push(CEPH_CONF_PATH, &conf).await?;
        self.state.ceph_conf = Some(conf);

        Ok(())
    }

    async fn refresh_status(&mut self, config: &CharmConfig) -> Result<()> {
        let url = self.access_url(config).await?;
        let status = match &url {
            Some(url) => Status::Active(format!("Access via {url}")),
            None => Status::Waiting("Waiting for load balancer address".into()),
        };

        self.state.url = url;
        self.ctx.juju.status_set(&status).await
    }

    async fn wait_for_container(&self) -> Result<()> {
        self.ctx
            .juju
            .status_set(&Status::Waiting("Waiting for radosgw container".into()))
            .await
    }
}
