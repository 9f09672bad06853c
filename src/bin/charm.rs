use radosgw_charm::{
    juju::{HookContext, JujuCli},
    kubernetes::KubeCluster,
    operator::{Context, RadosgwCharm},
    pebble::PebbleCli,
    telemetry, CONTAINER_NAME,
};

/// Entry point Juju runs (through `dispatch`) for every hook and action
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    telemetry::init().await;

    // Grab the hook Juju is running
    let hook = HookContext::from_env()?;

    let context = Context {
        hook,
        juju: Box::new(JujuCli),
        workload: Box::new(PebbleCli::for_container(CONTAINER_NAME)),
        cluster: Box::new(KubeCluster::try_default().await?),
    };

    let result = RadosgwCharm::load(context).await?.dispatch().await;
    telemetry::shutdown();

    Ok(result?)
}
