use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    juju::{HookTools, RelationRef},
    operator::RadosgwCharm,
    radosgw_admin::{credentials_from_user, RadosgwAdmin, OBJECT_STORE_USER},
    resources::Credentials,
    Result,
};

/// What the provides side of the object storage relation needs from the charm
#[async_trait]
pub(crate) trait ObjectStoreBackend {
    fn ready(&self) -> bool;

    /// Postpone a relation event until the backend is ready
    fn defer(&mut self, relation_id: &str);

    fn hook_tools(&self) -> &dyn HookTools;

    async fn object_storage_credentials(&self) -> Result<Credentials>;
}

/// Provides side of the `object-storage` relation.
///
/// Observes relation-joined and relation-changed and answers both the same
/// way: with the credentials of the gateway's object store user.
#[derive(Debug, Clone)]
pub(crate) struct ObjectStoreProvides {
    relation_name: String,
}

impl ObjectStoreProvides {
    pub fn new(relation_name: impl Into<String>) -> Self {
        Self {
            relation_name: relation_name.into(),
        }
    }

    pub fn handles(&self, relation: &RelationRef) -> bool {
        relation.name == self.relation_name
    }

    pub async fn on_relation_changed<B: ObjectStoreBackend>(
        &self,
        charm: &mut B,
        relation_id: &str,
    ) -> Result<()> {
        // Only the leader may write the application data bag
        if !charm.hook_tools().is_leader().await? {
            debug!("Not the leader, leaving relation {relation_id} to the leader");
            return Ok(());
        }

        if !charm.ready() {
            info!("Deferring relation {relation_id} until radosgw is ready");
            charm.defer(relation_id);
            return Ok(());
        }

        let data = charm.object_storage_credentials().await?.relation_data()?;
        charm.hook_tools().relation_set_app(relation_id, &data).await?;
        info!("Published object storage credentials on {relation_id}");

        Ok(())
    }
}

#[async_trait]
impl ObjectStoreBackend for RadosgwCharm {
    fn ready(&self) -> bool {
        RadosgwCharm::ready(self)
    }

    fn defer(&mut self, relation_id: &str) {
        self.state.defer(relation_id);
    }

    fn hook_tools(&self) -> &dyn HookTools {
        self.ctx.juju.as_ref()
    }

    async fn object_storage_credentials(&self) -> Result<Credentials> {
        let user = RadosgwAdmin::new(self.ctx.workload.as_ref())
            .get_or_create_user(OBJECT_STORE_USER)
            .await?;

        credentials_from_user(&user, &self.ctx.hook.model_name, self.ctx.hook.app_name())
    }
}
