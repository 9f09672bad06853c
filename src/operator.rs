use chrono::Utc;
use tracing::{debug, field, info, instrument, warn, Span};

use crate::{
    handlers::object_storage::ObjectStoreProvides,
    juju::{Event, HookContext, HookTools},
    kubernetes::Cluster,
    pebble::Workload,
    resources::{StoredState, STATE_KEY},
    telemetry, Result, CONTAINER_NAME, OBJECT_STORAGE_RELATION,
};

/// Everything a hook invocation talks to
pub struct Context {
    /// The hook Juju is running
    pub hook: HookContext,

    /// Juju hook tools
    pub juju: Box<dyn HookTools>,

    /// Pebble in the radosgw container
    pub workload: Box<dyn Workload>,

    /// Kubernetes API
    pub cluster: Box<dyn Cluster>,
}

/// The Ceph RADOS Gateway charm
pub struct RadosgwCharm {
    pub(crate) ctx: Context,
    pub(crate) state: StoredState,
    pub(crate) object_storage: ObjectStoreProvides,
}

impl RadosgwCharm {
    /// Set up the charm for one hook, restoring state from earlier hooks.
    pub async fn load(ctx: Context) -> Result<Self> {
        let state = match ctx.juju.state_get(STATE_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => StoredState::default(),
        };

        Ok(Self {
            ctx,
            state,
            object_storage: ObjectStoreProvides::new(OBJECT_STORAGE_RELATION),
        })
    }

    pub fn ready(&self) -> bool {
        self.state.ready
    }

    pub fn state(&self) -> &StoredState {
        &self.state
    }

    async fn save(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.state)?;
        self.ctx.juju.state_set(STATE_KEY, &raw).await
    }

    /// Handle the event of this hook invocation.
    ///
    /// State is only persisted when handling succeeds, so a failed hook is
    /// retried by Juju from the same starting point.
    #[instrument(skip(self), fields(trace_id, hook = %self.ctx.hook.dispatch_path))]
    pub async fn dispatch(&mut self) -> Result<()> {
        let trace_id = telemetry::get_trace_id();
        Span::current().record("trace_id", &field::display(&trace_id));
        self.state.last_event = Some(Utc::now());

        let event = self.ctx.hook.event();
        info!("Handling {event:?}");

        match event {
            Event::Install | Event::UpgradeCharm => self.on_install().await?,
            Event::PebbleReady { container } if container == CONTAINER_NAME => {
                self.on_radosgw_pebble_ready().await?
            }
            Event::ConfigChanged => self.on_config_changed().await?,
            Event::UpdateStatus => self.on_update_status().await?,
            Event::Action { name } if name == "create-user" => {
                self.on_create_user_action().await?
            }
            Event::Action { name } => {
                warn!("Unknown action {name}");
                self.ctx
                    .juju
                    .action_fail(&format!("unknown action {name}"))
                    .await?
            }
            Event::RelationJoined(relation) | Event::RelationChanged(relation)
                if self.object_storage.handles(&relation) =>
            {
                let provides = self.object_storage.clone();
                provides.on_relation_changed(&mut *self, &relation.id).await?
            }
            Event::RelationBroken(relation) => {
                self.state.deferred.remove(&relation.id);
            }
            other => debug!("Ignoring {other:?}"),
        }

        self.flush_deferred().await;
        self.save().await
    }

    /// Re-run relation events that arrived before the workload was up.
    ///
    /// A relation that still fails stays deferred for the next hook, so the
    /// hook that made the charm ready is never failed by it.
    async fn flush_deferred(&mut self) {
        if !self.ready() || self.state.deferred.is_empty() {
            return;
        }

        let provides = self.object_storage.clone();
        for relation_id in self.state.take_deferred() {
            info!("Handling deferred relation {relation_id}");
            if let Err(e) = provides.on_relation_changed(&mut *self, &relation_id).await {
                warn!("Deferred relation {relation_id} failed, retrying later: {e}");
                self.state.defer(&relation_id);
            }
        }
    }
}
