use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{error, info};

use crate::{
    operator::RadosgwCharm,
    radosgw_admin::{hyphenate, RadosgwAdmin},
    resources::{flatten_results, CreateUserParams},
    Result,
};

impl RadosgwCharm {
    /// Get or create a gateway user and hand its record back to the operator.
    ///
    /// Failures are reported through `action-fail` rather than failing the hook.
    pub(crate) async fn on_create_user_action(&self) -> Result<()> {
        match self.create_user().await {
            Ok(results) => self.ctx.juju.action_set(&results).await,
            Err(e) => {
                error!("create-user failed: {e}");
                self.ctx.juju.action_fail(&e.to_string()).await
            }
        }
    }

    async fn create_user(&self) -> Result<BTreeMap<String, String>> {
        let params: CreateUserParams = serde_json::from_value(self.ctx.juju.action_params().await?)?;
        let username = params.validate()?.username;

        let stdout = RadosgwAdmin::new(self.ctx.workload.as_ref())
            .get_or_create_user(&username)
            .await?;
        let user = hyphenate(serde_json::from_str::<Value>(&stdout)?);
        info!(r#"Returning record of user "{username}""#);

        let mut results = flatten_results("user", &user);
        results.insert("result".into(), "success".into());

        Ok(results)
    }
}
