use crate::{Client, RequestOptions, ResourceRef, Result};
use serde_json::Value;

impl Client {
    /// List networks available to the account.
    pub async fn list_networks(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["networks"]), opts)
            .await
    }

    /// Get a network.
    pub async fn get_network(
        &self,
        network: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = network.into().resolve(&["id"])?;
        self.get_json(&self.account_path(opts, &["networks", &id]), opts)
            .await
    }
}
