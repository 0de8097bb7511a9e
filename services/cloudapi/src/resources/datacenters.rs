use crate::{Client, RequestOptions, Result};
use serde_json::Value;

impl Client {
    /// Map of datacenter names to their CloudAPI URLs.
    pub async fn list_datacenters(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["datacenters"]), opts)
            .await
    }
}
