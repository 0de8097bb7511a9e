use crate::{Client, RequestOptions, Result};
use serde_json::Value;

impl Client {
    /// Get the account.
    pub async fn get_account(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &[]), opts).await
    }

    /// Update account fields such as `email` or `companyName`.
    pub async fn update_account(&self, changes: Value, opts: &RequestOptions) -> Result<Value> {
        self.post_json(&self.account_path(opts, &[]), Some(changes), opts)
            .await
    }
}
