use crate::{Client, RequestOptions, Result};
use serde_json::Value;

impl Client {
    /// Usage for a billing period, `YYYY-MM`.
    pub async fn get_usage(&self, period: &str, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["usage", period]), opts)
            .await
    }
}
