use crate::{Client, RequestOptions, Result};
use serde_json::Value;

const ANALYTICS: &str = "analytics";
const INSTRUMENTATIONS: &str = "instrumentations";

impl Client {
    /// Metrics, fields and types the analytics service supports.
    pub async fn describe_analytics(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &[ANALYTICS]), opts)
            .await
    }

    /// List instrumentations.
    pub async fn list_instrumentations(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(
            &self.account_path(opts, &[ANALYTICS, INSTRUMENTATIONS]),
            opts,
        )
        .await
    }

    /// Create an instrumentation, e.g. `{"module": "syscall", "stat": "syscalls"}`.
    pub async fn create_instrumentation(
        &self,
        spec: Value,
        opts: &RequestOptions,
    ) -> Result<Value> {
        self.post_json(
            &self.account_path(opts, &[ANALYTICS, INSTRUMENTATIONS]),
            Some(spec),
            opts,
        )
        .await
    }

    /// Get an instrumentation.
    pub async fn get_instrumentation(&self, id: u64, opts: &RequestOptions) -> Result<Value> {
        let id = id.to_string();
        self.get_json(
            &self.account_path(opts, &[ANALYTICS, INSTRUMENTATIONS, &id]),
            opts,
        )
        .await
    }

    /// Current raw value of an instrumentation.
    pub async fn get_instrumentation_value(&self, id: u64, opts: &RequestOptions) -> Result<Value> {
        let id = id.to_string();
        let opts = opts.clone().with_no_cache();
        self.get_json(
            &self.account_path(&opts, &[ANALYTICS, INSTRUMENTATIONS, &id, "value", "raw"]),
            &opts,
        )
        .await
    }

    /// Delete an instrumentation.
    pub async fn delete_instrumentation(&self, id: u64, opts: &RequestOptions) -> Result<()> {
        let id = id.to_string();
        self.delete_path(
            &self.account_path(opts, &[ANALYTICS, INSTRUMENTATIONS, &id]),
            opts,
        )
        .await
    }
}
