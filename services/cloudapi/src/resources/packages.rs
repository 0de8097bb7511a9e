use crate::{Client, RequestOptions, ResourceRef, Result};
use serde_json::Value;

impl Client {
    /// List packages. Filters such as `memory` go in `opts.query`.
    pub async fn list_packages(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["packages"]), opts)
            .await
    }

    /// Get a package by id, name or object.
    pub async fn get_package(
        &self,
        package: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = package.into().resolve(&["id", "name"])?;
        self.get_json(&self.account_path(opts, &["packages", &id]), opts)
            .await
    }
}
