use crate::{Client, RequestOptions, ResourceRef, Result};
use serde_json::{json, Value};

impl Client {
    /// List images.
    pub async fn list_images(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["images"]), opts)
            .await
    }

    /// Get an image.
    pub async fn get_image(
        &self,
        image: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = image.into().resolve(&["id"])?;
        self.get_json(&self.account_path(opts, &["images", &id]), opts)
            .await
    }

    /// Create an image from a stopped machine.
    pub async fn create_image_from_machine(
        &self,
        machine: impl Into<ResourceRef>,
        name: &str,
        version: &str,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let machine = machine.into().resolve(&["id"])?;
        let body = json!({ "machine": machine, "name": name, "version": version });
        self.post_json(&self.account_path(opts, &["images"]), Some(body), opts)
            .await
    }

    /// Delete an image.
    pub async fn delete_image(
        &self,
        image: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = image.into().resolve(&["id"])?;
        self.delete_path(&self.account_path(opts, &["images", &id]), opts)
            .await
    }
}
