use super::machines::MACHINE_FIELDS;
use crate::{Client, RequestOptions, ResourceRef, Result};
use serde_json::Value;

impl Client {
    /// List a machine's tags.
    pub async fn list_machine_tags(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(&self.account_path(opts, &["machines", &id, "tags"]), opts)
            .await
    }

    /// Add tags, keeping the existing ones.
    pub async fn add_machine_tags(
        &self,
        machine: impl Into<ResourceRef>,
        tags: Value,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.post_json(
            &self.account_path(opts, &["machines", &id, "tags"]),
            Some(tags),
            opts,
        )
        .await
    }

    /// Replace all tags.
    pub async fn replace_machine_tags(
        &self,
        machine: impl Into<ResourceRef>,
        tags: Value,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.put_json(&self.account_path(opts, &["machines", &id, "tags"]), tags, opts)
            .await
    }

    /// Get a single tag value.
    pub async fn get_machine_tag(
        &self,
        machine: impl Into<ResourceRef>,
        tag: &str,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(
            &self.account_path(opts, &["machines", &id, "tags", tag]),
            opts,
        )
        .await
    }

    /// Delete a single tag.
    pub async fn delete_machine_tag(
        &self,
        machine: impl Into<ResourceRef>,
        tag: &str,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.delete_path(
            &self.account_path(opts, &["machines", &id, "tags", tag]),
            opts,
        )
        .await
    }

    /// Delete every tag.
    pub async fn delete_machine_tags(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.delete_path(&self.account_path(opts, &["machines", &id, "tags"]), opts)
            .await
    }
}
