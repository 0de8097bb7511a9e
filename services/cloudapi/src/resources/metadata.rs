use super::machines::MACHINE_FIELDS;
use crate::{Client, RequestOptions, ResourceRef, Result};
use serde_json::Value;

impl Client {
    /// List a machine's metadata.
    pub async fn list_machine_metadata(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(
            &self.account_path(opts, &["machines", &id, "metadata"]),
            opts,
        )
        .await
    }

    /// Add or update metadata keys.
    pub async fn add_machine_metadata(
        &self,
        machine: impl Into<ResourceRef>,
        metadata: Value,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.post_json(
            &self.account_path(opts, &["machines", &id, "metadata"]),
            Some(metadata),
            opts,
        )
        .await
    }

    /// Get one metadata value.
    pub async fn get_machine_metadata(
        &self,
        machine: impl Into<ResourceRef>,
        key: &str,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(
            &self.account_path(opts, &["machines", &id, "metadata", key]),
            opts,
        )
        .await
    }

    /// Delete one metadata key.
    pub async fn delete_machine_metadata(
        &self,
        machine: impl Into<ResourceRef>,
        key: &str,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.delete_path(
            &self.account_path(opts, &["machines", &id, "metadata", key]),
            opts,
        )
        .await
    }
}
