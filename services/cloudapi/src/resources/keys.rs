use crate::{Client, RequestOptions, ResourceRef, Result};
use serde::Serialize;
use serde_json::Value;

const KEY_FIELDS: &[&str] = &["name", "fingerprint"];

/// Body of a create key request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateKey {
    /// Name of the key. The service defaults it to the fingerprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// OpenSSH public key.
    pub key: String,
}

impl Client {
    /// List SSH keys.
    pub async fn list_keys(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.account_path(opts, &["keys"]), opts)
            .await
    }

    /// Get a key by name, fingerprint or object.
    pub async fn get_key(
        &self,
        key: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let name = key.into().resolve(KEY_FIELDS)?;
        self.get_json(&self.account_path(opts, &["keys", &name]), opts)
            .await
    }

    /// Upload a public key.
    pub async fn create_key(&self, key: &CreateKey, opts: &RequestOptions) -> Result<Value> {
        let body = serde_json::to_value(key).map_err(|e| {
            smartdc_core::Error::request_invalid("invalid key").with_source(e)
        })?;
        self.post_json(&self.account_path(opts, &["keys"]), Some(body), opts)
            .await
    }

    /// Delete a key.
    pub async fn delete_key(
        &self,
        key: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let name = key.into().resolve(KEY_FIELDS)?;
        self.delete_path(&self.account_path(opts, &["keys", &name]), opts)
            .await
    }
}
