use super::machines::MACHINE_FIELDS;
use crate::{Client, RequestOptions, ResourceRef, Result};
use http::StatusCode;
use serde_json::{json, Value};

impl Client {
    /// List a machine's snapshots.
    pub async fn list_machine_snapshots(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(
            &self.account_path(opts, &["machines", &id, "snapshots"]),
            opts,
        )
        .await
    }

    /// Snapshot a machine. Without a name the service picks one.
    pub async fn create_machine_snapshot(
        &self,
        machine: impl Into<ResourceRef>,
        name: Option<&str>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        let body = name.map(|n| json!({ "name": n }));
        self.post_json(
            &self.account_path(opts, &["machines", &id, "snapshots"]),
            body,
            opts,
        )
        .await
    }

    /// Get one snapshot.
    pub async fn get_machine_snapshot(
        &self,
        machine: impl Into<ResourceRef>,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(
            &self.account_path(opts, &["machines", &id, "snapshots", name]),
            opts,
        )
        .await
    }

    /// Boot a stopped machine from a snapshot.
    pub async fn start_machine_from_snapshot(
        &self,
        machine: impl Into<ResourceRef>,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        let mut opts = opts.clone();
        opts.expect.get_or_insert(StatusCode::ACCEPTED);
        self.post_json(
            &self.account_path(&opts, &["machines", &id, "snapshots", name]),
            None,
            &opts,
        )
        .await?;
        Ok(())
    }

    /// Delete a snapshot.
    pub async fn delete_machine_snapshot(
        &self,
        machine: impl Into<ResourceRef>,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.delete_path(
            &self.account_path(opts, &["machines", &id, "snapshots", name]),
            opts,
        )
        .await
    }
}
