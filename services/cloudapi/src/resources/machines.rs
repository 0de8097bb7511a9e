use crate::{Client, RequestOptions, ResourceCount, ResourceRef, Result};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use smartdc_core::Error;

/// Body of a create machine request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMachine {
    /// Friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Package id or name.
    pub package: String,
    /// Image id.
    pub image: String,
    /// Network ids to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Extra fields, e.g. `metadata.user-script` or `tag.role`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// State changing machine actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    /// Boot a stopped machine.
    Start,
    /// Shut a machine down.
    Stop,
    /// Restart a machine.
    Reboot,
}

impl MachineAction {
    fn as_str(&self) -> &'static str {
        match self {
            MachineAction::Start => "start",
            MachineAction::Stop => "stop",
            MachineAction::Reboot => "reboot",
        }
    }
}

pub(crate) const MACHINE_FIELDS: &[&str] = &["id"];

impl Client {
    /// List machines.
    ///
    /// Listings are paginated and change quickly, so the cache is never consulted.
    pub async fn list_machines(&self, opts: &RequestOptions) -> Result<Value> {
        let opts = opts.clone().with_no_cache();
        self.get_json(&self.account_path(&opts, &["machines"]), &opts)
            .await
    }

    /// Count machines matching the filters in `opts.query`.
    pub async fn count_machines(&self, opts: &RequestOptions) -> Result<ResourceCount> {
        self.head_count(&self.account_path(opts, &["machines"]), opts)
            .await
    }

    /// Get a machine.
    pub async fn get_machine(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.get_json(&self.account_path(opts, &["machines", &id]), opts)
            .await
    }

    /// Provision a machine.
    pub async fn create_machine(
        &self,
        machine: &CreateMachine,
        opts: &RequestOptions,
    ) -> Result<Value> {
        if machine.package.is_empty() || machine.image.is_empty() {
            return Err(Error::request_invalid("package and image are required").into());
        }
        let body = serde_json::to_value(machine)
            .map_err(|e| Error::request_invalid("invalid machine").with_source(e))?;
        self.post_json(&self.account_path(opts, &["machines"]), Some(body), opts)
            .await
    }

    /// Destroy a machine.
    pub async fn delete_machine(
        &self,
        machine: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = machine.into().resolve(MACHINE_FIELDS)?;
        self.delete_path(&self.account_path(opts, &["machines", &id]), opts)
            .await
    }

    /// Start, stop or reboot a machine.
    pub async fn machine_action(
        &self,
        machine: impl Into<ResourceRef>,
        action: MachineAction,
        opts: &RequestOptions,
    ) -> Result<()> {
        let opts = opts.clone().with_query("action", action.as_str());
        self.post_machine_action(machine.into(), opts).await
    }

    /// Resize a machine to another package.
    pub async fn resize_machine(
        &self,
        machine: impl Into<ResourceRef>,
        package: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let package = package.into().resolve(&["id", "name"])?;
        let opts = opts
            .clone()
            .with_query("action", "resize")
            .with_query("package", package);
        self.post_machine_action(machine.into(), opts).await
    }

    /// Rename a machine.
    pub async fn rename_machine(
        &self,
        machine: impl Into<ResourceRef>,
        name: &str,
        opts: &RequestOptions,
    ) -> Result<()> {
        let opts = opts
            .clone()
            .with_query("action", "rename")
            .with_query("name", name);
        self.post_machine_action(machine.into(), opts).await
    }

    async fn post_machine_action(
        &self,
        machine: ResourceRef,
        mut opts: RequestOptions,
    ) -> Result<()> {
        let id = machine.resolve(MACHINE_FIELDS)?;
        opts.expect.get_or_insert(StatusCode::ACCEPTED);
        self.post_json(&self.account_path(&opts, &["machines", &id]), None, &opts)
            .await?;
        Ok(())
    }
}
