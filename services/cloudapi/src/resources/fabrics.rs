use crate::{Client, RequestOptions, ResourceRef, Result};
use serde::Serialize;
use serde_json::Value;
use smartdc_core::Error;

const FABRICS: &str = "fabrics";
const DEFAULT_FABRIC: &str = "default";

/// Body of a create VLAN request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFabricVlan {
    /// VLAN id, 0 to 4095.
    pub vlan_id: u16,
    /// Unique name.
    pub name: String,
    /// Free form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a create fabric network request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateFabricNetwork {
    /// Unique name.
    pub name: String,
    /// CIDR, e.g. `10.50.1.0/24`.
    pub subnet: String,
    /// First assignable address.
    pub provision_start_ip: String,
    /// Last assignable address.
    pub provision_end_ip: String,
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Resolver addresses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<String>,
    /// Free form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn to_body(v: &impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(v)
        .map_err(|e| Error::request_invalid("invalid fabric request").with_source(e))?)
}

impl Client {
    fn vlan_path(&self, opts: &RequestOptions, rest: &[&str]) -> String {
        let mut segments = vec![FABRICS, DEFAULT_FABRIC, "vlans"];
        segments.extend_from_slice(rest);
        self.account_path(opts, &segments)
    }

    /// List fabric VLANs.
    pub async fn list_fabric_vlans(&self, opts: &RequestOptions) -> Result<Value> {
        self.get_json(&self.vlan_path(opts, &[]), opts).await
    }

    /// Get a fabric VLAN.
    pub async fn get_fabric_vlan(&self, vlan_id: u16, opts: &RequestOptions) -> Result<Value> {
        let id = vlan_id.to_string();
        self.get_json(&self.vlan_path(opts, &[&id]), opts).await
    }

    /// Create a fabric VLAN.
    pub async fn create_fabric_vlan(
        &self,
        vlan: &CreateFabricVlan,
        opts: &RequestOptions,
    ) -> Result<Value> {
        self.post_json(&self.vlan_path(opts, &[]), Some(to_body(vlan)?), opts)
            .await
    }

    /// Delete a fabric VLAN.
    pub async fn delete_fabric_vlan(&self, vlan_id: u16, opts: &RequestOptions) -> Result<()> {
        let id = vlan_id.to_string();
        self.delete_path(&self.vlan_path(opts, &[&id]), opts).await
    }

    /// List the networks on a fabric VLAN.
    pub async fn list_fabric_networks(&self, vlan_id: u16, opts: &RequestOptions) -> Result<Value> {
        let id = vlan_id.to_string();
        self.get_json(&self.vlan_path(opts, &[&id, "networks"]), opts)
            .await
    }

    /// Create a network on a fabric VLAN.
    pub async fn create_fabric_network(
        &self,
        vlan_id: u16,
        network: &CreateFabricNetwork,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let id = vlan_id.to_string();
        self.post_json(
            &self.vlan_path(opts, &[&id, "networks"]),
            Some(to_body(network)?),
            opts,
        )
        .await
    }

    /// Delete a network from a fabric VLAN.
    pub async fn delete_fabric_network(
        &self,
        vlan_id: u16,
        network: impl Into<ResourceRef>,
        opts: &RequestOptions,
    ) -> Result<()> {
        let id = vlan_id.to_string();
        let network = network.into().resolve(&["id"])?;
        self.delete_path(&self.vlan_path(opts, &[&id, "networks", &network]), opts)
            .await
    }
}
