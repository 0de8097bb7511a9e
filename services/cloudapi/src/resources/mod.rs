//! Typed CloudAPI resource methods.
//!
//! Each method builds a logical path under the account, then goes through the
//! [`Client`](crate::Client) dispatcher. Bodies and responses are plain JSON.

mod account;
mod analytics;
mod datacenters;
mod fabrics;
mod images;
mod keys;
mod machines;
mod metadata;
mod networks;
mod packages;
mod snapshots;
mod tags;
mod usage;

pub use fabrics::{CreateFabricNetwork, CreateFabricVlan};
pub use keys::CreateKey;
pub use machines::{CreateMachine, MachineAction};

use crate::path::escape_segment;
use crate::{ApiError, Client, RequestOptions};
use serde_json::Value;
use smartdc_core::Error;

/// A resource given either by its identifier or as a previously fetched object.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRef {
    /// Identifier or name.
    Id(String),
    /// Object as returned by the service.
    Object(Value),
}

impl ResourceRef {
    /// Resolve to an identifier, reading the first of `fields` present on an object.
    pub fn resolve(&self, fields: &[&str]) -> Result<String, ApiError> {
        match self {
            ResourceRef::Id(id) if id.is_empty() => {
                Err(Error::request_invalid("resource identifier must not be empty").into())
            }
            ResourceRef::Id(id) => Ok(id.clone()),
            ResourceRef::Object(obj) => fields
                .iter()
                .find_map(|f| obj.get(*f).and_then(Value::as_str))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::request_invalid(format!(
                        "resource object has none of the fields {fields:?}"
                    ))
                    .into()
                }),
        }
    }
}

impl From<&str> for ResourceRef {
    fn from(v: &str) -> Self {
        ResourceRef::Id(v.to_string())
    }
}

impl From<String> for ResourceRef {
    fn from(v: String) -> Self {
        ResourceRef::Id(v)
    }
}

impl From<Value> for ResourceRef {
    fn from(v: Value) -> Self {
        ResourceRef::Object(v)
    }
}

impl From<&Value> for ResourceRef {
    fn from(v: &Value) -> Self {
        ResourceRef::Object(v.clone())
    }
}

impl Client {
    /// Logical path `/<account>/<rest...>` with every segment escaped.
    pub(crate) fn account_path(&self, opts: &RequestOptions, rest: &[&str]) -> String {
        let account = opts.account.as_deref().unwrap_or(self.account());
        let mut path = format!("/{}", escape_segment(account));
        for segment in rest {
            path.push('/');
            path.push_str(&escape_segment(segment));
        }
        path
    }
}
