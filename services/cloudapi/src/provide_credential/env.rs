use crate::config::parse_bool;
use crate::constants::*;
use crate::provide_credential::static_::load_credential;
use crate::{Config, Credential};
use async_trait::async_trait;
use smartdc_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads CloudAPI credentials from environment variables.
///
/// - `SDC_USER` and `SDC_PASSWORD` for basic auth
/// - `SDC_KEY_ID` and optionally `SDC_KEY_FILE` for signature auth
/// - `SDC_USE_AGENT` to let the signing agent hold the key
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider {}

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty()).cloned();

        let cfg = Config {
            username: get(SDC_USER),
            password: get(SDC_PASSWORD),
            key_id: get(SDC_KEY_ID),
            key_file: get(SDC_KEY_FILE),
            use_agent: get(SDC_USE_AGENT).is_some_and(|v| parse_bool(&v)),
            ..Default::default()
        };

        load_credential(ctx, &cfg).await
    }
}
