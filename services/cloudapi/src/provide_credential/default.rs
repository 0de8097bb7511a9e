use crate::provide_credential::{EnvCredentialProvider, StaticCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use smartdc_core::{Context, ProvideCredential, Result};

/// Default credential provider for CloudAPI.
///
/// The auth mode is fixed by the config it is created with:
///
/// 1. a config with basic or signature auth fields only ever yields that
///    credential, and a key that cannot be loaded is an error
/// 2. a config without auth fields reads `SDC_*` environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    source: Source,
}

#[derive(Debug)]
enum Source {
    Config(StaticCredentialProvider),
    Env(EnvCredentialProvider),
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new(config: Config) -> Self {
        let source = if config.has_basic_auth() || config.has_signature_auth() {
            Source::Config(StaticCredentialProvider::new(config))
        } else {
            Source::Env(EnvCredentialProvider::new())
        };

        Self { source }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match &self.source {
            Source::Config(p) => p.provide_credential(ctx).await,
            Source::Env(p) => p.provide_credential(ctx).await,
        }
    }
}
