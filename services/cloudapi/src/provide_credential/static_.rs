use crate::constants::DEFAULT_KEY_FILE;
use crate::{Config, Credential, PrivateKey};
use async_trait::async_trait;
use log::{debug, warn};
use smartdc_core::{Context, Error, ProvideCredential, Result};

/// StaticCredentialProvider builds the credential from the auth fields of a [`Config`].
///
/// - `username` + `password` yield a basic credential.
/// - `key_id` yields a signature credential. The key is taken from `key`, else read
///   from `key_file`, else from `~/.ssh/id_rsa`. With `use_agent` a missing or
///   unreadable key is not an error: the agent does the signing.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    config: Config,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider from config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        load_credential(ctx, &self.config).await
    }
}

pub(crate) async fn load_credential(ctx: &Context, cfg: &Config) -> Result<Option<Credential>> {
    if let Some(username) = cfg.username.as_deref().filter(|v| !v.is_empty()) {
        return Ok(Some(Credential::basic(
            username,
            cfg.password.clone().unwrap_or_default(),
        )));
    }

    let Some(key_id) = cfg.key_id.as_deref().filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let key = match load_key(ctx, cfg).await {
        Ok(key) => Some(key),
        Err(err) if cfg.use_agent => {
            debug!("no local key for {key_id}, relying on the signing agent: {err}");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(Some(Credential::signature(key_id, key)))
}

async fn load_key(ctx: &Context, cfg: &Config) -> Result<PrivateKey> {
    if let Some(pem) = &cfg.key {
        return PrivateKey::from_pem(pem);
    }

    let key_file = cfg.key_file.as_deref().unwrap_or(DEFAULT_KEY_FILE);
    let path = ctx.expand_home_dir(key_file).ok_or_else(|| {
        Error::config_invalid(format!("cannot expand {key_file}: home dir is unknown"))
    })?;

    let pem = ctx.file_read_as_string(&path).await.map_err(|e| {
        if !cfg.use_agent {
            warn!("failed to read private key {path}: {e}");
        }
        Error::credential_invalid(format!("failed to read private key {path}")).with_source(e)
    })?;
    PrivateKey::from_pem(&pem)
}
