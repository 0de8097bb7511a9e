// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::*;
use crate::AgentFailurePolicy;
use log::warn;
use smartdc_core::utils::Redact;
use smartdc_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Config for a CloudAPI client.
///
/// Exactly one authentication mode must be configured: `username` + `password`, or
/// `key_id` plus key material (`key`, `key_file`, or a signing agent).
#[derive(Clone, Default)]
pub struct Config {
    /// Base URL of the CloudAPI endpoint, e.g. `https://us-east-1.api.example.com`.
    pub url: Option<String>,
    /// Account used when a call doesn't name one. Defaults to `my`.
    pub account: Option<String>,
    /// Basic auth user name.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// HTTP signature key id, `/<account>/keys/<fingerprint>`.
    pub key_id: Option<String>,
    /// PEM encoded private key.
    pub key: Option<String>,
    /// Path to a PEM encoded private key. `~` is expanded.
    pub key_file: Option<String>,
    /// Delegate signing to the context's signing agent.
    pub use_agent: bool,
    /// What to do when the signing agent fails.
    pub agent_failure: AgentFailurePolicy,
    /// Disable the response cache.
    pub no_cache: bool,
    /// Maximum number of cached responses.
    pub cache_size: Option<u64>,
    /// Cache expiry in seconds.
    pub cache_expiry: Option<u64>,
    /// Value of the `X-Api-Version` header.
    pub api_version: Option<String>,
    /// Log level requested by the user; applied by whoever installs the logger.
    pub log_level: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("account", &self.account)
            .field("username", &self.username)
            .field("password", &Redact::from(&self.password))
            .field("key_id", &self.key_id)
            .field("key", &Redact::from(&self.key))
            .field("key_file", &self.key_file)
            .field("use_agent", &self.use_agent)
            .field("agent_failure", &self.agent_failure)
            .field("no_cache", &self.no_cache)
            .field("cache_size", &self.cache_size)
            .field("cache_expiry", &self.cache_expiry)
            .field("api_version", &self.api_version)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Fill every unset field from `SDC_*` environment variables.
    ///
    /// Values already present on `self` take precedence.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty()).cloned();

        self.url = self.url.or_else(|| get(SDC_URL));
        self.account = self.account.or_else(|| get(SDC_ACCOUNT));
        self.api_version = self.api_version.or_else(|| get(SDC_API_VERSION));
        self.log_level = self.log_level.or_else(|| get(SDC_LOG_LEVEL));

        // Only pick up an auth mode from the env if none was configured explicitly.
        if !self.has_basic_auth() && !self.has_signature_auth() {
            self.username = get(SDC_USER);
            self.password = get(SDC_PASSWORD);
            self.key_id = get(SDC_KEY_ID);
            self.key_file = get(SDC_KEY_FILE);
        }

        if !self.use_agent {
            self.use_agent = get(SDC_USE_AGENT).is_some_and(|v| parse_bool(&v));
        }
        if !self.no_cache {
            self.no_cache = get(SDC_NO_CACHE).is_some_and(|v| parse_bool(&v));
        }
        self.cache_size = self
            .cache_size
            .or_else(|| parse_number(SDC_CACHE_SIZE, get(SDC_CACHE_SIZE)));
        self.cache_expiry = self
            .cache_expiry
            .or_else(|| parse_number(SDC_CACHE_EXPIRY, get(SDC_CACHE_EXPIRY)));

        self
    }

    /// Check the config for programmer errors before any request is made.
    pub fn validate(&self) -> Result<()> {
        let url = self
            .url
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("url is required"))?;
        let uri = http::Uri::from_str(url).map_err(|e| {
            Error::config_invalid(format!("url {url} is invalid")).with_source(e)
        })?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::config_invalid(format!(
                "url {url} must include scheme and host"
            )));
        }

        match (self.has_basic_auth(), self.has_signature_auth()) {
            (true, true) => {
                return Err(Error::config_invalid(
                    "username/password and key_id/key are mutually exclusive",
                ))
            }
            (false, false) => {
                return Err(Error::config_invalid(
                    "either username/password or key_id/key is required",
                ))
            }
            (true, false) => {
                if self.username.as_deref().unwrap_or_default().is_empty()
                    || self.password.is_none()
                {
                    return Err(Error::config_invalid(
                        "username and password must be provided together",
                    ));
                }
            }
            (false, true) => {
                if self.key_id.as_deref().unwrap_or_default().is_empty() {
                    return Err(Error::config_invalid(
                        "key_id is required for signature auth",
                    ));
                }
                if self.key.is_some() && self.key_file.is_some() {
                    return Err(Error::config_invalid(
                        "key and key_file are mutually exclusive",
                    ));
                }
            }
        }

        if self.cache_size == Some(0) {
            return Err(Error::config_invalid("cache_size must be greater than 0"));
        }

        Ok(())
    }

    /// Whether basic auth fields are present.
    pub fn has_basic_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// Whether signature auth fields are present.
    pub fn has_signature_auth(&self) -> bool {
        self.key_id.is_some() || self.key.is_some() || self.key_file.is_some()
    }

    /// Account used when a call doesn't name one.
    pub fn account(&self) -> &str {
        self.account
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ACCOUNT)
    }

    /// Value of the `X-Api-Version` header.
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Maximum number of cached responses.
    pub fn cache_size(&self) -> u64 {
        self.cache_size.unwrap_or(DEFAULT_CACHE_SIZE)
    }

    /// Default cache expiry.
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry.unwrap_or(DEFAULT_CACHE_EXPIRY))
    }
}

pub(crate) fn parse_bool(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_number(key: &str, v: Option<String>) -> Option<u64> {
    let v = v?;
    match v.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("ignoring {key}={v}: not a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartdc_core::StaticEnv;
    use std::collections::HashMap;

    fn env_ctx(pairs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    fn signature_config() -> Config {
        Config {
            url: Some("https://cloudapi.example.com".to_string()),
            key_id: Some("/alice/keys/aa:bb".to_string()),
            key_file: Some("~/.ssh/id_rsa".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.account(), "my");
        assert_eq!(cfg.api_version(), DEFAULT_API_VERSION);
        assert_eq!(cfg.cache_size(), 1000);
        assert_eq!(cfg.cache_expiry(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_env_does_not_override_explicit_values() {
        let ctx = env_ctx(&[
            (SDC_URL, "https://env.example.com"),
            (SDC_ACCOUNT, "bob"),
            (SDC_KEY_ID, "/bob/keys/cc:dd"),
            (SDC_CACHE_EXPIRY, "5"),
            (SDC_CACHE_SIZE, "lots"),
            (SDC_NO_CACHE, "true"),
        ]);

        let cfg = signature_config().from_env(&ctx);
        assert_eq!(cfg.url.as_deref(), Some("https://cloudapi.example.com"));
        assert_eq!(cfg.key_id.as_deref(), Some("/alice/keys/aa:bb"));
        assert_eq!(cfg.account(), "bob");
        assert_eq!(cfg.cache_expiry(), Duration::from_secs(5));
        assert_eq!(cfg.cache_size(), DEFAULT_CACHE_SIZE);
        assert!(cfg.no_cache);
    }

    #[test]
    fn test_from_env_picks_basic_auth() {
        let ctx = env_ctx(&[
            (SDC_URL, "https://env.example.com"),
            (SDC_USER, "admin"),
            (SDC_PASSWORD, "secret"),
        ]);

        let cfg = Config::default().from_env(&ctx);
        assert!(cfg.has_basic_auth());
        assert!(!cfg.has_signature_auth());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_validate() {
        signature_config().validate().unwrap();

        let cases = vec![
            (
                Config {
                    url: None,
                    ..signature_config()
                },
                "url is required",
            ),
            (
                Config {
                    url: Some("/no/host".to_string()),
                    ..signature_config()
                },
                "url /no/host must include scheme and host",
            ),
            (
                Config {
                    username: Some("admin".to_string()),
                    password: Some("secret".to_string()),
                    ..signature_config()
                },
                "username/password and key_id/key are mutually exclusive",
            ),
            (
                Config {
                    url: Some("https://cloudapi.example.com".to_string()),
                    ..Default::default()
                },
                "either username/password or key_id/key is required",
            ),
            (
                Config {
                    url: Some("https://cloudapi.example.com".to_string()),
                    username: Some("admin".to_string()),
                    ..Default::default()
                },
                "username and password must be provided together",
            ),
            (
                Config {
                    key_id: None,
                    ..signature_config()
                },
                "key_id is required for signature auth",
            ),
            (
                Config {
                    cache_size: Some(0),
                    ..signature_config()
                },
                "cache_size must be greater than 0",
            ),
        ];

        for (cfg, expected) in cases {
            let err = cfg.validate().unwrap_err();
            assert!(err.is_argument_error());
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cfg = Config {
            password: Some("correct horse battery staple".to_string()),
            ..Default::default()
        };
        let out = format!("{cfg:?}");
        assert!(!out.contains("correct horse battery staple"));
    }
}
