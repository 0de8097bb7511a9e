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

use crate::{Credential, PrivateKey};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, DATE};
use http::request::Parts;
use http::HeaderValue;
use log::{debug, warn};
use smartdc_core::hash::base64_encode;
use smartdc_core::{Context, Error, Result, SignRequest};

/// What to do when a delegated signing agent fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgentFailurePolicy {
    /// Log a warning and send the request without an `Authorization` header.
    #[default]
    Unsigned,
    /// Sign with the local key if the credential carries one.
    FallbackToKey,
    /// Fail the request.
    Fail,
}

/// RequestSigner attaches CloudAPI authentication to a request.
///
/// - Basic credentials produce `Authorization: Basic <base64(user:password)>`.
/// - Signature credentials sign the exact value of the `Date` header:
///   `Authorization: Signature keyId="<key_id>",algorithm="<alg>" <base64 signature>`.
///
/// The `Date` header must be set before signing. Local keys sign without awaiting
/// anything; an agent is only consulted when one was enabled with [`RequestSigner::with_agent`].
#[derive(Debug, Default)]
pub struct RequestSigner {
    agent: Option<AgentFailurePolicy>,
}

impl RequestSigner {
    /// Create a signer that only uses local keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delegate signature credentials to the context's signing agent.
    pub fn with_agent(mut self, policy: AgentFailurePolicy) -> Self {
        self.agent = Some(policy);
        self
    }

    fn local_signature(key_id: &str, key: &PrivateKey, date: &str) -> Result<String> {
        let signature = key.sign(date.as_bytes())?;
        Ok(signature_header(
            key_id,
            key.algorithm().as_str(),
            &base64_encode(&signature),
        ))
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid("no credential available"));
        };

        let value = match cred {
            Credential::Basic { username, password } => {
                format!(
                    "Basic {}",
                    base64_encode(format!("{username}:{password}").as_bytes())
                )
            }
            Credential::Signature { key_id, key } => {
                let date = req
                    .headers
                    .get(DATE)
                    .ok_or_else(|| Error::request_invalid("date header is required for signing"))?
                    .to_str()?
                    .to_string();
                debug!("string to sign: {date}");

                match (self.agent, key) {
                    (None, Some(key)) => Self::local_signature(key_id, key, &date)?,
                    (None, None) => {
                        return Err(Error::credential_invalid(format!(
                            "no private key loaded for {key_id}"
                        )))
                    }
                    (Some(policy), key) => match ctx.agent_sign(key_id, date.as_bytes()).await {
                        Ok(sig) => signature_header(key_id, &sig.algorithm, &sig.signature),
                        Err(err) => match (policy, key) {
                            (AgentFailurePolicy::Fail, _) => return Err(err),
                            (AgentFailurePolicy::FallbackToKey, Some(key)) => {
                                warn!("signing agent failed, using local key: {err}");
                                Self::local_signature(key_id, key, &date)?
                            }
                            _ => {
                                warn!("signing agent failed, sending request unsigned: {err}");
                                return Ok(());
                            }
                        },
                    },
                }
            }
        };

        let mut value = HeaderValue::from_str(&value)?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

fn signature_header(key_id: &str, algorithm: &str, signature: &str) -> String {
    format!("Signature keyId=\"{key_id}\",algorithm=\"{algorithm}\" {signature}")
}
