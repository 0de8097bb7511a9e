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

//! Tokio-based SSH agent client for smartdc.
//!
//! `SshAgentSign` implements the `SignAgent` trait from `smartdc_core` by talking
//! to a running `ssh-agent` over its unix socket. The CloudAPI key id
//! (`/<account>/keys/<fingerprint>`) selects which agent identity signs; both the
//! legacy MD5 colon-hex and the `SHA256:` fingerprint forms are recognized.
//!
//! ## Example
//!
//! ```no_run
//! use smartdc_core::{Context, OsEnv};
//! use smartdc_sign_agent_tokio::SshAgentSign;
//!
//! # fn main() -> smartdc_core::Result<()> {
//! let agent = SshAgentSign::from_env(&Context::new().with_env(OsEnv))?;
//! let ctx = Context::new().with_env(OsEnv).with_sign_agent(agent);
//! # Ok(())
//! # }
//! ```

mod codec;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use smartdc_core::hash::{base64_encode, md5_fingerprint, sha256_fingerprint};
use smartdc_core::{AgentSignature, Context, Error, Result, SignAgent};
use std::path::PathBuf;

/// Environment variable holding the agent socket path.
pub const SSH_AUTH_SOCK: &str = "SSH_AUTH_SOCK";

/// Flag asking the agent for an `rsa-sha2-256` signature instead of `ssh-rsa`.
pub const SSH_AGENT_RSA_SHA2_256: u32 = 0x02;

/// Signs through an OpenSSH compatible agent.
#[derive(Debug, Clone)]
pub struct SshAgentSign {
    socket: PathBuf,
    flags: u32,
}

impl SshAgentSign {
    /// Connect to the agent listening on `socket`.
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            flags: 0,
        }
    }

    /// Use the socket advertised by `SSH_AUTH_SOCK`.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let socket = ctx
            .env_var(SSH_AUTH_SOCK)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("SSH_AUTH_SOCK is not set"))?;
        Ok(Self::new(socket))
    }

    /// Set the sign request flags, e.g. [`SSH_AGENT_RSA_SHA2_256`].
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    async fn find_identity(&self, fingerprint: &str) -> Result<codec::Identity> {
        let (kind, body) = self.roundtrip(codec::encode_request_identities()).await?;
        if kind != codec::SSH_AGENT_IDENTITIES_ANSWER {
            return Err(Error::unexpected(format!(
                "ssh agent answered identities request with message type {kind}"
            )));
        }

        let identities = codec::decode_identities(body)?;
        debug!("ssh agent holds {} identities", identities.len());

        identities
            .into_iter()
            .find(|id| fingerprint_matches(fingerprint, &id.key_blob))
            .ok_or_else(|| {
                Error::credential_invalid(format!("key {fingerprint} not found in ssh agent"))
            })
    }

    #[cfg(unix)]
    async fn roundtrip(&self, msg: Bytes) -> Result<(u8, Bytes)> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::UnixStream;

        let mut stream = UnixStream::connect(&self.socket).await.map_err(|e| {
            Error::unexpected(format!(
                "failed to connect to ssh agent at {}",
                self.socket.display()
            ))
            .with_source(e)
        })?;
        stream.write_all(&msg).await?;

        let len = stream.read_u32().await? as usize;
        if len == 0 || len > codec::MAX_MESSAGE_LEN {
            return Err(Error::unexpected(format!(
                "ssh agent sent invalid message length {len}"
            )));
        }
        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await?;

        let mut body = Bytes::from(buf);
        let kind = body.split_to(1)[0];
        Ok((kind, body))
    }

    #[cfg(not(unix))]
    async fn roundtrip(&self, _msg: Bytes) -> Result<(u8, Bytes)> {
        Err(Error::unexpected(
            "ssh agent sockets are only supported on unix",
        ))
    }
}

#[async_trait]
impl SignAgent for SshAgentSign {
    async fn sign(&self, key_id: &str, data: &[u8]) -> Result<AgentSignature> {
        let fingerprint = key_fingerprint(key_id);
        let identity = self.find_identity(fingerprint).await?;
        debug!(
            "signing with ssh agent identity {} ({}, {})",
            fingerprint,
            codec::key_type(&identity.key_blob)?,
            identity.comment
        );

        let msg = codec::encode_sign_request(&identity.key_blob, data, self.flags);
        let (kind, body) = self.roundtrip(msg).await?;
        match kind {
            codec::SSH_AGENT_SIGN_RESPONSE => {}
            codec::SSH_AGENT_FAILURE => {
                return Err(Error::unexpected("ssh agent refused to sign"));
            }
            other => {
                return Err(Error::unexpected(format!(
                    "ssh agent answered sign request with message type {other}"
                )));
            }
        }

        let (format, signature) = codec::decode_sign_response(body)?;
        let algorithm = codec::http_algorithm(&format).ok_or_else(|| {
            Error::unexpected(format!("unsupported ssh signature format {format}"))
        })?;

        Ok(AgentSignature {
            signature: base64_encode(&signature),
            algorithm: algorithm.to_string(),
        })
    }
}

/// The fingerprint is the last segment of `/<account>/keys/<fingerprint>`.
fn key_fingerprint(key_id: &str) -> &str {
    key_id.rsplit('/').next().unwrap_or(key_id)
}

fn fingerprint_matches(fingerprint: &str, key_blob: &[u8]) -> bool {
    if fingerprint.starts_with("SHA256:") {
        return sha256_fingerprint(key_blob) == fingerprint;
    }
    let fingerprint = fingerprint.strip_prefix("MD5:").unwrap_or(fingerprint);
    md5_fingerprint(key_blob).eq_ignore_ascii_case(fingerprint)
}
