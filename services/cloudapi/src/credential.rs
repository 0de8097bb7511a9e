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

use crate::PrivateKey;
use smartdc_core::utils::Redact;
use smartdc_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential used to authenticate CloudAPI requests.
#[derive(Clone)]
pub enum Credential {
    /// HTTP basic auth.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// HTTP signature auth.
    Signature {
        /// Key id, `/<account>/keys/<fingerprint>`.
        key_id: String,
        /// Local private key. `None` when signing is delegated to an agent.
        key: Option<PrivateKey>,
    },
}

impl Credential {
    /// Build a basic auth credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build a signature credential.
    pub fn signature(key_id: impl Into<String>, key: Option<PrivateKey>) -> Self {
        Self::Signature {
            key_id: key_id.into(),
            key,
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &Redact::from(password))
                .finish(),
            Credential::Signature { key_id, key } => f
                .debug_struct("Signature")
                .field("key_id", key_id)
                .field("key", &key.as_ref().map(|k| k.algorithm()))
                .finish(),
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::Basic { username, .. } => !username.is_empty(),
            Credential::Signature { key_id, .. } => !key_id.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(Credential::basic("admin", "secret").is_valid());
        assert!(!Credential::basic("", "secret").is_valid());
        assert!(Credential::signature("/alice/keys/aa:bb", None).is_valid());
        assert!(!Credential::signature("", None).is_valid());
    }

    #[test]
    fn test_debug_hides_password() {
        let out = format!("{:?}", Credential::basic("admin", "hunter2-hunter2"));
        assert!(out.contains("admin"));
        assert!(!out.contains("hunter2-hunter2"));
    }
}
