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

//! Encoding and key fingerprint utils.

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::prelude::BASE64_STANDARD_NO_PAD;
use base64::Engine;
use md5::Md5;
use sha2::Digest;
use sha2::Sha256;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Legacy OpenSSH fingerprint of a public key blob: colon separated hex MD5.
///
/// ```shell
/// 3b:2c:...:9f
/// ```
pub fn md5_fingerprint(key_blob: &[u8]) -> String {
    let digest = Md5::digest(key_blob);
    let mut s = String::with_capacity(digest.len() * 3);
    for (idx, b) in digest.iter().enumerate() {
        if idx != 0 {
            s.push(':');
        }
        s.push_str(&hex::encode([*b]));
    }
    s
}

/// Modern OpenSSH fingerprint of a public key blob: `SHA256:` followed by unpadded base64.
pub fn sha256_fingerprint(key_blob: &[u8]) -> String {
    format!(
        "SHA256:{}",
        BASE64_STANDARD_NO_PAD.encode(Sha256::digest(key_blob))
    )
}
