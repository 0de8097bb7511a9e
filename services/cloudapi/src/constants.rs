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

/// Environment variables understood by [`Config::from_env`](crate::Config::from_env).
pub const SDC_URL: &str = "SDC_URL";
pub const SDC_ACCOUNT: &str = "SDC_ACCOUNT";
pub const SDC_KEY_ID: &str = "SDC_KEY_ID";
pub const SDC_KEY_FILE: &str = "SDC_KEY_FILE";
pub const SDC_USER: &str = "SDC_USER";
pub const SDC_PASSWORD: &str = "SDC_PASSWORD";
pub const SDC_API_VERSION: &str = "SDC_API_VERSION";
pub const SDC_NO_CACHE: &str = "SDC_NO_CACHE";
pub const SDC_CACHE_SIZE: &str = "SDC_CACHE_SIZE";
pub const SDC_CACHE_EXPIRY: &str = "SDC_CACHE_EXPIRY";
pub const SDC_USE_AGENT: &str = "SDC_USE_AGENT";
pub const SDC_LOG_LEVEL: &str = "SDC_LOG_LEVEL";

/// Account placeholder meaning "the account that owns the credentials".
pub const DEFAULT_ACCOUNT: &str = "my";
/// API version requested when none is configured.
pub const DEFAULT_API_VERSION: &str = "~7.0";
/// Identity file used when only a key id is configured.
pub const DEFAULT_KEY_FILE: &str = "~/.ssh/id_rsa";
/// Maximum number of cached responses.
pub const DEFAULT_CACHE_SIZE: u64 = 1000;
/// Cache expiry in seconds.
pub const DEFAULT_CACHE_EXPIRY: u64 = 60;

// Headers
pub const X_API_VERSION: &str = "x-api-version";
pub const X_RESOURCE_COUNT: &str = "x-resource-count";
pub const X_QUERY_LIMIT: &str = "x-query-limit";

pub const APPLICATION_JSON: &str = "application/json";
