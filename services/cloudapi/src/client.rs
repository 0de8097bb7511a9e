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
use crate::error::{normalize, ApiError, Result, TransportError};
use crate::{
    encode_path, ApiRequest, Config, Credential, DefaultCredentialProvider, Fetched,
    RequestOptions, RequestSigner, ResponseCache,
};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, DATE};
use http::{HeaderMap, HeaderValue, Method, Response};
use log::debug;
use serde_json::Value;
use smartdc_core::time::{format_http_date, now};
use smartdc_core::{Context, Error, ProvideCredential, Signer};
use std::sync::Arc;

/// Result of a count request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCount {
    /// Total number of matching resources, from `x-resource-count`.
    pub count: u64,
    /// Whether the page at the request offset is the last one.
    pub done: bool,
}

/// CloudAPI client.
///
/// Every resource method goes through the same steps: build and sign a request,
/// consult the cache for reads, send it over the context's transport, and
/// normalize failures.
///
/// Cloning is cheap and clones share the response cache.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    base_url: String,
    account: String,
    api_version: HeaderValue,
    signer: Signer<Credential>,
    cache: Arc<ResponseCache>,
}

impl Client {
    /// Create a client from a config.
    ///
    /// Fails with an argument error if the config is incomplete or inconsistent.
    /// No I/O happens here: key material is loaded on first use.
    pub fn new(ctx: Context, config: Config) -> smartdc_core::Result<Self> {
        Self::with_credential_provider(ctx, config.clone(), DefaultCredentialProvider::new(config))
    }

    /// Create a client that loads its credential from `provider` instead of the config.
    pub fn with_credential_provider(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> smartdc_core::Result<Self> {
        config.validate()?;

        let mut builder = RequestSigner::new();
        if config.use_agent {
            builder = builder.with_agent(config.agent_failure);
        }
        let signer = Signer::new(ctx.clone(), provider, builder);

        let cache = if config.no_cache {
            ResponseCache::disabled()
        } else {
            ResponseCache::new(config.cache_size(), config.cache_expiry())
        };

        let api_version = HeaderValue::from_str(config.api_version()).map_err(|e| {
            Error::config_invalid(format!("api version {} is invalid", config.api_version()))
                .with_source(e)
        })?;

        Ok(Self {
            ctx,
            base_url: config
                .url
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            account: config.account().to_string(),
            api_version,
            signer,
            cache: Arc::new(cache),
        })
    }

    /// Default account.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Build and sign a request for the logical `path`.
    pub async fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: &RequestOptions,
    ) -> Result<ApiRequest> {
        let path = encode_path(path)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            DATE,
            HeaderValue::from_str(&format_http_date(now())).map_err(Error::from)?,
        );
        headers.insert(X_API_VERSION, self.api_version.clone());
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }

        let mut req = ApiRequest {
            method,
            path,
            headers,
            body,
            query: opts.query.clone(),
            cache_ttl: opts.cache_ttl,
            expect: opts.expect,
        };

        let (mut parts, ()) = http::Request::builder()
            .method(req.method.clone())
            .uri(req.path_and_query())
            .body(())
            .map_err(Error::from)?
            .into_parts();
        parts.headers = std::mem::take(&mut req.headers);
        self.signer.sign(&mut parts).await?;
        req.headers = parts.headers;

        Ok(req)
    }

    /// Read through the cache.
    ///
    /// With `no_cache` the lookup is skipped but a successful response is still
    /// stored. A cached deletion is returned as [`Fetched::Deleted`].
    ///
    /// Values are keyed on path and query. Deletions are keyed on the path alone,
    /// so a deleted path shadows every query on it until a fresh read replaces it.
    pub async fn get(&self, req: &ApiRequest, no_cache: bool) -> Result<Fetched> {
        let key = req.cache_key();
        if !no_cache {
            if let Some(hit) = self.cache.get(&key, req.cache_ttl) {
                debug!("cache hit for {key}");
                return Ok(hit);
            }
            if key != req.path {
                if let Some(Fetched::Deleted) = self.cache.get(&req.path, req.cache_ttl) {
                    debug!("{} was deleted", req.path);
                    return Ok(Fetched::Deleted);
                }
            }
        }

        let value = self.dispatch(req).await?;
        self.cache.put(&key, Fetched::Value(value.clone()));
        Ok(Fetched::Value(value))
    }

    /// Send a create or action request. The cache is not touched.
    pub async fn post(&self, req: &ApiRequest) -> Result<Value> {
        self.dispatch(req).await
    }

    /// Send a replace request. The cache is not touched.
    pub async fn put(&self, req: &ApiRequest) -> Result<Value> {
        self.dispatch(req).await
    }

    /// Send a delete request and remember the deletion on success.
    ///
    /// The response body is ignored.
    pub async fn delete(&self, req: &ApiRequest) -> Result<()> {
        self.send(req).await.map_err(normalize)?;
        self.cache.put(&req.path, Fetched::Deleted);
        Ok(())
    }

    /// Send a count request.
    ///
    /// `done` is true when `x-resource-count` does not exceed the request offset
    /// plus `x-query-limit`, or when the service sent no limit.
    pub async fn head(&self, req: &ApiRequest) -> Result<ResourceCount> {
        let resp = self.send(req).await.map_err(normalize)?;

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };
        let count = header(X_RESOURCE_COUNT).unwrap_or(0);
        let done = match header(X_QUERY_LIMIT) {
            Some(limit) => count <= req.offset().saturating_add(limit),
            None => true,
        };

        Ok(ResourceCount { count, done })
    }

    /// GET `path` and decode the body, failing with [`ApiError::Deleted`] for a
    /// cached deletion.
    pub async fn get_json(&self, path: &str, opts: &RequestOptions) -> Result<Value> {
        let req = self.build_request(Method::GET, path, None, opts).await?;
        match self.get(&req, opts.no_cache).await? {
            Fetched::Value(v) => Ok(v),
            Fetched::Deleted => Err(ApiError::Deleted { path: req.path }),
        }
    }

    /// POST `body` to `path`.
    pub async fn post_json(
        &self,
        path: &str,
        body: Option<Value>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let req = self.build_request(Method::POST, path, body, opts).await?;
        self.post(&req).await
    }

    /// PUT `body` to `path`.
    pub async fn put_json(&self, path: &str, body: Value, opts: &RequestOptions) -> Result<Value> {
        let req = self.build_request(Method::PUT, path, Some(body), opts).await?;
        self.put(&req).await
    }

    /// DELETE `path`.
    pub async fn delete_path(&self, path: &str, opts: &RequestOptions) -> Result<()> {
        let req = self.build_request(Method::DELETE, path, None, opts).await?;
        self.delete(&req).await
    }

    /// HEAD `path` for its resource count.
    pub async fn head_count(&self, path: &str, opts: &RequestOptions) -> Result<ResourceCount> {
        let req = self.build_request(Method::HEAD, path, None, opts).await?;
        self.head(&req).await
    }

    async fn dispatch(&self, req: &ApiRequest) -> Result<Value> {
        let resp = self.send(req).await.map_err(normalize)?;
        decode(resp).map_err(ApiError::Transport)
    }

    async fn send(&self, req: &ApiRequest) -> std::result::Result<Response<Bytes>, TransportError> {
        let uri = format!("{}{}", self.base_url, req.path_and_query());
        debug!("{} {}", req.method, uri);

        let body = match &req.body {
            Some(v) => Bytes::from(serde_json::to_vec(v).map_err(|e| {
                TransportError::from_source(
                    "failed to encode request body",
                    Error::request_invalid("body is not valid json").with_source(e),
                )
            })?),
            None => Bytes::new(),
        };

        let mut http_req = http::Request::builder()
            .method(req.method.clone())
            .uri(&uri)
            .body(body)
            .map_err(|e| TransportError::from_source("failed to build request", e.into()))?;
        *http_req.headers_mut() = req.headers.clone();

        let resp = self
            .ctx
            .http_send(http_req)
            .await
            .map_err(|e| TransportError::from_source(format!("{} {uri} failed", req.method), e))?;

        let status = resp.status();
        debug!("{} {uri} returned {status}", req.method);
        if !req.is_expected(status) {
            return Err(TransportError::from_response(status, resp.body()));
        }
        Ok(resp)
    }
}

fn decode(resp: Response<Bytes>) -> std::result::Result<Value, TransportError> {
    let status = resp.status();
    let body = resp.into_body();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|e| {
        let mut err = TransportError::from_source(
            "failed to decode response body",
            Error::unexpected("response body is not valid json").with_source(e),
        );
        err.status = Some(status);
        err
    })
}
