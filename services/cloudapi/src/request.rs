use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Per-call options shared by every resource method.
///
/// ```
/// use smartdc_cloudapi::RequestOptions;
/// use std::time::Duration;
///
/// let opts = RequestOptions::default()
///     .with_account("alice")
///     .with_cache_ttl(Duration::from_secs(5))
///     .with_query("limit", "100");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Account to act on. The client's default account is used when unset.
    pub account: Option<String>,
    /// Skip the cache lookup. Successful reads are still written through.
    pub no_cache: bool,
    /// Override the client's cache expiry for this call.
    pub cache_ttl: Option<Duration>,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Success status other than any 2xx.
    pub expect: Option<StatusCode>,
}

impl RequestOptions {
    /// Act on `account`.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Skip the cache lookup.
    pub fn with_no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Override cache expiry.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Require `status` on success.
    pub fn with_expect(mut self, status: StatusCode) -> Self {
        self.expect = Some(status);
        self
    }
}

/// A fully built, signed request waiting to be dispatched.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Encoded URI path, without query.
    pub path: String,
    /// Headers, `Date` and `X-Api-Version` always present.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Cache expiry override.
    pub cache_ttl: Option<Duration>,
    /// Expected success status.
    pub expect: Option<StatusCode>,
}

impl ApiRequest {
    /// Path plus encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    /// Key of this request in the response cache.
    ///
    /// The query is part of the key so that filtered reads never alias each other.
    pub fn cache_key(&self) -> String {
        self.path_and_query()
    }

    /// Pagination offset requested through the `offset` query parameter.
    pub fn offset(&self) -> u64 {
        self.query
            .iter()
            .find(|(k, _)| k == "offset")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0)
    }

    /// Whether `status` counts as success for this request.
    pub fn is_expected(&self, status: StatusCode) -> bool {
        match self.expect {
            Some(expect) => status == expect,
            None => status.is_success(),
        }
    }
}
