//! CloudAPI client.
//!
//! Every call is signed with an HTTP signature over the `Date` header (RSA or DSA
//! keys, optionally delegated to an SSH agent) or authenticated with basic auth,
//! sent through the context's [`HttpSend`](smartdc_core::HttpSend), optionally
//! served from a bounded expiring cache, and has server errors normalized.
//!
//! ## Example
//!
//! ```no_run
//! use smartdc_cloudapi::{Client, Config, RequestOptions};
//! use smartdc_core::{Context, OsEnv};
//! use smartdc_file_read_tokio::TokioFileRead;
//! use smartdc_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//! let config = Config::default().from_env(&ctx);
//! let client = Client::new(ctx, config)?;
//!
//! let machines = client.list_machines(&RequestOptions::default()).await?;
//! println!("{machines}");
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    DEFAULT_ACCOUNT, DEFAULT_API_VERSION, DEFAULT_CACHE_EXPIRY, DEFAULT_CACHE_SIZE,
    X_QUERY_LIMIT, X_RESOURCE_COUNT,
};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod key;
pub use key::{Algorithm, PrivateKey};

mod sign_request;
pub use sign_request::{AgentFailurePolicy, RequestSigner};

mod provide_credential;
pub use provide_credential::*;

mod path;
pub use path::{encode_path, escape_segment};

mod cache;
pub use cache::{Fetched, ResponseCache};

mod error;
pub use error::{normalize, ApiError, ErrorDetails, Result, ServiceError, TransportError};

mod request;
pub use request::{ApiRequest, RequestOptions};

mod client;
pub use client::{Client, ResourceCount};

mod resources;
pub use resources::*;
