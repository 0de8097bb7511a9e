//! Dispatcher behavior against a recording in-memory transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, DATE};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::sha2::Sha256;
use rsa::signature::Verifier;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use smartdc_cloudapi::{
    ApiError, Client, Config, Fetched, MachineAction, RequestOptions, ResourceCount,
};
use smartdc_core::hash::base64_decode;
use smartdc_core::{Context, Error, HttpSend, Result, StaticEnv};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<http::Request<Bytes>>,
    responses: VecDeque<http::Response<Bytes>>,
}

/// Transport that records every request and replays queued responses.
#[derive(Debug, Clone, Default)]
struct MockTransport(Arc<Mutex<MockState>>);

impl MockTransport {
    fn push(&self, status: u16, headers: &[(&str, &str)], body: &str) {
        let mut resp = http::Response::builder().status(status);
        for (k, v) in headers {
            resp = resp.header(*k, *v);
        }
        let resp = resp.body(Bytes::from(body.to_string())).unwrap();
        self.0.lock().unwrap().responses.push_back(resp);
    }

    fn push_json(&self, status: u16, body: Value) {
        self.push(status, &[("content-type", "application/json")], &body.to_string());
    }

    fn calls(&self) -> usize {
        self.0.lock().unwrap().requests.len()
    }

    fn last_request(&self) -> http::Request<Bytes> {
        let state = self.0.lock().unwrap();
        let req = state.requests.last().expect("no request sent");
        let mut copy = http::Request::builder()
            .method(req.method().clone())
            .uri(req.uri().clone())
            .body(req.body().clone())
            .unwrap();
        *copy.headers_mut() = req.headers().clone();
        copy
    }
}

#[async_trait]
impl HttpSend for MockTransport {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.0.lock().unwrap();
        state.requests.push(req);
        state
            .responses
            .pop_front()
            .ok_or_else(|| Error::unexpected("no response queued"))
    }
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn basic_config() -> Config {
    Config {
        url: Some("https://cloudapi.example.com".to_string()),
        account: Some("acct".to_string()),
        username: Some("admin".to_string()),
        password: Some("secret".to_string()),
        ..Default::default()
    }
}

fn client(config: Config) -> (Client, MockTransport) {
    init();
    let transport = MockTransport::default();
    let ctx = Context::new().with_http_send(transport.clone());
    (Client::new(ctx, config).unwrap(), transport)
}

fn default_opts() -> RequestOptions {
    RequestOptions::default()
}

#[tokio::test]
async fn test_get_writes_through_and_hits_cache() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push_json(200, json!({"id": "m1", "state": "running"}));

    let first = client.get_machine("m1", &default_opts()).await?;
    let second = client.get_machine("m1", &default_opts()).await?;

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);

    let req = transport.last_request();
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        "https://cloudapi.example.com/acct/machines/m1"
    );
    assert_eq!(req.headers()[AUTHORIZATION], "Basic YWRtaW46c2VjcmV0");
    assert_eq!(req.headers()["x-api-version"], "~7.0");
    Ok(())
}

#[tokio::test]
async fn test_no_cache_bypasses_lookup_but_writes_through() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push_json(200, json!({"v": 1}));
    transport.push_json(200, json!({"v": 2}));

    assert_eq!(client.get_package("p", &default_opts()).await?, json!({"v": 1}));

    let fresh = client
        .get_package("p", &default_opts().with_no_cache())
        .await?;
    assert_eq!(fresh, json!({"v": 2}));
    assert_eq!(transport.calls(), 2);

    // The bypassing read refreshed the entry.
    assert_eq!(client.get_package("p", &default_opts()).await?, json!({"v": 2}));
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_delete_leaves_tombstone() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push(204, &[], "");

    client.delete_machine("m1", &default_opts()).await?;
    assert_eq!(transport.last_request().method(), Method::DELETE);

    let req = client
        .build_request(Method::GET, "/acct/machines/m1", None, &default_opts())
        .await?;
    assert_eq!(client.get(&req, false).await?, Fetched::Deleted);
    assert_eq!(transport.calls(), 1);

    let err = client.get_machine("m1", &default_opts()).await.unwrap_err();
    assert!(matches!(err, ApiError::Deleted { ref path } if path == "/acct/machines/m1"));
    assert!(err.is_gone());

    // A value hit and a miss look different from the tombstone.
    transport.push_json(200, json!({"id": "m2"}));
    let req = client
        .build_request(Method::GET, "/acct/machines/m2", None, &default_opts())
        .await?;
    assert_eq!(
        client.get(&req, false).await?,
        Fetched::Value(json!({"id": "m2"}))
    );
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_delete_ignores_response_body() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push(200, &[("content-type", "text/plain")], "deleted");

    client.delete_image("img-1", &default_opts()).await?;

    let err = client.get_image("img-1", &default_opts()).await.unwrap_err();
    assert!(err.is_gone());
    assert_eq!(transport.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_tombstone_shadows_queries_on_path() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push(204, &[], "");
    client.delete_machine("m1", &default_opts()).await?;

    let opts = default_opts().with_query("credentials", true);
    let err = client.get_machine("m1", &opts).await.unwrap_err();
    assert!(err.is_gone());
    assert_eq!(transport.calls(), 1);

    // Bypassing the cache reaches the service and refreshes the query entry.
    transport.push_json(200, json!({"id": "m1"}));
    let fresh = client
        .get_machine("m1", &opts.clone().with_no_cache())
        .await?;
    assert_eq!(fresh, json!({"id": "m1"}));
    assert_eq!(client.get_machine("m1", &opts).await?, json!({"id": "m1"}));
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_key_never_switches_auth_mode() {
    init();
    let transport = MockTransport::default();
    let ctx = Context::new()
        .with_http_send(transport.clone())
        .with_env(StaticEnv {
            home_dir: None,
            envs: [
                ("SDC_USER".to_string(), "intruder".to_string()),
                ("SDC_PASSWORD".to_string(), "pw".to_string()),
            ]
            .into(),
        });
    let config = Config {
        url: Some("https://cloudapi.example.com".to_string()),
        key_id: Some("/acct/keys/aa:bb".to_string()),
        key_file: Some("/definitely/not/here".to_string()),
        ..Default::default()
    }
    .from_env(&ctx);
    let client = Client::new(ctx, config).unwrap();

    let err = client.list_keys(&default_opts()).await.unwrap_err();
    assert!(err.to_string().contains("failed to read private key"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_failed_delete_keeps_cache() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push_json(200, json!({"id": "m1"}));
    transport.push_json(409, json!({"code": "InvalidState", "message": "busy"}));

    client.get_machine("m1", &default_opts()).await?;
    let err = client.delete_machine("m1", &default_opts()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.code(), Some("InvalidState"));

    assert_eq!(client.get_machine("m1", &default_opts()).await?, json!({"id": "m1"}));
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_server_errors_are_normalized() {
    let (client, transport) = client(basic_config());
    transport.push(
        500,
        &[],
        r#"{"code":"InvalidArgument","message":"bad thing"}"#,
    );
    transport.push(
        404,
        &[],
        r#"{"code":"ResourceNotFound","message":"no such machine"}"#,
    );

    let err = client.get_machine("m1", &default_opts()).await.unwrap_err();
    match err {
        ApiError::Service(e) => {
            assert_eq!(e.code, "InvalidArgument");
            assert_eq!(e.message, "bad thing");
        }
        other => panic!("expected service error, got {other:?}"),
    }

    let err = client.get_machine("m1", &default_opts()).await.unwrap_err();
    match err {
        ApiError::Transport(e) => {
            assert_eq!(e.status, Some(StatusCode::NOT_FOUND));
            let details = e.details.expect("details must be kept");
            assert_eq!(
                details.body.as_deref(),
                Some(r#"{"code":"ResourceNotFound","message":"no such machine"}"#)
            );
        }
        other => panic!("expected transport error, got {other:?}"),
    }

    // Errors are never cached.
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_network_failure_is_transport_error() {
    let (client, transport) = client(basic_config());

    let err = client.list_networks(&default_opts()).await.unwrap_err();
    match err {
        ApiError::Transport(e) => assert_eq!(e.status, None),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_count_and_done_flag() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    let limit = [("x-query-limit", "100")];

    transport.push(200, &[("x-resource-count", "150"), limit[0]], "");
    transport.push(200, &[("x-resource-count", "50"), limit[0]], "");
    transport.push(200, &[("x-resource-count", "150"), limit[0]], "");
    transport.push(200, &[("x-resource-count", "7")], "");

    let count = client.count_machines(&default_opts()).await?;
    assert_eq!(count, ResourceCount { count: 150, done: false });
    assert_eq!(transport.last_request().method(), Method::HEAD);

    let count = client.count_machines(&default_opts()).await?;
    assert_eq!(count, ResourceCount { count: 50, done: true });

    let count = client
        .count_machines(&default_opts().with_query("offset", 100))
        .await?;
    assert_eq!(count, ResourceCount { count: 150, done: true });
    assert_eq!(
        transport.last_request().uri().query(),
        Some("offset=100")
    );

    let count = client.count_machines(&default_opts()).await?;
    assert_eq!(count, ResourceCount { count: 7, done: true });
    Ok(())
}

#[tokio::test]
async fn test_list_machines_is_never_cached() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());
    transport.push_json(200, json!([{"id": "m1"}]));
    transport.push_json(200, json!([{"id": "m1"}, {"id": "m2"}]));

    client.list_machines(&default_opts()).await?;
    let second = client.list_machines(&default_opts()).await?;

    assert_eq!(second.as_array().map(Vec::len), Some(2));
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_paths_and_actions() -> anyhow::Result<()> {
    let (client, transport) = client(basic_config());

    transport.push_json(200, json!([]));
    client
        .list_fabric_networks(5, &default_opts().with_account("other"))
        .await?;
    assert_eq!(
        transport.last_request().uri().path(),
        "/other/fabrics/default/vlans/5/networks"
    );

    transport.push(202, &[], "");
    client
        .machine_action(json!({"id": "m1"}), MachineAction::Start, &default_opts())
        .await?;
    let req = transport.last_request();
    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.uri().path(), "/acct/machines/m1");
    assert_eq!(req.uri().query(), Some("action=start"));

    // Actions expect 202.
    transport.push(200, &[], "");
    let err = client
        .machine_action("m1", MachineAction::Stop, &default_opts())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::OK));

    transport.push_json(200, json!({"role": "web"}));
    client
        .get_machine_tag("m1", "role/name", &default_opts())
        .await?;
    assert_eq!(
        transport.last_request().uri().path(),
        "/acct/machines/m1/tags/role%2Fname"
    );

    transport.push_json(201, json!({"name": "laptop"}));
    client
        .create_key(
            &smartdc_cloudapi::CreateKey {
                name: Some("laptop".to_string()),
                key: "ssh-rsa AAAA".to_string(),
            },
            &default_opts(),
        )
        .await?;
    let req = transport.last_request();
    assert_eq!(req.headers()["content-type"], "application/json");
    let body: Value = serde_json::from_slice(req.body())?;
    assert_eq!(body, json!({"name": "laptop", "key": "ssh-rsa AAAA"}));
    Ok(())
}

#[tokio::test]
async fn test_local_signature_verifies() -> anyhow::Result<()> {
    let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024)?;
    let verifier = VerifyingKey::<Sha256>::new(key.to_public_key());
    let pem = key.to_pkcs8_pem(LineEnding::LF)?.to_string();

    let (client, transport) = client(Config {
        url: Some("https://cloudapi.example.com".to_string()),
        key_id: Some("/acct/keys/aa:bb".to_string()),
        key: Some(pem),
        ..Default::default()
    });

    for _ in 0..2 {
        transport.push_json(200, json!({}));
        client.get_account(&default_opts().with_no_cache()).await?;

        let req = transport.last_request();
        let date = req.headers()[DATE].to_str()?.to_string();
        let auth = req.headers()[AUTHORIZATION].to_str()?.to_string();

        let (prefix, sig) = auth.rsplit_once(' ').expect("signature must be present");
        assert_eq!(
            prefix,
            "Signature keyId=\"/acct/keys/aa:bb\",algorithm=\"rsa-sha256\""
        );
        let sig = Signature::try_from(base64_decode(sig)?.as_slice())?;
        verifier.verify(date.as_bytes(), &sig)?;
    }
    Ok(())
}

#[tokio::test]
async fn test_agent_failure_sends_unsigned_request() -> anyhow::Result<()> {
    // No signing agent configured: every agent call fails.
    let (client, transport) = client(Config {
        url: Some("https://cloudapi.example.com".to_string()),
        key_id: Some("/acct/keys/aa:bb".to_string()),
        use_agent: true,
        ..Default::default()
    });
    transport.push(401, &[], r#"{"code":"InvalidCredentials","message":"no auth"}"#);

    let err = client.list_keys(&default_opts()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let req = transport.last_request();
    assert!(req.headers().get(AUTHORIZATION).is_none());
    assert!(req.headers().contains_key(DATE));
    Ok(())
}
