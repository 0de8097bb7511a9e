use log::{debug, warn};
use smartdc_cloudapi::{Client, Config, RequestOptions};
use smartdc_core::{Context, OsEnv};
use smartdc_file_read_tokio::TokioFileRead;
use smartdc_http_send_reqwest::ReqwestHttpSend;
use std::env;

fn init_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SMARTDC_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);

    Some(Client::new(ctx, config).expect("SDC_* env must describe a valid client"))
}

#[tokio::test]
async fn test_get_account() -> anyhow::Result<()> {
    let Some(client) = init_client() else {
        warn!("SMARTDC_TEST is not set, skipped");
        return Ok(());
    };

    let account = client.get_account(&RequestOptions::default()).await?;
    debug!("account: {account}");
    assert!(account.get("login").is_some());
    Ok(())
}

#[tokio::test]
async fn test_list_and_count_machines() -> anyhow::Result<()> {
    let Some(client) = init_client() else {
        warn!("SMARTDC_TEST is not set, skipped");
        return Ok(());
    };

    let opts = RequestOptions::default().with_query("limit", 1);
    let machines = client.list_machines(&opts).await?;
    let count = client.count_machines(&opts).await?;
    debug!("machines: {machines}, count: {count:?}");

    assert!(machines.is_array());
    assert!(machines.as_array().map_or(0, Vec::len) as u64 <= count.count.max(1));
    Ok(())
}

#[tokio::test]
async fn test_missing_machine_is_not_found() -> anyhow::Result<()> {
    let Some(client) = init_client() else {
        warn!("SMARTDC_TEST is not set, skipped");
        return Ok(());
    };

    let err = client
        .get_machine(
            "00000000-0000-0000-0000-000000000000",
            &RequestOptions::default(),
        )
        .await
        .expect_err("machine must not exist");
    debug!("error: {err:?}");
    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    Ok(())
}
