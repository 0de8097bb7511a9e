//! # sdc
//!
//! Command line client for CloudAPI.
//!
//! Connection settings come from flags first and `SDC_*` environment variables
//! second. Every command prints the JSON returned by the service.

mod commands;

use anyhow::{Context as _, Result};
use clap::{Args, Parser};
use log::debug;
use smartdc_cloudapi::{AgentFailurePolicy, ApiError, Client, Config};
use smartdc_core::{Context, OsEnv};
use smartdc_file_read_tokio::TokioFileRead;
use smartdc_http_send_reqwest::ReqwestHttpSend;
use smartdc_sign_agent_tokio::SshAgentSign;
use std::process::ExitCode;

/// sdc - manage CloudAPI resources
#[derive(Parser)]
#[command(name = "sdc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    conn: ConnectionArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    command: commands::Commands,
}

/// Connection and authentication flags.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// CloudAPI URL [env: SDC_URL]
    #[arg(short = 'u', long, global = true)]
    url: Option<String>,

    /// Account to act on [env: SDC_ACCOUNT]
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// Key id, `/<account>/keys/<fingerprint>` [env: SDC_KEY_ID]
    #[arg(short, long, global = true)]
    key_id: Option<String>,

    /// Private key file [env: SDC_KEY_FILE]
    #[arg(short, long, global = true)]
    identity: Option<String>,

    /// Basic auth user [env: SDC_USER]
    #[arg(long, global = true)]
    user: Option<String>,

    /// Basic auth password [env: SDC_PASSWORD]
    #[arg(long, global = true)]
    password: Option<String>,

    /// Sign with the SSH agent at SSH_AUTH_SOCK [env: SDC_USE_AGENT]
    #[arg(long, global = true)]
    use_agent: bool,

    /// Fail instead of sending unsigned requests when the agent cannot sign
    #[arg(long, global = true, requires = "use_agent")]
    strict_agent: bool,

    /// Disable the response cache [env: SDC_NO_CACHE]
    #[arg(long, global = true)]
    no_cache: bool,

    /// API version [env: SDC_API_VERSION]
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Log level, e.g. `debug` [env: SDC_LOG_LEVEL]
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl ConnectionArgs {
    fn into_config(self, ctx: &Context) -> Config {
        Config {
            url: self.url,
            account: self.account,
            username: self.user,
            password: self.password,
            key_id: self.key_id,
            key_file: self.identity,
            use_agent: self.use_agent,
            agent_failure: if self.strict_agent {
                AgentFailurePolicy::Fail
            } else {
                AgentFailurePolicy::Unsigned
            },
            no_cache: self.no_cache,
            api_version: self.api_version,
            log_level: self.log_level,
            ..Default::default()
        }
        .from_env(ctx)
    }
}

fn setup_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("warn"));
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}

fn build_client(conn: ConnectionArgs) -> Result<Client> {
    let mut ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let config = conn.into_config(&ctx);
    setup_logging(config.log_level.as_deref());
    debug!("using config: {config:?}");

    if config.use_agent {
        let agent = SshAgentSign::from_env(&ctx).context("--use-agent needs a running ssh-agent")?;
        ctx = ctx.with_sign_agent(agent);
    }

    Ok(Client::new(ctx, config)?)
}

/// Message printed for a failed command.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(e) if e.is_gone() => format!("resource is gone: {e}"),
        Some(ApiError::Service(e)) => format!("{} ({})", e.message, e.code),
        Some(e) => match (e.status(), e.code()) {
            (Some(status), Some(code)) => format!("{e} ({code}, {status})"),
            (Some(status), None) => format!("{e} ({status})"),
            _ => e.to_string(),
        },
        None => format!("{err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match build_client(cli.conn) {
        Ok(client) => commands::run(&client, cli.command).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(output) => {
            if !output.is_null() {
                match serde_json::to_string_pretty(&output) {
                    Ok(s) => println!("{s}"),
                    Err(err) => {
                        eprintln!("sdc: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("sdc: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use smartdc_cloudapi::{ServiceError, TransportError};

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_win_over_env() {
        let cli = Cli::parse_from([
            "sdc",
            "--url",
            "https://cloudapi.example.com",
            "--account",
            "alice",
            "--user",
            "admin",
            "--password",
            "secret",
            "machines",
            "list",
        ]);

        let ctx = Context::new().with_env(smartdc_core::StaticEnv {
            home_dir: None,
            envs: [("SDC_ACCOUNT".to_string(), "bob".to_string())].into(),
        });
        let config = cli.conn.into_config(&ctx);
        assert_eq!(config.account(), "alice");
        config.validate().unwrap();
    }

    #[test]
    fn test_describe() {
        let gone: anyhow::Error = ApiError::Deleted {
            path: "/my/machines/m1".to_string(),
        }
        .into();
        assert_eq!(
            describe(&gone),
            "resource is gone: /my/machines/m1 has been deleted"
        );

        let service: anyhow::Error = ApiError::from(ServiceError {
            code: "InternalError".to_string(),
            message: "try again".to_string(),
        })
        .into();
        assert_eq!(describe(&service), "try again (InternalError)");

        let gone: anyhow::Error =
            ApiError::from(TransportError::from_response(http::StatusCode::GONE, b"")).into();
        assert!(describe(&gone).starts_with("resource is gone"));
    }
}
