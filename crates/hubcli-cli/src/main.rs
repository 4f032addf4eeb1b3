//! hubcli - authenticated requests against the GitHub API from the terminal.
//!
//! Tokens come from `~/.config/hubcli/hosts.toml` or the `GH_TOKEN` family of
//! environment variables. Set `HUBCLI_DEBUG=1` to trace requests on stderr.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use hubcli_client::{HttpClientOptions, log_sink, new_http_client};
use hubcli_common::{DEFAULT_HOSTNAME, EnvCredentials, HostsConfig};

mod api;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Make an authenticated request to the API and print the response body
    Api(api::ApiArgs),
}

#[derive(clap::Args, Debug)]
struct ClientArgs {
    /// Cache read responses for this many seconds
    #[arg(long, value_name = "SECONDS")]
    cache_ttl: Option<u64>,

    /// Do not send the default Accept header
    #[arg(long)]
    skip_accept: bool,
}

impl ClientArgs {
    fn options(&self, credentials: EnvCredentials<HostsConfig>) -> HttpClientOptions {
        let mut options = HttpClientOptions::builder()
            .app_version(env!("CARGO_PKG_VERSION"))
            .credentials(Arc::new(credentials))
            .skip_accept_headers(self.skip_accept)
            .log(log_sink(std::io::stderr()))
            .build();

        if let Some(ttl) = self.cache_ttl {
            options.enable_cache = true;
            options.cache_ttl = Duration::from_secs(ttl);
        }
        options
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".bright_red());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let credentials =
        EnvCredentials::new(HostsConfig::load().context("failed to load host configuration")?);

    match args.command {
        Command::Api(api_args) => {
            let client = new_http_client(api_args.client.options(credentials))
                .context("failed to build HTTP client")?;
            api::run(&client, &api_args).await
        }
    }
}

fn default_hostname() -> String {
    std::env::var("GH_HOST")
        .ok()
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string())
}
