use std::time::Instant;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

use crate::client::{BlockFetcher, ExecutionClient};
use crate::config::{network_name, Opts};
use crate::output::ProfilePayload;
use crate::profile::{build_profile, SampleSpec};

mod client;
mod config;
mod output;
mod profile;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let subscriber = Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let opts = Opts::parse();

    tracing::info!(
        started_at_utc = %chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
        rpc = %opts.rpc,
        "zk-fee-profile starting"
    );

    let client = ExecutionClient::new(opts.rpc.clone(), opts.request_timeout());

    // First round-trips double as the connection check.
    let connect_started = Instant::now();
    let chain_id = client
        .chain_id()
        .await
        .wrap_err_with(|| format!("failed to connect to RPC endpoint: {}", opts.rpc))?;
    let tip = client.head_number().await?;
    tracing::info!(
        network = %network_name(chain_id),
        chain_id,
        tip,
        latency_sec = connect_started.elapsed().as_secs_f64(),
        "connected"
    );

    let spec = SampleSpec {
        head_block: opts.head.unwrap_or(tip),
        block_count: opts.blocks,
        step: opts.step,
    };

    let profile = build_profile(&client, spec).await?;
    let payload = ProfilePayload::new(profile);

    if opts.pretty {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if opts.json {
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        output::print_summary(&payload.data);
        println!("{}", serde_json::to_string(&payload)?);
    }

    tracing::info!(timing_sec = payload.data.timing_sec, "done");

    Ok(())
}
