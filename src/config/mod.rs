use std::num::NonZero;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

/// Default number of recent blocks to consider.
pub const DEFAULT_BLOCK_COUNT: u64 = 256;

/// Default stride between sampled block numbers.
pub const DEFAULT_STEP: u64 = 4;

/// Default per-request RPC timeout in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 25;

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// CLI options. Every knob the core consumes is resolved here, up front;
/// the profiler itself never reads the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "zk-fee-profile",
    about = "Profile recent gas behavior (base fee, effective price, tip) as a public input for ZK / soundness systems"
)]
pub struct Opts {
    /// RPC endpoint of the execution client
    #[clap(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc: Url,
    /// How many recent blocks to scan
    #[clap(
        short = 'b',
        long,
        env = "ZK_FEE_BLOCKS",
        default_value_t = NonZero::new(DEFAULT_BLOCK_COUNT).expect("non-zero")
    )]
    pub blocks: NonZero<u64>,
    /// Sample every Nth block for speed
    #[clap(
        short = 's',
        long,
        env = "ZK_FEE_STEP",
        default_value_t = NonZero::new(DEFAULT_STEP).expect("non-zero")
    )]
    pub step: NonZero<u64>,
    /// Use this block number as head instead of the current tip
    #[clap(long)]
    pub head: Option<u64>,
    /// Per-request RPC timeout in seconds
    #[clap(long, env = "ZK_FEE_RPC_TIMEOUT", default_value_t = DEFAULT_RPC_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// JSON-only output (no human summary)
    #[clap(long)]
    pub json: bool,
    /// Pretty-print JSON with indentation
    #[clap(long)]
    pub pretty: bool,
}

impl Opts {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Human label for well-known chain ids.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        1 => "Ethereum Mainnet".to_string(),
        10 => "Optimism".to_string(),
        137 => "Polygon".to_string(),
        8453 => "Base".to_string(),
        42161 => "Arbitrum One".to_string(),
        43114 => "Avalanche C-Chain".to_string(),
        11155111 => "Sepolia Testnet".to_string(),
        id => format!("Unknown (chain ID {id})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opts_defaults() {
        let opts = Opts::try_parse_from(["zk-fee-profile"]).unwrap();

        assert_eq!(opts.blocks.get(), DEFAULT_BLOCK_COUNT);
        assert_eq!(opts.step.get(), DEFAULT_STEP);
        assert_eq!(opts.timeout_secs, DEFAULT_RPC_TIMEOUT_SECS);
        assert_eq!(opts.head, None);
        assert!(!opts.json);
        assert!(!opts.pretty);
    }

    #[test]
    fn opts_flags() {
        let opts = Opts::try_parse_from([
            "zk-fee-profile",
            "--rpc",
            "http://localhost:9999",
            "-b",
            "64",
            "-s",
            "2",
            "--head",
            "123456",
            "--json",
        ])
        .unwrap();

        assert_eq!(opts.rpc.as_str(), "http://localhost:9999/");
        assert_eq!(opts.blocks.get(), 64);
        assert_eq!(opts.step.get(), 2);
        assert_eq!(opts.head, Some(123456));
        assert!(opts.json);
    }

    #[test]
    fn opts_reject_zero_blocks() {
        assert!(Opts::try_parse_from(["zk-fee-profile", "-b", "0"]).is_err());
        assert!(Opts::try_parse_from(["zk-fee-profile", "-s", "0"]).is_err());
    }

    #[test]
    fn network_names() {
        assert_eq!(network_name(1), "Ethereum Mainnet");
        assert_eq!(network_name(8453), "Base");
        assert_eq!(network_name(999), "Unknown (chain ID 999)");
    }
}
