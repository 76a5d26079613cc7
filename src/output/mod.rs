use serde::Serialize;

use crate::profile::stats::PercentileSummary;

pub const PROFILE_MODE: &str = "zk_fee_profile";

/// The final result of one sampling run. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeProfile {
    pub chain_id: u64,
    pub network: String,
    pub head_block: u64,
    /// Oldest block actually sampled.
    pub oldest_block: u64,
    /// `head_block - oldest_block`, in actual blocks, not samples.
    pub block_span: u64,
    pub sampled_blocks: usize,
    pub step: u64,
    pub avg_block_time_sec: f64,
    /// Wall-clock duration of the run. Excluded from the determinism
    /// contract, like `generatedAtUtc`.
    pub timing_sec: f64,
    pub base_fee_gwei: PercentileSummary,
    pub effective_price_gwei: PercentileSummary,
    pub tip_gwei_approx: PercentileSummary,
}

/// Envelope around the profile: `data` is the reproducible part.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub mode: &'static str,
    pub generated_at_utc: String,
    pub data: FeeProfile,
}

impl ProfilePayload {
    pub fn new(data: FeeProfile) -> Self {
        Self {
            mode: PROFILE_MODE,
            generated_at_utc: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            data,
        }
    }
}

/// Human summary printed ahead of the compact JSON in the default output
/// mode.
pub fn print_summary(profile: &FeeProfile) {
    println!(
        "{} (chainId {}), head={} span={} sampled={} step={}",
        profile.network,
        profile.chain_id,
        profile.head_block,
        profile.block_span,
        profile.sampled_blocks,
        profile.step
    );
    println!("avg block time: {} s", profile.avg_block_time_sec);
    print_bucket("base fee (gwei)       ", &profile.base_fee_gwei);
    print_bucket("effective price (gwei)", &profile.effective_price_gwei);
    print_bucket("priority tip ~ (gwei) ", &profile.tip_gwei_approx);
}

fn print_bucket(label: &str, summary: &PercentileSummary) {
    println!(
        "{label}  p50={}  p95={}  min={}  max={}  n={}",
        summary.p50, summary.p95, summary.min, summary.max, summary.count
    );
}
