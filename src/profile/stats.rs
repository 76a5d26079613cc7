use serde::Serialize;

use super::fees::wei_to_gwei;
use crate::client::types::SampledBlock;

/// Accumulated samples for the three profiled metrics, in Gwei.
///
/// Lives for a single run and is discarded once the summaries are built.
/// Append order does not matter: `summarize` sorts its input.
#[derive(Debug, Default)]
pub struct Distributions {
    pub base_fee: Vec<f64>,
    pub effective_price: Vec<f64>,
    pub tip: Vec<f64>,
}

impl Distributions {
    /// Record one block: a single base-fee sample for the block itself,
    /// plus one effective-price and one tip sample per transaction. An
    /// empty block still contributes its base-fee sample.
    pub fn record_block(&mut self, block: &SampledBlock) {
        self.base_fee.push(wei_to_gwei(block.base_fee_per_gas));

        for tx in &block.transactions {
            let sample = tx.extract(block.base_fee_per_gas);
            self.effective_price.push(wei_to_gwei(sample.effective_price));
            self.tip.push(wei_to_gwei(sample.tip));
        }
    }
}

/// Order statistics for one metric, rounded to 4 decimals.
#[cfg_attr(test, derive(PartialEq))]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PercentileSummary {
    pub p50: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl PercentileSummary {
    pub const ZERO: Self = Self { p50: 0.0, p95: 0.0, min: 0.0, max: 0.0, count: 0 };
}

/// Summarize a metric's samples deterministically.
///
/// Zero samples yield the all-zero summary rather than an error, so a
/// degenerate run still produces a complete, embeddable payload.
/// Percentiles use nearest-rank (`ceil(p/100 * n) - 1`), which keeps the
/// output bit-for-bit reproducible for a given sample multiset.
pub fn summarize(samples: &[f64]) -> PercentileSummary {
    if samples.is_empty() {
        return PercentileSummary::ZERO;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    PercentileSummary {
        p50: round4(nearest_rank(&sorted, 50)),
        p95: round4(nearest_rank(&sorted, 95)),
        min: round4(sorted[0]),
        max: round4(sorted[sorted.len() - 1]),
        count: sorted.len(),
    }
}

fn nearest_rank(sorted: &[f64], percentile: u32) -> f64 {
    let n = sorted.len();
    let rank = (percentile as f64 / 100.0 * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

/// Average seconds per block across `block_gaps` actual blocks (not
/// samples; the stride skips blocks in between). Zero gaps means a
/// single-block or degenerate run and yields 0.
pub fn average_block_time(oldest_timestamp: u64, newest_timestamp: u64, block_gaps: u64) -> f64 {
    if block_gaps == 0 {
        return 0.0;
    }
    newest_timestamp.saturating_sub(oldest_timestamp) as f64 / block_gaps as f64
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}
