use std::num::NonZero;
use std::time::Instant;

use tracing::{debug, info};

use crate::client::{types::SampledBlock, BlockFetcher, FetchError};
use crate::config::network_name;
use crate::output::FeeProfile;

pub mod fees;
pub mod stats;

use stats::{average_block_time, round3, summarize, Distributions};

/// Emit a progress log line every this many sampled blocks.
const PROGRESS_LOG_INTERVAL: usize = 16;

/// Immutable description of which blocks a run samples: `head_block`,
/// `head_block - step`, `head_block - 2*step`, ... down to
/// `max(0, head_block - block_count + 1)`. Fully determined by the three
/// values, so two runs with the same spec sample the same blocks.
#[derive(Debug, Clone, Copy)]
pub struct SampleSpec {
    pub head_block: u64,
    pub block_count: NonZero<u64>,
    pub step: NonZero<u64>,
}

impl SampleSpec {
    /// Oldest block number the sampled range may reach.
    pub fn range_start(&self) -> u64 {
        self.head_block.saturating_sub(self.block_count.get() - 1)
    }

    /// The strictly decreasing sequence of block numbers to fetch.
    pub fn block_numbers(self) -> impl Iterator<Item = u64> {
        let start = self.range_start();
        let step = self.step.get();

        (0u64..)
            .map(move |k| k.checked_mul(step).and_then(|off| self.head_block.checked_sub(off)))
            .take_while(move |n| n.is_some_and(|n| n >= start))
            .flatten()
    }
}

/// Fetch every block the spec names, in order, with full transaction
/// bodies. A single failed fetch aborts the whole run.
pub async fn sample_blocks<F: BlockFetcher>(
    spec: &SampleSpec,
    fetcher: &F,
) -> Result<Vec<SampledBlock>, FetchError> {
    let mut blocks = Vec::new();

    for number in spec.block_numbers() {
        let block = fetcher.block_by_number(number).await?;
        blocks.push(block);

        if blocks.len() % PROGRESS_LOG_INTERVAL == 0 {
            debug!(block = number, sampled = blocks.len(), "sampling progress");
        }
    }

    Ok(blocks)
}

/// Run one full profiling pass: resolve chain identity, sample blocks,
/// aggregate the three metric distributions, and assemble the profile.
///
/// Everything in the result except `timing_sec` is reproducible for a
/// fixed spec against unchanged chain state.
pub async fn build_profile<F: BlockFetcher>(
    fetcher: &F,
    spec: SampleSpec,
) -> Result<FeeProfile, FetchError> {
    info!(
        head = spec.head_block,
        blocks = spec.block_count.get(),
        step = spec.step.get(),
        "sampling recent blocks"
    );
    let started = Instant::now();

    let chain_id = fetcher.chain_id().await?;
    let blocks = sample_blocks(&spec, fetcher).await?;

    let mut distributions = Distributions::default();
    for block in &blocks {
        distributions.record_block(block);
    }

    // Newest first by construction; the last sampled block is the oldest.
    let (oldest_block, avg_block_time) = match (blocks.first(), blocks.last()) {
        (Some(newest), Some(oldest)) => (
            oldest.number,
            average_block_time(
                oldest.timestamp,
                newest.timestamp,
                spec.head_block - oldest.number,
            ),
        ),
        _ => (spec.head_block, 0.0),
    };

    Ok(FeeProfile {
        chain_id,
        network: network_name(chain_id),
        head_block: spec.head_block,
        oldest_block,
        block_span: spec.head_block - oldest_block,
        sampled_blocks: blocks.len(),
        step: spec.step.get(),
        avg_block_time_sec: round3(avg_block_time),
        timing_sec: round3(started.elapsed().as_secs_f64()),
        base_fee_gwei: summarize(&distributions.base_fee),
        effective_price_gwei: summarize(&distributions.effective_price),
        tip_gwei_approx: summarize(&distributions.tip),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::profile::fees::FeeModel;

    fn spec(head_block: u64, block_count: u64, step: u64) -> SampleSpec {
        SampleSpec {
            head_block,
            block_count: NonZero::new(block_count).unwrap(),
            step: NonZero::new(step).unwrap(),
        }
    }

    #[test]
    fn block_numbers_follow_the_stride() {
        let numbers: Vec<u64> = spec(100, 10, 3).block_numbers().collect();

        // Range start is 91; 88 would fall outside it.
        assert_eq!(numbers, vec![100, 97, 94, 91]);
    }

    #[test]
    fn block_numbers_stop_at_genesis() {
        let numbers: Vec<u64> = spec(5, 256, 4).block_numbers().collect();

        assert_eq!(numbers, vec![5, 1]);
    }

    #[test]
    fn block_numbers_single_block() {
        let numbers: Vec<u64> = spec(0, 1, 4).block_numbers().collect();

        assert_eq!(numbers, vec![0]);
    }

    #[test]
    fn block_numbers_strictly_decreasing_no_duplicates() {
        let numbers: Vec<u64> = spec(1000, 64, 7).block_numbers().collect();

        assert!(numbers.windows(2).all(|w| w[0] > w[1]));
        assert!(numbers.iter().all(|n| *n >= spec(1000, 64, 7).range_start()));
        assert_eq!(numbers[0], 1000);
    }

    struct MockFetcher {
        chain_id: u64,
        blocks: HashMap<u64, SampledBlock>,
    }

    impl MockFetcher {
        fn new(chain_id: u64, blocks: Vec<SampledBlock>) -> Self {
            Self {
                chain_id,
                blocks: blocks.into_iter().map(|b| (b.number, b)).collect(),
            }
        }
    }

    #[async_trait::async_trait]
    impl BlockFetcher for MockFetcher {
        async fn chain_id(&self) -> Result<u64, FetchError> {
            Ok(self.chain_id)
        }

        async fn head_number(&self) -> Result<u64, FetchError> {
            Ok(self.blocks.keys().copied().max().unwrap_or(0))
        }

        async fn block_by_number(&self, number: u64) -> Result<SampledBlock, FetchError> {
            self.blocks.get(&number).cloned().ok_or(FetchError::MissingBlock(number))
        }
    }

    fn canned_blocks() -> Vec<SampledBlock> {
        vec![
            SampledBlock {
                number: 108,
                timestamp: 2096,
                base_fee_per_gas: 50_000_000_000,
                transactions: vec![
                    FeeModel::FeeMarket {
                        max_fee_per_gas: 100_000_000_000,
                        max_priority_fee_per_gas: 2_000_000_000,
                    },
                    FeeModel::Legacy { gas_price: 60_000_000_000 },
                ],
            },
            SampledBlock {
                number: 104,
                timestamp: 2048,
                base_fee_per_gas: 40_000_000_000,
                transactions: vec![FeeModel::Legacy { gas_price: 30_000_000_000 }],
            },
            SampledBlock {
                number: 100,
                timestamp: 2000,
                base_fee_per_gas: 0,
                transactions: vec![],
            },
        ]
    }

    #[tokio::test]
    async fn sample_blocks_returns_one_block_per_spec_number() {
        let fetcher = MockFetcher::new(1, canned_blocks());
        let spec = spec(108, 9, 4);

        let blocks = sample_blocks(&spec, &fetcher).await.unwrap();

        let numbers: Vec<u64> = blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![108, 104, 100]);
    }

    #[tokio::test]
    async fn missing_block_aborts_the_run() {
        let fetcher = MockFetcher::new(1, canned_blocks());
        // 106 is not in the canned set.
        let spec = spec(108, 5, 2);

        let err = build_profile(&fetcher, spec).await.unwrap_err();

        assert!(matches!(err, FetchError::MissingBlock(106)));
    }

    #[tokio::test]
    async fn profile_aggregates_all_metrics() {
        let fetcher = MockFetcher::new(1, canned_blocks());

        let profile = build_profile(&fetcher, spec(108, 9, 4)).await.unwrap();

        assert_eq!(profile.chain_id, 1);
        assert_eq!(profile.network, "Ethereum Mainnet");
        assert_eq!(profile.head_block, 108);
        assert_eq!(profile.oldest_block, 100);
        assert_eq!(profile.block_span, 8);
        assert_eq!(profile.sampled_blocks, 3);
        assert_eq!(profile.step, 4);
        // (2096 - 2000) / (108 - 100)
        assert_eq!(profile.avg_block_time_sec, 12.0);

        // One base-fee sample per block, including the empty one.
        assert_eq!(profile.base_fee_gwei.count, 3);
        assert_eq!(profile.base_fee_gwei.min, 0.0);
        assert_eq!(profile.base_fee_gwei.max, 50.0);

        // One sample per transaction: 52, 60, 30 Gwei effective.
        assert_eq!(profile.effective_price_gwei.count, 3);
        assert_eq!(profile.effective_price_gwei.p50, 52.0);
        assert_eq!(profile.effective_price_gwei.max, 60.0);

        // Tips: 2 (stated priority), 10 (60 - 50), 0 (30 < 40, clamped).
        assert_eq!(profile.tip_gwei_approx.count, 3);
        assert_eq!(profile.tip_gwei_approx.min, 0.0);
        assert_eq!(profile.tip_gwei_approx.p50, 2.0);
        assert_eq!(profile.tip_gwei_approx.max, 10.0);
    }

    #[tokio::test]
    async fn profile_data_is_reproducible() {
        let fetcher = MockFetcher::new(1, canned_blocks());
        let spec = spec(108, 9, 4);

        let mut first = build_profile(&fetcher, spec).await.unwrap();
        let mut second = build_profile(&fetcher, spec).await.unwrap();

        // Wall-clock timing is explicitly excluded from the determinism
        // contract.
        first.timing_sec = 0.0;
        second.timing_sec = 0.0;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn single_block_profile_has_zero_span() {
        let fetcher = MockFetcher::new(5, canned_blocks());

        let profile = build_profile(&fetcher, spec(108, 1, 4)).await.unwrap();

        assert_eq!(profile.oldest_block, 108);
        assert_eq!(profile.block_span, 0);
        assert_eq!(profile.sampled_blocks, 1);
        assert_eq!(profile.avg_block_time_sec, 0.0);
        assert_eq!(profile.effective_price_gwei.count, 2);
    }
}
