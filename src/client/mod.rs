use std::future::IntoFuture;
use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    primitives::U64,
    rpc::client::{ClientBuilder, RpcClient},
    transports::{http::Http, TransportError, TransportErrorKind, TransportResult},
};
use reqwest::{Client, Url};

pub mod types;

use types::{RpcBlock, SampledBlock};

/// Fatal fetch conditions. Any of these aborts the sampling run; the core
/// never retries and never produces a partial profile.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{method} timed out after {after:?}")]
    Timeout { method: &'static str, after: Duration },
    #[error("block {0} not found")]
    MissingBlock(u64),
}

/// The chain-facing seam the profiler consumes. Production uses
/// [`ExecutionClient`]; tests substitute a canned fetcher.
#[async_trait::async_trait]
pub trait BlockFetcher {
    async fn chain_id(&self) -> Result<u64, FetchError>;

    async fn head_number(&self) -> Result<u64, FetchError>;

    /// Fetch a block with full transaction bodies.
    async fn block_by_number(&self, number: u64) -> Result<SampledBlock, FetchError>;
}

/// Thin JSON-RPC client over an execution node's HTTP endpoint. Every
/// request is bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct ExecutionClient {
    rpc: RpcClient<Http<Client>>,
    request_timeout: Duration,
}

impl ExecutionClient {
    pub fn new(url: Url, request_timeout: Duration) -> Self {
        let rpc = ClientBuilder::default().http(url);

        Self { rpc, request_timeout }
    }

    async fn with_timeout<T, F>(&self, method: &'static str, fut: F) -> Result<T, FetchError>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match tokio::time::timeout(self.request_timeout, fut.into_future()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FetchError::Timeout { method, after: self.request_timeout }),
        }
    }
}

#[async_trait::async_trait]
impl BlockFetcher for ExecutionClient {
    async fn chain_id(&self) -> Result<u64, FetchError> {
        let chain_id: String = self
            .with_timeout("eth_chainId", self.rpc.request("eth_chainId", ()))
            .await?;
        let chain_id = chain_id.get(2..).ok_or_else(|| {
            FetchError::Transport(
                TransportErrorKind::Custom("not hex prefixed result".into()).into(),
            )
        })?;

        let decoded = u64::from_str_radix(chain_id, 16).map_err(|e| {
            FetchError::Transport(
                TransportErrorKind::Custom(
                    format!("could not decode {} into u64: {}", chain_id, e).into(),
                )
                .into(),
            )
        })?;
        Ok(decoded)
    }

    async fn head_number(&self) -> Result<u64, FetchError> {
        let result: U64 = self
            .with_timeout("eth_blockNumber", self.rpc.request("eth_blockNumber", ()))
            .await?;

        Ok(result.to())
    }

    async fn block_by_number(&self, number: u64) -> Result<SampledBlock, FetchError> {
        let tag = BlockNumberOrTag::Number(number);

        let block: Option<RpcBlock> = self
            .with_timeout(
                "eth_getBlockByNumber",
                self.rpc.request("eth_getBlockByNumber", (tag, true)),
            )
            .await?;

        block.map(SampledBlock::from).ok_or(FetchError::MissingBlock(number))
    }
}
