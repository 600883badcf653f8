use alloy::network::TransactionBuilder;
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Block, BlockNumberOrTag, Transaction, TransactionRequest};
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, B256, Bytes};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120); // 2 minutes timeout per request

/// Outcome of a read-only contract call that is allowed to fail remotely.
///
/// `Reverted` covers an execution revert, a missing selector and an
/// undecodable return value. Transport failures never end up here, they
/// surface as errors.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Decoded(T),
    Reverted,
}

impl<T> CallOutcome<T> {
    pub fn is_decoded(&self) -> bool {
        matches!(self, CallOutcome::Decoded(_))
    }
}

/// Read access to a remote node. All retry/backoff/rotation policy for the
/// transport lives here; callers above never retry.
#[derive(Clone)]
pub struct RpcClient {
    providers: Vec<AlloyFullProvider>,
    urls: Vec<String>,
    current_provider: Arc<AtomicUsize>,
    max_retries: usize,
}

impl RpcClient {
    pub fn new(rpc_urls: &[String]) -> Result<Self> {
        if rpc_urls.is_empty() {
            return Err(anyhow::anyhow!("At least one RPC URL must be provided"));
        }

        let mut providers = Vec::new();
        for url in rpc_urls {
            let parsed_url = url
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", url))?;
            let provider: AlloyFullProvider = ProviderBuilder::new().connect_http(parsed_url);
            providers.push(provider);
        }

        Ok(RpcClient {
            providers,
            urls: rpc_urls.to_vec(),
            current_provider: Arc::new(AtomicUsize::new(0)),
            max_retries: 5,
        })
    }

    fn get_provider(&self) -> &AlloyFullProvider {
        let index = self.current_provider.load(Ordering::Relaxed) % self.providers.len();
        &self.providers[index]
    }

    pub fn get_current_url(&self) -> &str {
        let index = self.current_provider.load(Ordering::Relaxed) % self.urls.len();
        &self.urls[index]
    }

    pub fn rotate_provider(&self) {
        let current = self.current_provider.load(Ordering::Relaxed);
        let next = (current + 1) % self.providers.len();
        self.current_provider.store(next, Ordering::Relaxed);

        if self.providers.len() > 1 {
            debug!("Rotating to RPC provider #{}", next);
        }
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries)
    }

    fn handle_error(&self, error_str: &str) {
        let current_url = self.get_current_url();
        warn!(
            "RPC error on {}: {}, rotating provider",
            current_url, error_str
        );
        self.rotate_provider();
    }

    fn handle_timeout(&self) -> anyhow::Error {
        let current_url = self.get_current_url();
        warn!(
            "Request timeout after {} seconds on {}, rotating provider",
            REQUEST_TIMEOUT.as_secs(),
            current_url
        );
        self.rotate_provider();
        anyhow::anyhow!(
            "Request timeout after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        )
    }

    pub async fn get_latest_block(&self) -> Result<u64> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                match timeout(REQUEST_TIMEOUT, provider.get_block_number()).await {
                    Ok(Ok(block_number)) => Ok(block_number),
                    Ok(Err(e)) => {
                        let error_str = e.to_string();
                        client.handle_error(&error_str);
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }

    /// Fetches a block with full transaction objects.
    pub async fn get_block_with_txs(&self, block_number: u64) -> Result<Block> {
        let client = self.clone();
        let block = Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                let future = provider
                    .get_block_by_number(BlockNumberOrTag::Number(block_number))
                    .full();

                match timeout(REQUEST_TIMEOUT, future).await {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(e)) => {
                        let error_str = e.to_string();
                        client.handle_error(&error_str);
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await?;

        block.ok_or_else(|| anyhow::anyhow!("Block {} not found", block_number))
    }

    pub async fn get_transaction(&self, hash: B256) -> Result<Option<Transaction>> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                let future = provider.get_transaction_by_hash(hash);

                match timeout(REQUEST_TIMEOUT, future).await {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(e)) => {
                        let error_str = e.to_string();
                        client.handle_error(&error_str);
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }

    /// Read-only contract call where a remote failure is meaningful to the
    /// caller. An execution revert or a garbage return value comes back as
    /// `CallOutcome::Reverted` without retrying; transport failures are
    /// retried and eventually returned as errors.
    pub async fn try_call<C>(&self, contract: Address, call: C) -> Result<CallOutcome<C::Return>>
    where
        C: SolCall,
    {
        let calldata: Bytes = call.abi_encode().into();
        let client = self.clone();

        let raw = Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            let calldata = calldata.clone();
            async move {
                let provider = client.get_provider();
                let request = TransactionRequest::default()
                    .with_to(contract)
                    .with_input(calldata);

                match timeout(REQUEST_TIMEOUT, provider.call(request)).await {
                    Ok(Ok(bytes)) => Ok(Some(bytes)),
                    Ok(Err(e)) => {
                        if e.as_error_resp().is_some() {
                            // The node executed the call and it failed;
                            // retrying would not change the answer.
                            Ok(None)
                        } else {
                            let error_str = e.to_string();
                            client.handle_error(&error_str);
                            Err(anyhow::anyhow!("{}", e))
                        }
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await?;

        let Some(bytes) = raw else {
            return Ok(CallOutcome::Reverted);
        };

        match C::abi_decode_returns(&bytes) {
            Ok(decoded) => Ok(CallOutcome::Decoded(decoded)),
            Err(e) => {
                debug!("Undecodable return from {:?}: {}", contract, e);
                Ok(CallOutcome::Reverted)
            }
        }
    }

    /// Read-only contract call where a revert is unexpected and treated as a
    /// chain read failure.
    pub async fn call<C>(&self, contract: Address, call: C) -> Result<C::Return>
    where
        C: SolCall,
    {
        match self.try_call(contract, call).await? {
            CallOutcome::Decoded(value) => Ok(value),
            CallOutcome::Reverted => Err(anyhow::anyhow!(
                "Call to {:?} ({}) reverted",
                contract,
                C::SIGNATURE
            )),
        }
    }
}
