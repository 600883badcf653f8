use crate::classifier;
use crate::config::Config;
use crate::error::ScoutError;
use crate::profile::{self, TokenProfile};
use crate::resolver;
use crate::rpc::RpcClient;
use crate::scanner::{BlockWindow, CreationScanner, CreationTx};
use crate::uniswap::{self, Listing};
use alloy_primitives::Address;
use anyhow::Result;
use tracing::{info, warn};

/// The four-stage discovery pipeline, strictly sequential: each stage
/// consumes the previous stage's full output before the next one starts, and
/// candidates are processed one at a time in scan order. Every intermediate
/// stage is exposed as its own operation for the corresponding subcommand.
pub struct Pipeline {
    client: RpcClient,
    config: Config,
}

impl Pipeline {
    pub fn new(client: RpcClient, config: Config) -> Self {
        Pipeline { client, config }
    }

    /// Stage 1: contract-creation transactions in the trailing window,
    /// ordered by (block height, in-block index).
    pub async fn scan_creations(&self, depth: u64) -> Result<Vec<CreationTx>> {
        let head = self.client.get_latest_block().await?;
        let window = BlockWindow::trailing(head, depth);

        let scanner = CreationScanner::new(self.client.clone());
        scanner.scan(window).await
    }

    /// Stages 2-3: derived addresses of created contracts that pass the
    /// fungible-token probe, in discovery order.
    ///
    /// A creation transaction that vanished or whose sender cannot be
    /// recovered kills only that candidate; the failure is logged, the run
    /// continues. Chain read failures abort the run.
    pub async fn discover_tokens(&self, depth: u64) -> Result<Vec<Address>> {
        let creations = self.scan_creations(depth).await?;

        let mut candidates = Vec::new();
        let mut skipped = 0usize;
        for creation in &creations {
            match resolver::resolve(&self.client, creation).await {
                Ok(address) => candidates.push(address),
                Err(ScoutError::ChainRead(e)) => return Err(e),
                Err(e) => {
                    warn!("Skipping creation tx {:?}: {}", creation.hash, e);
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            warn!(
                "Skipped {} of {} creation transactions",
                skipped,
                creations.len()
            );
        }

        let mut tokens = Vec::new();
        for address in candidates {
            if classifier::classify(&self.client, address).await? {
                tokens.push(address);
            }
        }

        info!("Found {} new fungible tokens", tokens.len());
        Ok(tokens)
    }

    /// Stage 4: tokens from `discover_tokens` that have a pool against the
    /// reference asset. "Not listed" is filtered here, not reported.
    pub async fn discover_listings(&self, depth: u64) -> Result<Vec<Listing>> {
        let tokens = self.discover_tokens(depth).await?;

        let mut listings = Vec::new();
        for token in tokens {
            let pair = uniswap::pair_address(
                &self.client,
                self.config.factory_address,
                token,
                self.config.reference_asset,
            )
            .await?;

            if let Some(pair) = pair {
                listings.push(Listing { token, pair });
            }
        }

        info!(
            "Found {} tokens listed against {:?}",
            listings.len(),
            self.config.reference_asset
        );
        Ok(listings)
    }

    /// Stages 5-6: priced profiles for listed tokens. Tokens without a
    /// plausible price are dropped entirely, never emitted with a null price.
    pub async fn build_profiles(&self, depth: u64) -> Result<Vec<TokenProfile>> {
        let listings = self.discover_listings(depth).await?;

        let mut profiles = Vec::new();
        for listing in listings {
            let quote = uniswap::price_in_reference(
                &self.client,
                listing.token,
                listing.pair,
                &self.config.price_bounds,
            )
            .await?;

            let assembled = profile::assemble(
                &self.client,
                &self.config.dex_base_url,
                listing.token,
                true,
                quote,
            )
            .await?;

            if let Some(profile) = assembled {
                profiles.push(profile);
            }
        }

        info!("Assembled {} token profiles", profiles.len());
        Ok(profiles)
    }
}
