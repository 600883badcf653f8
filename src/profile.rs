use crate::abi::{decimalsCall, nameCall, symbolCall, totalSupplyCall};
use crate::rpc::{CallOutcome, RpcClient};
use alloy_primitives::{Address, U256};
use anyhow::Result;
use bigdecimal::BigDecimal;
use tracing::warn;

/// Finished record for a discovered, listed and priced token.
///
/// The analytics fields at the bottom exist for parity with the wider data
/// model but are never computed by this pipeline; they stay `None`.
#[derive(Debug, Clone)]
pub struct TokenProfile {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub price_in_reference: BigDecimal,
    pub trade_link: String,

    pub circulating_supply: Option<U256>,
    pub market_cap: Option<BigDecimal>,
    pub volume_24h: Option<BigDecimal>,
    pub holders: Option<u64>,
}

/// Canonical swap link for a token on the configured DEX frontend. The
/// address is embedded in its EIP-55 checksummed form.
pub fn trade_link(dex_base_url: &str, token: Address) -> String {
    format!("{dex_base_url}?inputCurrency={token}")
}

/// Packages classifier and price-calculator outputs with contract metadata.
///
/// Unpriced or unclassified tokens are dropped entirely rather than emitted
/// with a hole in them; both are expected outcomes, not failures. Metadata
/// that reverts, on the other hand, is worth a warning since the contract
/// already passed classification.
pub async fn assemble(
    client: &RpcClient,
    dex_base_url: &str,
    token: Address,
    is_token: bool,
    quote: Option<BigDecimal>,
) -> Result<Option<TokenProfile>> {
    if !is_token {
        return Ok(None);
    }
    let Some(price_in_reference) = quote else {
        return Ok(None);
    };

    let name = match client.try_call(token, nameCall {}).await? {
        CallOutcome::Decoded(name) => name,
        CallOutcome::Reverted => {
            warn!("Token {:?} has no readable name, dropping profile", token);
            return Ok(None);
        }
    };
    let symbol = match client.try_call(token, symbolCall {}).await? {
        CallOutcome::Decoded(symbol) => symbol,
        CallOutcome::Reverted => {
            warn!("Token {:?} has no readable symbol, dropping profile", token);
            return Ok(None);
        }
    };
    let decimals = match client.try_call(token, decimalsCall {}).await? {
        CallOutcome::Decoded(decimals) => decimals,
        CallOutcome::Reverted => {
            warn!("Token {:?} has no readable decimals, dropping profile", token);
            return Ok(None);
        }
    };
    let total_supply = match client.try_call(token, totalSupplyCall {}).await? {
        CallOutcome::Decoded(supply) => supply,
        CallOutcome::Reverted => {
            warn!(
                "Token {:?} stopped answering totalSupply, dropping profile",
                token
            );
            return Ok(None);
        }
    };

    Ok(Some(TokenProfile {
        address: token,
        name,
        symbol,
        decimals,
        total_supply,
        price_in_reference,
        trade_link: trade_link(dex_base_url, token),
        circulating_supply: None,
        market_cap: None,
        volume_24h: None,
        holders: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trade_link_embeds_the_checksummed_token_address() {
        let token = Address::from_str("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1").unwrap();
        assert_eq!(
            trade_link("https://app.uniswap.org/#/swap", token),
            "https://app.uniswap.org/#/swap?inputCurrency=0xAaAAAaaAAAAAAaaAAAaaaaAaAaAAAAaAAaAaAaA1"
        );

        // WETH's checksummed casing is the widely published one.
        let weth = Address::from_str("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        assert_eq!(
            trade_link("https://app.uniswap.org/#/swap", weth),
            "https://app.uniswap.org/#/swap?inputCurrency=0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
        );
    }
}
