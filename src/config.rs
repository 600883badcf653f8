use crate::uniswap::PriceBounds;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Uniswap V2 factory on mainnet.
const DEFAULT_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
/// WETH on mainnet, the asset every price is quoted in.
const DEFAULT_REFERENCE_ASSET: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
const DEFAULT_DEX_BASE_URL: &str = "https://app.uniswap.org/#/swap";

#[derive(Debug, Clone)]
pub struct Config {
    pub json_rpc_urls: Vec<String>,
    pub factory_address: Address,
    pub reference_asset: Address,
    pub dex_base_url: String,
    pub price_bounds: PriceBounds,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let urls = std::env::var("JSON_RPC_URLS").context("JSON_RPC_URLS must be set in .env")?;
        let json_rpc_urls: Vec<String> = urls
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let factory_address = parse_address_var("AMM_FACTORY_ADDRESS", DEFAULT_FACTORY)?;
        let reference_asset = parse_address_var("REFERENCE_ASSET_ADDRESS", DEFAULT_REFERENCE_ASSET)?;

        let dex_base_url =
            std::env::var("DEX_BASE_URL").unwrap_or_else(|_| DEFAULT_DEX_BASE_URL.to_string());

        let defaults = PriceBounds::default();
        let price_bounds = PriceBounds {
            min: parse_price_var("MIN_SANE_PRICE", defaults.min)?,
            max: parse_price_var("MAX_SANE_PRICE", defaults.max)?,
        };

        Ok(Config {
            json_rpc_urls,
            factory_address,
            reference_asset,
            dex_base_url,
            price_bounds,
        })
    }
}

fn parse_address_var(name: &str, default: &str) -> Result<Address> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    Address::from_str(&raw).with_context(|| format!("Invalid {name} format"))
}

fn parse_price_var(name: &str, default: BigDecimal) -> Result<BigDecimal> {
    match std::env::var(name) {
        Ok(raw) => BigDecimal::from_str(&raw).with_context(|| format!("Invalid {name} format")),
        Err(_) => Ok(default),
    }
}
