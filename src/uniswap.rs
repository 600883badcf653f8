use crate::abi::{decimalsCall, getPairCall, getReservesCall, token0Call};
use crate::rpc::{CallOutcome, RpcClient};
use alloy_primitives::{Address, U256};
use anyhow::Result;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, Zero};
use tracing::debug;

/// Normalization baseline of the reference asset (WETH uses 18 decimals).
const REFERENCE_DECIMALS: u8 = 18;

/// Accepted price interval in reference-asset units, closed on both ends.
/// Rejects ratios from thinly seeded or manipulated pools; anything outside
/// is "unpriceable", not an error. Overridable through `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBounds {
    pub min: BigDecimal,
    pub max: BigDecimal,
}

impl Default for PriceBounds {
    fn default() -> Self {
        PriceBounds {
            // 1e-18, one attoreference per token
            min: BigDecimal::new(BigInt::from(1), 18),
            max: BigDecimal::from(1000),
        }
    }
}

impl PriceBounds {
    fn contains(&self, price: &BigDecimal) -> bool {
        *price >= self.min && *price <= self.max
    }
}

/// A token listed against the reference asset, with the pool that lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub token: Address,
    pub pair: Address,
}

/// Looks up the factory's pool for `(token, reference)`. The factory returns
/// the zero address when no pool exists, which maps to `None` here so no
/// sentinel value escapes this module.
pub async fn pair_address(
    client: &RpcClient,
    factory: Address,
    token: Address,
    reference: Address,
) -> Result<Option<Address>> {
    let pair = client
        .call(
            factory,
            getPairCall {
                tokenA: token,
                tokenB: reference,
            },
        )
        .await?;

    Ok((pair != Address::ZERO).then_some(pair))
}

/// Spot price of `token` in reference-asset units, read from the pool's
/// reserves. Absent when the pool cannot produce a plausible price: zero
/// reference reserve, zero price, out-of-bounds price, or a token whose
/// `decimals()` is unreadable.
pub async fn price_in_reference(
    client: &RpcClient,
    token: Address,
    pair: Address,
    bounds: &PriceBounds,
) -> Result<Option<BigDecimal>> {
    let reserves = client.call(pair, getReservesCall {}).await?;
    let token0 = client.call(pair, token0Call {}).await?;

    let decimals = match client.try_call(token, decimalsCall {}).await? {
        CallOutcome::Decoded(d) => d,
        CallOutcome::Reverted => {
            debug!("Token {:?} has no readable decimals, skipping price", token);
            return Ok(None);
        }
    };

    let reserve0 = U256::from_be_slice(&reserves.reserve0.to_be_bytes::<14>());
    let reserve1 = U256::from_be_slice(&reserves.reserve1.to_be_bytes::<14>());

    Ok(spot_price(reserve0, reserve1, token0, token, decimals, bounds))
}

/// Pure price computation over a pool snapshot.
///
/// Reserves are oriented by matching `token0` against the candidate token,
/// both sides are normalized by their decimals, and the ratio is taken with
/// arbitrary-precision decimals throughout. Raw reserves can exceed 64 bits,
/// so they must never pass through f64 before normalization.
pub fn spot_price(
    reserve0: U256,
    reserve1: U256,
    token0: Address,
    token: Address,
    token_decimals: u8,
    bounds: &PriceBounds,
) -> Option<BigDecimal> {
    let (token_reserve, reference_reserve) = if token0 == token {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    };

    if reference_reserve.is_zero() {
        return None;
    }

    let normalized_token = to_decimal(token_reserve) / pow10(token_decimals);
    let normalized_reference = to_decimal(reference_reserve) / pow10(REFERENCE_DECIMALS);
    let price = normalized_token / normalized_reference;

    if price.is_zero() || !bounds.contains(&price) {
        return None;
    }

    Some(price)
}

fn to_decimal(value: U256) -> BigDecimal {
    BigDecimal::from(BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>()))
}

fn pow10(decimals: u8) -> BigDecimal {
    // digits 1 at scale -d is 10^d
    BigDecimal::new(BigInt::from(1), -(decimals as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn wei(units: u64) -> U256 {
        U256::from(units) * U256::from(10).pow(U256::from(18))
    }

    #[test]
    fn token_as_token0_prices_against_reserve1() {
        let token = addr(0x11);
        let price = spot_price(wei(500), wei(1), token, token, 18, &PriceBounds::default());
        assert_eq!(price, Some(BigDecimal::from(500)));
    }

    #[test]
    fn token_as_token1_swaps_reserve_orientation() {
        let token = addr(0x11);
        let other = addr(0x22);
        let price = spot_price(wei(1), wei(500), other, token, 18, &PriceBounds::default());
        assert_eq!(price, Some(BigDecimal::from(500)));
    }

    #[test]
    fn zero_reference_reserve_is_unpriceable() {
        let token = addr(0x11);
        let price = spot_price(wei(500), U256::ZERO, token, token, 18, &PriceBounds::default());
        assert_eq!(price, None);
    }

    #[test]
    fn zero_token_reserve_is_unpriceable() {
        let token = addr(0x11);
        let price = spot_price(U256::ZERO, wei(1), token, token, 18, &PriceBounds::default());
        assert_eq!(price, None);
    }

    #[test]
    fn price_above_cap_is_dropped() {
        let token = addr(0x11);
        let price = spot_price(wei(2000), wei(1), token, token, 18, &PriceBounds::default());
        assert_eq!(price, None);
    }

    #[test]
    fn price_at_cap_is_retained() {
        let token = addr(0x11);
        assert_eq!(
            spot_price(wei(1000), wei(1), token, token, 18, &PriceBounds::default()),
            Some(BigDecimal::from(1000))
        );
    }

    #[test]
    fn price_below_floor_is_dropped() {
        let token = addr(0x11);
        // 1 raw unit of a 18-decimal token against a deep reference reserve
        // computes far below 1e-18.
        let price =
            spot_price(U256::from(1), wei(1_000_000), token, token, 18, &PriceBounds::default());
        assert_eq!(price, None);
    }

    #[test]
    fn price_is_invariant_under_joint_rescaling() {
        let token = addr(0x11);
        let base = spot_price(wei(500), wei(2), token, token, 18, &PriceBounds::default());
        let scaled = spot_price(
            wei(500) * U256::from(7),
            wei(2) * U256::from(7),
            token,
            token,
            18,
            &PriceBounds::default(),
        );
        assert!(base.is_some());
        assert_eq!(base, scaled);
    }

    #[test]
    fn decimals_normalization_uses_the_token_baseline() {
        let token = addr(0x11);
        // 6-decimal token: 500e6 raw units against 1 WETH is still 500.
        let token_reserve = U256::from(500u64) * U256::from(10).pow(U256::from(6));
        let price = spot_price(token_reserve, wei(1), token, token, 6, &PriceBounds::default());
        assert_eq!(price, Some(BigDecimal::from(500)));
    }

    #[test]
    fn floor_boundary_is_closed() {
        let token = addr(0x11);
        // Exactly 1e-18: one normalized attotoken per reference unit.
        let price = spot_price(U256::from(1), wei(1), token, token, 18, &PriceBounds::default());
        assert_eq!(price, Some(BigDecimal::from_str("0.000000000000000001").unwrap()));
    }

    #[test]
    fn tightened_bounds_reject_what_defaults_accept() {
        let token = addr(0x11);
        let tight = PriceBounds {
            min: BigDecimal::from(1),
            max: BigDecimal::from(100),
        };

        let in_range = spot_price(wei(50), wei(1), token, token, 18, &tight);
        assert_eq!(in_range, Some(BigDecimal::from(50)));

        let above = spot_price(wei(500), wei(1), token, token, 18, &tight);
        assert_eq!(above, None);

        // 0.5 sits inside the default interval but below the tightened floor.
        let below = spot_price(wei(1), wei(2), token, token, 18, &tight);
        assert_eq!(below, None);
    }
}
