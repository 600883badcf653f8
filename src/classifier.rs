use crate::abi::{allowanceCall, balanceOfCall, totalSupplyCall};
use crate::rpc::RpcClient;
use alloy_primitives::Address;
use anyhow::Result;
use tracing::debug;

/// Decides whether a contract behaves like a fungible token by probing the
/// fixed ERC20 read surface: `totalSupply()`, `balanceOf(0)` and
/// `allowance(0, 0)`. All three must decode for the contract to pass.
///
/// This is structural duck typing, not a registry lookup. Any contract that
/// happens to expose these three selectors with compatible signatures is
/// accepted; there is no authoritative on-chain registry to do better.
/// A failed probe means "not a token", never an error; only transport
/// failures propagate.
pub async fn classify(client: &RpcClient, address: Address) -> Result<bool> {
    let total_supply = client.try_call(address, totalSupplyCall {}).await?;
    let balance_of = client
        .try_call(
            address,
            balanceOfCall {
                owner: Address::ZERO,
            },
        )
        .await?;
    let allowance = client
        .try_call(
            address,
            allowanceCall {
                owner: Address::ZERO,
                spender: Address::ZERO,
            },
        )
        .await?;

    let probes = [
        total_supply.is_decoded(),
        balance_of.is_decoded(),
        allowance.is_decoded(),
    ];
    let accepted = accepts(probes);

    debug!(
        "Classified {:?}: totalSupply={} balanceOf={} allowance={} -> {}",
        address, probes[0], probes[1], probes[2], accepted
    );

    Ok(accepted)
}

/// Accept decision over the three probe results, in probe order.
fn accepts(probes: [bool; 3]) -> bool {
    probes.into_iter().all(|ok| ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_when_all_probes_decode() {
        assert!(accepts([true, true, true]));
    }

    #[test]
    fn any_failed_probe_rejects() {
        assert!(!accepts([false, true, true]));
        assert!(!accepts([true, false, true]));
        assert!(!accepts([true, true, false]));
        assert!(!accepts([false, false, false]));
    }
}
