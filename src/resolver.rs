use crate::error::ScoutError;
use crate::rpc::RpcClient;
use crate::scanner::CreationTx;
use alloy::consensus::Transaction as _;
use alloy::consensus::TxEnvelope;
use alloy::consensus::transaction::SignerRecoverable;
use alloy_primitives::Address;

/// Deterministic CREATE address: low 160 bits of keccak256(rlp([sender, nonce])).
pub fn derive_created_address(sender: Address, nonce: u64) -> Address {
    sender.create(nonce)
}

/// Recovers the deployer of a creation transaction and derives the address of
/// the contract it deployed.
///
/// The nonce used is the one recorded in the transaction itself, i.e. the
/// sender's transaction count at deployment time, not the current one.
pub async fn resolve(client: &RpcClient, creation: &CreationTx) -> Result<Address, ScoutError> {
    let tx = client
        .get_transaction(creation.hash)
        .await?
        .ok_or(ScoutError::TxNotFound(creation.hash))?;

    let envelope: &TxEnvelope = &tx.inner;
    let sender = envelope
        .recover_signer()
        .map_err(|e| ScoutError::SignatureRecovery {
            hash: creation.hash,
            reason: e.to_string(),
        })?;

    Ok(derive_created_address(sender, envelope.nonce()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use std::str::FromStr;

    // rlp([address, nonce]) for a single-byte nonce: 22-byte list payload,
    // 0x94-prefixed address followed by the nonce byte (0x80 when zero).
    fn create_address_by_hand(sender: Address, nonce: u8) -> Address {
        let mut encoded = Vec::with_capacity(23);
        encoded.push(0xc0 + 22);
        encoded.push(0x80 + 20);
        encoded.extend_from_slice(sender.as_slice());
        encoded.push(if nonce == 0 { 0x80 } else { nonce });

        let digest = keccak256(&encoded);
        Address::from_slice(&digest[12..])
    }

    #[test]
    fn derivation_matches_canonical_formula() {
        let sender = Address::from_str("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1").unwrap();
        assert_eq!(
            derive_created_address(sender, 5),
            create_address_by_hand(sender, 5)
        );
    }

    #[test]
    fn derivation_matches_canonical_formula_at_nonce_zero() {
        let sender = Address::from_str("0x00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(
            derive_created_address(sender, 0),
            create_address_by_hand(sender, 0)
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let sender = Address::from_str("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1").unwrap();
        assert_eq!(
            derive_created_address(sender, 5),
            derive_created_address(sender, 5)
        );
        assert_ne!(
            derive_created_address(sender, 5),
            derive_created_address(sender, 6)
        );
    }
}
