use alloy_primitives::B256;
use thiserror::Error;

/// Failure modes of the discovery pipeline.
///
/// Only I/O and protocol failures live here. "Not a token", "not listed" and
/// "no sane price" are expected outcomes and are modelled as `false`/`None`
/// values, never as errors.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Any RPC failure that survived the transport layer's retries. Fatal to
    /// the whole run.
    #[error("chain read failed: {0}")]
    ChainRead(#[from] anyhow::Error),

    /// The creation transaction vanished between scan and resolution. Fatal
    /// to this candidate only.
    #[error("transaction {0} not found")]
    TxNotFound(B256),

    /// The sender could not be recovered from the transaction signature,
    /// e.g. a malformed or pre-fork encoding. Fatal to this candidate only.
    #[error("sender recovery failed for {hash}: {reason}")]
    SignatureRecovery { hash: B256, reason: String },
}

impl ScoutError {
    /// Whether the error kills only the candidate it occurred on, as opposed
    /// to aborting the run.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            ScoutError::TxNotFound(_) | ScoutError::SignatureRecovery { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_chain_read_aborts_the_run() {
        let chain_read = ScoutError::ChainRead(anyhow::anyhow!("connection refused"));
        assert!(!chain_read.is_candidate_local());

        assert!(ScoutError::TxNotFound(B256::ZERO).is_candidate_local());
        assert!(
            ScoutError::SignatureRecovery {
                hash: B256::ZERO,
                reason: "pre-fork encoding".to_string(),
            }
            .is_candidate_local()
        );
    }
}
