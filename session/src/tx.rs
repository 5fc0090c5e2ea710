//! Submission pipeline for the two mutating market calls.

use tracing::{info, warn};

use crate::binding::ContractBinding;
use crate::encoding::encode_choice;
use crate::errors::{classify, SessionError};
use crate::provider::{MarketContract, WalletProvider};
use crate::types::{Receipt, TxHash, TxOutcome};
use crate::units::parse_amount;

/// Stakes `amount` (a decimal string) on `choice` and waits for inclusion.
///
/// The amount is validated before anything touches the network.
pub async fn place_bet<P: WalletProvider>(
    provider: &P,
    binding: &ContractBinding<P::Contract>,
    amount: &str,
    choice: bool,
    decimals: u32,
) -> Result<Receipt, SessionError> {
    let value = parse_amount(amount, decimals)?;
    let payload = encode_choice(choice);

    let gas_price = provider.gas_price().await.map_err(classify)?;
    info!(signer = %binding.signer, value, gas_price, "submitting bet");

    let tx = binding
        .contract()
        .place_bet(payload, value, gas_price)
        .await
        .map_err(classify)?;

    await_confirmation(binding.contract(), &tx).await
}

/// Fixes the market outcome. Only the oracle may call this; anyone else is
/// refused locally.
pub async fn resolve_market<C: MarketContract>(
    binding: &ContractBinding<C>,
    outcome: bool,
) -> Result<Receipt, SessionError> {
    if !binding.is_oracle {
        return Err(SessionError::Unauthorized);
    }

    info!(signer = %binding.signer, outcome, "submitting resolution");
    let tx = binding.contract().resolve(outcome).await.map_err(classify)?;

    await_confirmation(binding.contract(), &tx).await
}

async fn await_confirmation<C: MarketContract>(
    contract: &C,
    tx: &TxHash,
) -> Result<Receipt, SessionError> {
    let receipt = contract.wait_for_receipt(tx).await.map_err(classify)?;

    if !receipt.succeeded() {
        warn!(%tx, block = receipt.block_number, "transaction reverted");
        return Err(SessionError::TransactionReverted);
    }

    info!(%tx, block = receipt.block_number, "transaction confirmed");
    Ok(receipt)
}

pub fn outcome_of(result: &Result<Receipt, SessionError>) -> TxOutcome {
    match result {
        Ok(receipt) => TxOutcome::Confirmed(receipt.tx_hash.clone()),
        Err(SessionError::TransactionReverted) => TxOutcome::Reverted,
        Err(SessionError::UserRejected) => TxOutcome::Rejected,
        Err(err) => TxOutcome::Failed(err.to_string()),
    }
}
