//! Ledger row appends.

use pointbank_core::{PointTransaction, Result};
use pointbank_store::LedgerTxn;

/// Appends ledger rows inside an open atomic unit.
///
/// Rows are never updated or deleted once recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransactionRecorder;

impl TransactionRecorder {
    /// Append `transaction` and return it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the append fails. The enclosing unit
    /// then rolls back every other write made with it.
    pub fn record(
        &self,
        txn: &mut dyn LedgerTxn,
        transaction: PointTransaction,
    ) -> Result<PointTransaction> {
        txn.append_transaction(&transaction)?;

        tracing::debug!(
            transaction_id = %transaction.id,
            recipient = %transaction.recipient,
            kind = ?transaction.kind,
            amount = transaction.amount,
            balance_after = transaction.balance_after,
            "Transaction recorded"
        );

        Ok(transaction)
    }
}
