//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use pointbank_core::{Actor, EventId, TransactionId, UserId};

/// Length of an identifier encoded in a key.
const ID_LEN: usize = 16;

/// Create an attendance key.
///
/// Format: `user_id (16 bytes) || event_id (16 bytes)`
#[must_use]
pub fn attendance_key(user_id: &UserId, event_id: &EventId) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 * ID_LEN);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(event_id.as_bytes());
    key
}

/// Create a user-transaction index key.
///
/// Format: `user_id (16 bytes) || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, transactions for a user will be sorted by time.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = user_transactions_prefix(user_id);
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for a user.
#[must_use]
pub fn user_transactions_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an actor-transaction index key.
///
/// Format: `role (1 byte) || actor_id (16 bytes) || transaction_id (16 bytes)`
///
/// The role byte keeps identically-valued IDs of different roles apart.
#[must_use]
pub fn actor_transaction_key(actor: &Actor, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = actor_transactions_prefix(actor);
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions caused by an actor.
#[must_use]
pub fn actor_transactions_prefix(actor: &Actor) -> Vec<u8> {
    let role = match actor {
        Actor::Admin(_) => b'a',
        Actor::Facilitator(_) => b'f',
        Actor::User(_) => b'u',
    };
    let mut key = Vec::with_capacity(1 + 2 * ID_LEN);
    key.push(role);
    key.extend_from_slice(actor.id_bytes());
    key
}

/// Create a scan-identifier index key.
#[must_use]
pub fn scan_id_key(scan_id: &str) -> Vec<u8> {
    scan_id.as_bytes().to_vec()
}

/// Decode a 16-byte identifier stored as an index value.
///
/// Returns `None` if the value has the wrong length.
#[must_use]
pub fn decode_id(value: &[u8]) -> Option<[u8; ID_LEN]> {
    value.try_into().ok()
}

/// Extract the trailing transaction ID from an index key.
///
/// Returns `None` if the key is shorter than a transaction ID.
#[must_use]
pub fn trailing_transaction_id(key: &[u8]) -> Option<TransactionId> {
    let start = key.len().checked_sub(ID_LEN)?;
    decode_id(&key[start..]).map(TransactionId::from_bytes)
}
