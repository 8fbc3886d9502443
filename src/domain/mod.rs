use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier of a point holder
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Current point balance of a user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceRecord {
    pub user_id: UserId,
    /// Current amount of points
    ///
    /// Unsigned, so a stored balance can never be negative.
    pub balance: u64,
    /// Timestamp of the last write, assigned by the balance store
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Zero balance for a user that has never been written
    pub fn empty(user_id: UserId, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance: 0,
            updated_at,
        }
    }
}

/// Direction of a balance change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Points were added
    Credit,
    /// Points were spent
    Debit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Credit => f.write_str("CREDIT"),
            TransactionKind::Debit => f.write_str("DEBIT"),
        }
    }
}

/// One immutable ledger line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Identifier assigned by the history store
    pub id: Uuid,
    pub user_id: UserId,
    /// Size of the change, always positive
    pub amount: u64,
    pub kind: TransactionKind,
    /// Same timestamp as the balance write that produced this entry
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Amount with the sign of its kind applied
    pub fn signed_amount(&self) -> i128 {
        match self.kind {
            TransactionKind::Credit => self.amount as i128,
            TransactionKind::Debit => -(self.amount as i128),
        }
    }
}

/// Balance obtained by replaying a user's history from zero
///
/// When no mutation is in flight for the user, this equals the stored balance.
pub fn ledger_balance(entries: &[HistoryEntry]) -> i128 {
    entries.iter().map(HistoryEntry::signed_amount).sum()
}
