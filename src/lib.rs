//! Per-user point balances with an append-only history
//!
//! [`PointService`] credits and debits user balances. Mutations for the same user are
//! serialized through a [`KeyLockManager`], so concurrent callers never lose an update and a
//! balance never goes below zero. Storage is abstracted behind the [`ports`] traits, with
//! in-memory implementations in [`adapters::memory`].

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod lock;
pub mod ports;

pub use commands::{Error, PointService};
pub use config::Config;
pub use domain::{BalanceRecord, HistoryEntry, TransactionKind, UserId};
pub use lock::{KeyLockGuard, KeyLockManager};
