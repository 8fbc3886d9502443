use serde::Deserialize;

/// Policy knobs for [`PointService`](crate::commands::PointService)
///
/// Every field has a default, so an empty document deserializes to [`Config::default`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Highest balance a credit may produce
    ///
    /// `None` leaves balances unbounded (up to `u64::MAX`).
    pub max_balance: Option<u64>,
}

impl Config {
    /// Whether `balance` is allowed under this policy
    pub fn allows(&self, balance: u64) -> bool {
        self.max_balance.map_or(true, |max| balance <= max)
    }
}
