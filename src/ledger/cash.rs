//! Cash holders other than companies: players and the Bank.

use serde::{Deserialize, Serialize};

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub cash: i64,
    /// Cash committed to open start-round bids.
    pub blocked: i64,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cash: 0,
            blocked: 0,
        }
    }

    /// Cash not committed to bids.
    #[must_use]
    pub fn free_cash(&self) -> i64 {
        self.cash - self.blocked
    }
}

/// The Bank's cash. Once broken it stays broken in forward play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub cash: i64,
    pub broken: bool,
}

impl Bank {
    #[must_use]
    pub fn new(cash: i64) -> Self {
        Self {
            cash,
            broken: false,
        }
    }

    /// Check if the Bank has run out of money without being flagged yet.
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        !self.broken && self.cash <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_cash() {
        let mut p = Player::new("Alice");
        p.cash = 600;
        p.blocked = 225;
        assert_eq!(p.free_cash(), 375);
    }

    #[test]
    fn test_bank_breaking() {
        let mut bank = Bank::new(100);
        assert!(!bank.is_breaking());
        bank.cash = 0;
        assert!(bank.is_breaking());
        bank.broken = true;
        assert!(!bank.is_breaking());
    }
}
