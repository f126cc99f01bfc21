//! Ownership of certificates and trains.
//!
//! `Holdings` tracks which portfolio holds each item and keeps every
//! portfolio's items in acquisition order. Moves record the position an
//! item left from so that undo can put it back exactly where it was, which
//! keeps undone state identical to the state before the move.
//!
//! Items are registered once at setup and never leave the structure; a
//! closed private or a rusted train simply sits in the scrap heap.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::core::PortfolioId;

/// Item ownership across portfolios.
///
/// ```
/// use rust_18xx::core::{PortfolioId, TrainId};
/// use rust_18xx::ledger::Holdings;
///
/// let mut trains = Holdings::new();
/// trains.add(TrainId::new(0), PortfolioId::Ipo);
/// trains.add(TrainId::new(1), PortfolioId::Ipo);
///
/// let from = trains.transfer(TrainId::new(0), PortfolioId::Pool);
/// assert_eq!(from, (PortfolioId::Ipo, 0));
/// assert_eq!(trains.items(PortfolioId::Ipo), &[TrainId::new(1)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Holdings<T: Copy + Eq + Hash + Debug> {
    owners: FxHashMap<T, PortfolioId>,
    portfolios: FxHashMap<PortfolioId, Vec<T>>,
}

impl<T: Copy + Eq + Hash + Debug> Default for Holdings<T> {
    fn default() -> Self {
        Self {
            owners: FxHashMap::default(),
            portfolios: FxHashMap::default(),
        }
    }
}

impl<T: Copy + Eq + Hash + Debug> Holdings<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item at setup.
    ///
    /// Panics if the item is already registered.
    pub fn add(&mut self, item: T, to: PortfolioId) {
        if self.owners.insert(item, to).is_some() {
            panic!("{item:?} already registered");
        }
        self.portfolios.entry(to).or_default().push(item);
    }

    /// Current holder of an item.
    ///
    /// Panics if the item was never registered.
    #[must_use]
    pub fn owner(&self, item: T) -> PortfolioId {
        match self.owners.get(&item) {
            Some(&owner) => owner,
            None => panic!("{item:?} is not registered"),
        }
    }

    /// Items in a portfolio, in acquisition order.
    #[must_use]
    pub fn items(&self, portfolio: PortfolioId) -> &[T] {
        self.portfolios.get(&portfolio).map_or(&[], |v| v.as_slice())
    }

    /// Position of an item within its portfolio.
    #[must_use]
    pub fn position(&self, item: T) -> usize {
        let owner = self.owner(item);
        match self.items(owner).iter().position(|&i| i == item) {
            Some(index) => index,
            None => panic!("{item:?} missing from {owner}"),
        }
    }

    /// Move an item to the end of another portfolio.
    ///
    /// Returns the portfolio and position it left from.
    pub fn transfer(&mut self, item: T, to: PortfolioId) -> (PortfolioId, usize) {
        let from = self.owner(item);
        let index = self.position(item);
        self.take(item, from, index);
        self.owners.insert(item, to);
        self.portfolios.entry(to).or_default().push(item);
        (from, index)
    }

    /// Reverse a `transfer`: take the item off the end of `to` and put it
    /// back into `from` at `index`.
    ///
    /// Panics if the item is not the last one in `to`.
    pub fn restore(&mut self, item: T, from: PortfolioId, index: usize, to: PortfolioId) {
        let last = self.items(to).len().checked_sub(1);
        let last = match last {
            Some(last) if self.items(to)[last] == item => last,
            _ => panic!("{item:?} is not the latest item of {to}"),
        };
        self.take(item, to, last);
        self.owners.insert(item, from);
        let items = self.portfolios.entry(from).or_default();
        assert!(index <= items.len(), "Position {index} out of range for {from}");
        items.insert(index, item);
    }

    fn take(&mut self, item: T, from: PortfolioId, index: usize) {
        let items = match self.portfolios.get_mut(&from) {
            Some(items) => items,
            None => panic!("{from} holds nothing"),
        };
        assert_eq!(items.get(index), Some(&item), "{item:?} is not at {from}[{index}]");
        items.remove(index);
        if items.is_empty() {
            self.portfolios.remove(&from);
        }
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CertificateId, CompanyId, PlayerId};

    fn cert(n: u32) -> CertificateId {
        CertificateId::new(n)
    }

    #[test]
    fn test_add_and_owner() {
        let mut h = Holdings::new();
        h.add(cert(0), PortfolioId::Ipo);
        h.add(cert(1), PortfolioId::Unavailable);

        assert_eq!(h.owner(cert(0)), PortfolioId::Ipo);
        assert_eq!(h.items(PortfolioId::Unavailable), &[cert(1)]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_double_add_panics() {
        let mut h = Holdings::new();
        h.add(cert(0), PortfolioId::Ipo);
        h.add(cert(0), PortfolioId::Pool);
    }

    #[test]
    fn test_transfer_appends() {
        let mut h = Holdings::new();
        let player = PortfolioId::Player(PlayerId::new(0));
        h.add(cert(0), PortfolioId::Ipo);
        h.add(cert(1), PortfolioId::Ipo);
        h.add(cert(2), player);

        let from = h.transfer(cert(1), player);
        assert_eq!(from, (PortfolioId::Ipo, 1));
        assert_eq!(h.items(player), &[cert(2), cert(1)]);
        assert_eq!(h.owner(cert(1)), player);
    }

    #[test]
    fn test_restore_is_exact_inverse() {
        let mut h = Holdings::new();
        let company = PortfolioId::Company(CompanyId::new(2));
        for n in 0..4 {
            h.add(cert(n), PortfolioId::Ipo);
        }
        let before = h.clone();

        let (from, index) = h.transfer(cert(1), company);
        h.restore(cert(1), from, index, company);

        assert_eq!(h, before);
        assert!(h.items(company).is_empty());
    }

    #[test]
    #[should_panic(expected = "is not the latest item")]
    fn test_restore_out_of_order_panics() {
        let mut h = Holdings::new();
        h.add(cert(0), PortfolioId::Ipo);
        h.add(cert(1), PortfolioId::Ipo);
        h.transfer(cert(0), PortfolioId::Pool);
        h.transfer(cert(1), PortfolioId::Pool);
        h.restore(cert(0), PortfolioId::Ipo, 0, PortfolioId::Pool);
    }
}
