//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe seat identifier. Seats are 0-based and follow the table order
//! fixed at game start, which is also the turn order of every round.
//!
//! ## PlayerMap
//!
//! Per-player storage backed by `Vec` for O(1) access, indexed by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier supporting up to 255 players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat to the left of this one.
    ///
    /// ```
    /// use rust_18xx::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(1).next(3), PlayerId::new(2));
    /// assert_eq!(PlayerId::new(2).next(3), PlayerId::new(0));
    /// ```
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.index() + 1) % player_count) as u8)
    }

    /// Every other seat in turn order, starting with the one after `self`.
    pub fn following(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        let start = self.index();
        (1..player_count).map(move |offset| PlayerId(((start + offset) % player_count) as u8))
    }

    /// Iterate over all seats for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use rust_18xx::core::{PlayerId, PlayerMap};
///
/// let mut cash: PlayerMap<i64> = PlayerMap::with_value(4, 600);
/// cash[PlayerId::new(1)] -= 100;
/// assert_eq!(cash[PlayerId::new(1)], 500);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8).map(|i| factory(PlayerId(i))).collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(format!("{}", PlayerId::new(3)), "Player 3");
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(PlayerId::new(0).next(4), PlayerId::new(1));
        assert_eq!(PlayerId::new(3).next(4), PlayerId::new(0));
    }

    #[test]
    fn test_following_skips_self() {
        let seats: Vec<_> = PlayerId::new(2).following(4).collect();
        assert_eq!(seats, vec![PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
    }

    #[test]
    fn test_player_map_factory() {
        let map: PlayerMap<i64> = PlayerMap::new(3, |p| p.index() as i64 * 100);

        assert_eq!(map[PlayerId::new(0)], 0);
        assert_eq!(map[PlayerId::new(2)], 200);
        assert_eq!(map.player_count(), 3);
    }

    #[test]
    fn test_player_map_iter_in_seat_order() {
        let map: PlayerMap<i64> = PlayerMap::new(3, |p| p.index() as i64);

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs[0], (PlayerId::new(0), &0));
        assert_eq!(pairs[2], (PlayerId::new(2), &2));
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i64> = PlayerMap::with_value(2, 450);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i64> = PlayerMap::with_value(0, 0);
    }
}
