//! The move log: closed move sets plus a cursor.
//!
//! ## Lifecycle
//!
//! ```text
//! start() -> add(move)* -> finish()
//! ```
//!
//! Everything one player action changes lands in a single `MoveSet`.
//! Validation happens before `start`, so a set is never left half-open.
//! `finish` drops any undone sets after the cursor; empty sets are not
//! recorded.
//!
//! Sets are kept in an `im::Vector` so cloning the log for a snapshot is
//! cheap.

use im::Vector;
use smallvec::SmallVec;

use super::change::Move;
use crate::game::GameState;

/// The moves produced by one player action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveSet {
    moves: SmallVec<[Move; 8]>,
}

impl MoveSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    /// Re-apply every move in order.
    pub fn execute(&self, state: &mut GameState) {
        for mv in &self.moves {
            mv.execute(state);
        }
    }

    /// Reverse every move, last first.
    pub fn undo(&self, state: &mut GameState) {
        for mv in self.moves.iter().rev() {
            mv.undo(state);
        }
    }
}

/// Undo/redo history.
#[derive(Clone, Debug, Default)]
pub struct MoveStack {
    sets: Vector<MoveSet>,
    /// Number of sets currently applied.
    position: usize,
    open: Option<MoveSet>,
}

impl MoveStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new move set.
    ///
    /// Panics if one is already open.
    pub fn start(&mut self) {
        assert!(self.open.is_none(), "MoveSet already open");
        self.open = Some(MoveSet::new());
    }

    /// Record an already executed move in the open set.
    ///
    /// Panics if no set is open.
    pub fn add(&mut self, mv: Move) {
        match self.open.as_mut() {
            Some(set) => set.push(mv),
            None => panic!("No open MoveSet for {mv:?}"),
        }
    }

    /// Close the open set and append it, dropping the redo tail.
    ///
    /// Returns `false` if the set was empty and nothing was recorded.
    pub fn finish(&mut self) -> bool {
        let set = match self.open.take() {
            Some(set) => set,
            None => panic!("No open MoveSet to finish"),
        };
        if set.is_empty() {
            return false;
        }
        self.sets.truncate(self.position);
        self.sets.push_back(set);
        self.position += 1;
        true
    }

    /// Check if a set is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.open.is_none() && self.position > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.open.is_none() && self.position < self.sets.len()
    }

    /// Reverse the set before the cursor.
    pub fn undo(&mut self, state: &mut GameState) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.position -= 1;
        self.sets[self.position].undo(state);
        true
    }

    /// Re-apply the set after the cursor.
    pub fn redo(&mut self, state: &mut GameState) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.sets[self.position].execute(state);
        self.position += 1;
        true
    }

    /// Forget all history. Undo cannot cross this point.
    pub fn clear(&mut self) {
        assert!(self.open.is_none(), "Cannot clear with an open MoveSet");
        self.sets.clear();
        self.position = 0;
    }

    /// Number of recorded sets, including undone ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of sets currently applied.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}
