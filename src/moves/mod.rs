//! Transaction log: reversible moves, move sets, undo/redo.

pub mod change;
pub mod stack;
pub mod transaction;

pub use change::Move;
pub use stack::{MoveSet, MoveStack};
pub use transaction::Transaction;
