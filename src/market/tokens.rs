//! Company price tokens on the grid.
//!
//! Each cell keeps its tokens in arrival order; a company arriving on an
//! occupied cell goes to the end of the stack. Operating order breaks ties
//! on stack position.

use rustc_hash::FxHashMap;

use super::space::Cell;
use crate::core::CompanyId;

/// Token stacks per occupied cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketTokens {
    stacks: FxHashMap<Cell, Vec<CompanyId>>,
}

impl MarketTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens on a cell, oldest first.
    #[must_use]
    pub fn stack(&self, cell: Cell) -> &[CompanyId] {
        self.stacks.get(&cell).map_or(&[], |v| v.as_slice())
    }

    /// Position of a company within its cell's stack.
    #[must_use]
    pub fn stack_index(&self, cell: Cell, company: CompanyId) -> Option<usize> {
        self.stack(cell).iter().position(|&c| c == company)
    }

    /// Put a token on top of a cell's stack.
    pub fn push(&mut self, cell: Cell, company: CompanyId) {
        self.stacks.entry(cell).or_default().push(company);
    }

    /// Insert a token at a stack position.
    pub fn insert(&mut self, cell: Cell, index: usize, company: CompanyId) {
        let stack = self.stacks.entry(cell).or_default();
        assert!(index <= stack.len(), "Stack index {index} out of range at {cell}");
        stack.insert(index, company);
    }

    /// Remove a token from a known stack position.
    ///
    /// Panics if the company is not at that position.
    pub fn remove(&mut self, cell: Cell, index: usize, company: CompanyId) {
        let stack = self
            .stacks
            .get_mut(&cell)
            .unwrap_or_else(|| panic!("No tokens at {cell}"));
        assert_eq!(
            stack.get(index).copied(),
            Some(company),
            "{company} is not at position {index} of {cell}"
        );
        stack.remove(index);
        if stack.is_empty() {
            self.stacks.remove(&cell);
        }
    }

    /// Total number of tokens on the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_order() {
        let mut tokens = MarketTokens::new();
        let cell = Cell::new(1, 1);
        tokens.push(cell, CompanyId::new(3));
        tokens.push(cell, CompanyId::new(1));

        assert_eq!(tokens.stack(cell), &[CompanyId::new(3), CompanyId::new(1)]);
        assert_eq!(tokens.stack_index(cell, CompanyId::new(1)), Some(1));
    }

    #[test]
    fn test_remove_and_reinsert_restores_state() {
        let mut tokens = MarketTokens::new();
        let cell = Cell::new(0, 2);
        tokens.push(cell, CompanyId::new(0));
        tokens.push(cell, CompanyId::new(1));
        let before = tokens.clone();

        tokens.remove(cell, 0, CompanyId::new(0));
        tokens.insert(cell, 0, CompanyId::new(0));
        assert_eq!(tokens, before);
    }

    #[test]
    fn test_empty_cells_are_dropped() {
        let mut tokens = MarketTokens::new();
        tokens.push(Cell::new(2, 2), CompanyId::new(5));
        tokens.remove(Cell::new(2, 2), 0, CompanyId::new(5));

        assert!(tokens.is_empty());
        assert_eq!(tokens, MarketTokens::new());
    }

    #[test]
    #[should_panic(expected = "is not at position")]
    fn test_remove_wrong_position_panics() {
        let mut tokens = MarketTokens::new();
        tokens.push(Cell::new(0, 0), CompanyId::new(1));
        tokens.push(Cell::new(0, 0), CompanyId::new(2));
        tokens.remove(Cell::new(0, 0), 0, CompanyId::new(2));
    }
}
