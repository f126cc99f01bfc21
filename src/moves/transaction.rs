//! Write access to the game state during one action.
//!
//! A `Transaction` is the only way rounds and the sequencer change state.
//! Each helper builds the matching `Move`, applies it, and records it in the
//! open move set. Reads go through `state()`.

use crate::core::{
    CashHolder, CertificateId, CompanyId, HexId, PlayerId, PortfolioId, ReportLog, TileId, TrainId,
};
use crate::game::{GameState, ManagerState};
use crate::ledger::CompanyStatus;
use crate::market::Cell;
use crate::rounds::ActiveRound;

use super::change::Move;
use super::stack::MoveStack;

pub struct Transaction<'a> {
    state: &'a mut GameState,
    stack: &'a mut MoveStack,
    report: &'a mut ReportLog,
}

impl<'a> Transaction<'a> {
    /// Wrap state and log. The stack must have an open set.
    pub fn new(state: &'a mut GameState, stack: &'a mut MoveStack, report: &'a mut ReportLog) -> Self {
        assert!(stack.is_open(), "Transaction needs an open MoveSet");
        Self { state, stack, report }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Apply and record a move.
    pub fn execute(&mut self, mv: Move) {
        mv.execute(self.state);
        self.stack.add(mv);
    }

    /// Append a line to the report channel.
    pub fn report(&mut self, line: impl Into<String>) {
        self.report.add(line);
    }

    /// Transfer cash. Zero amounts are not recorded.
    pub fn cash(&mut self, from: impl Into<CashHolder>, to: impl Into<CashHolder>, amount: i64) {
        assert!(amount >= 0, "Negative transfer of {amount}");
        if amount == 0 {
            return;
        }
        self.execute(Move::Cash {
            from: from.into(),
            to: to.into(),
            amount,
        });
    }

    /// Transfer cash to or from the Bank.
    pub fn bank_pays(&mut self, to: impl Into<CashHolder>, amount: i64) {
        self.cash(CashHolder::Bank, to, amount);
    }

    pub fn pay_bank(&mut self, from: impl Into<CashHolder>, amount: i64) {
        self.cash(from, CashHolder::Bank, amount);
    }

    pub fn set_blocked(&mut self, player: PlayerId, after: i64) {
        let before = self.state.players[player].blocked;
        if before != after {
            self.execute(Move::Blocked { player, before, after });
        }
    }

    /// Move a certificate to the end of another portfolio.
    pub fn move_certificate(&mut self, cert: CertificateId, to: PortfolioId) {
        let from = self.state.certs.owner(cert);
        if from == to {
            return;
        }
        let index = self.state.certs.position(cert);
        self.execute(Move::Certificate { cert, from, index, to });
    }

    /// Move a train to the end of another portfolio.
    pub fn move_train(&mut self, train: TrainId, to: PortfolioId) {
        let from = self.state.train_holdings.owner(train);
        if from == to {
            return;
        }
        let index = self.state.train_holdings.position(train);
        self.execute(Move::Train { train, from, index, to });
    }

    /// Change company flags.
    pub fn update_company(&mut self, company: CompanyId, change: impl FnOnce(&mut CompanyStatus)) {
        let before = self.state.company(company).status().clone();
        let mut after = before.clone();
        change(&mut after);
        if before != after {
            self.execute(Move::Company {
                company,
                before: Box::new(before),
                after: Box::new(after),
            });
        }
    }

    /// Move a company's price token, or take it off the grid with `None`.
    pub fn move_price(&mut self, company: CompanyId, to: Option<Cell>) {
        let current = self.state.public(company).price;
        if current == to {
            return;
        }
        let from = current.map(|cell| {
            let index = self
                .state
                .tokens
                .stack_index(cell, company)
                .unwrap_or_else(|| panic!("{company} token missing from {cell}"));
            (cell, index)
        });
        self.execute(Move::StockToken { company, from, to });
    }

    pub fn set_tile(&mut self, hex: HexId, tile: TileId, rotation: u8) {
        let h = self.state.map.hex(hex);
        let before = (h.tile, h.rotation);
        self.execute(Move::Tile {
            hex,
            before,
            after: (Some(tile), rotation),
        });
    }

    pub fn place_token(&mut self, hex: HexId, company: CompanyId) {
        let index = self.state.map.hex(hex).tokens.len();
        self.execute(Move::BaseToken {
            hex,
            company,
            index,
            placed: true,
        });
    }

    pub fn remove_token(&mut self, hex: HexId, company: CompanyId) {
        let tokens = &self.state.map.hex(hex).tokens;
        let index = tokens
            .iter()
            .position(|&c| c == company)
            .unwrap_or_else(|| panic!("{company} has no token on {hex}"));
        self.execute(Move::BaseToken {
            hex,
            company,
            index,
            placed: false,
        });
    }

    pub fn break_bank(&mut self) {
        self.execute(Move::BankBroken);
    }

    /// Change sequencer state.
    pub fn update_manager(&mut self, change: impl FnOnce(&mut ManagerState)) {
        let before = self.state.manager.clone();
        let mut after = before.clone();
        change(&mut after);
        if before != after {
            self.execute(Move::Manager {
                before: Box::new(before),
                after: Box::new(after),
            });
        }
    }

    /// Replace the active round.
    pub fn set_round(&mut self, round: ActiveRound) {
        if self.state.round == round {
            return;
        }
        let before = self.state.round.clone();
        self.execute(Move::Round {
            before: Box::new(before),
            after: Box::new(round),
        });
    }
}
