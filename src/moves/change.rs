//! Atomic state changes.
//!
//! A `Move` carries everything needed to apply it and to reverse it. The
//! execute and undo paths assert that the state matches what the move
//! recorded, so a log replayed against the wrong state panics instead of
//! corrupting it.

use crate::core::{CashHolder, CertificateId, CompanyId, HexId, PlayerId, PortfolioId, TileId, TrainId};
use crate::game::{GameState, ManagerState};
use crate::ledger::CompanyStatus;
use crate::market::Cell;
use crate::rounds::ActiveRound;

/// One reversible change to the game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    /// Balanced cash transfer.
    Cash {
        from: CashHolder,
        to: CashHolder,
        amount: i64,
    },
    /// Change of a player's blocked bid cash.
    Blocked {
        player: PlayerId,
        before: i64,
        after: i64,
    },
    /// Certificate changes hands; `index` is its position in `from`.
    Certificate {
        cert: CertificateId,
        from: PortfolioId,
        index: usize,
        to: PortfolioId,
    },
    /// Train changes hands; `index` is its position in `from`.
    Train {
        train: TrainId,
        from: PortfolioId,
        index: usize,
        to: PortfolioId,
    },
    /// Company flags replaced.
    Company {
        company: CompanyId,
        before: Box<CompanyStatus>,
        after: Box<CompanyStatus>,
    },
    /// Price token moves. `from` holds the cell and stack position it left;
    /// `None` means it enters or leaves the grid.
    StockToken {
        company: CompanyId,
        from: Option<(Cell, usize)>,
        to: Option<Cell>,
    },
    /// Tile on a hex replaced.
    Tile {
        hex: HexId,
        before: (Option<TileId>, u8),
        after: (Option<TileId>, u8),
    },
    /// Base token placed on (`placed`) or removed from a hex at `index`.
    BaseToken {
        hex: HexId,
        company: CompanyId,
        index: usize,
        placed: bool,
    },
    /// The Bank is flagged broken.
    BankBroken,
    /// Sequencer state replaced.
    Manager {
        before: Box<ManagerState>,
        after: Box<ManagerState>,
    },
    /// Active round replaced.
    Round {
        before: Box<ActiveRound>,
        after: Box<ActiveRound>,
    },
}

impl Move {
    /// Apply the change.
    pub fn execute(&self, state: &mut GameState) {
        match self {
            Move::Cash { from, to, amount } => {
                adjust_cash(state, *from, -amount);
                adjust_cash(state, *to, *amount);
            }
            Move::Blocked { player, before, after } => {
                let p = state.players.get_mut(*player);
                assert_eq!(p.blocked, *before, "Blocked cash of {player} out of step");
                p.blocked = *after;
            }
            Move::Certificate { cert, from, index, to } => {
                let left = state.certs.transfer(*cert, *to);
                assert_eq!(left, (*from, *index), "{cert} not where the move expects");
            }
            Move::Train { train, from, index, to } => {
                let left = state.train_holdings.transfer(*train, *to);
                assert_eq!(left, (*from, *index), "{train} not where the move expects");
            }
            Move::Company { company, before, after } => {
                let core = state.companies[company.index()].core_mut();
                assert_eq!(&core.status, before.as_ref(), "Status of {} out of step", core.name);
                core.status = after.as_ref().clone();
            }
            Move::StockToken { company, from, to } => {
                if let Some((cell, index)) = from {
                    state.tokens.remove(*cell, *index, *company);
                }
                if let Some(cell) = to {
                    state.tokens.push(*cell, *company);
                }
                state.public_mut(*company).price = *to;
            }
            Move::Tile { hex, before, after } => {
                let h = state.map.hex_mut(*hex);
                assert_eq!((h.tile, h.rotation), *before, "Tile on {hex} out of step");
                h.tile = after.0;
                h.rotation = after.1;
            }
            Move::BaseToken { hex, company, index, placed } => {
                let tokens = &mut state.map.hex_mut(*hex).tokens;
                if *placed {
                    tokens.insert(*index, *company);
                } else {
                    assert_eq!(tokens.get(*index), Some(company), "Token of {company} missing");
                    tokens.remove(*index);
                }
            }
            Move::BankBroken => {
                assert!(!state.bank.broken, "Bank already broken");
                state.bank.broken = true;
            }
            Move::Manager { before, after } => {
                assert_eq!(&state.manager, before.as_ref(), "Manager state out of step");
                state.manager = after.as_ref().clone();
            }
            Move::Round { before, after } => {
                assert_eq!(&state.round, before.as_ref(), "Round state out of step");
                state.round = after.as_ref().clone();
            }
        }
    }

    /// Reverse the change.
    pub fn undo(&self, state: &mut GameState) {
        match self {
            Move::Cash { from, to, amount } => {
                adjust_cash(state, *to, -amount);
                adjust_cash(state, *from, *amount);
            }
            Move::Blocked { player, before, .. } => {
                state.players.get_mut(*player).blocked = *before;
            }
            Move::Certificate { cert, from, index, to } => {
                state.certs.restore(*cert, *from, *index, *to);
            }
            Move::Train { train, from, index, to } => {
                state.train_holdings.restore(*train, *from, *index, *to);
            }
            Move::Company { company, before, .. } => {
                state.companies[company.index()].core_mut().status = before.as_ref().clone();
            }
            Move::StockToken { company, from, to } => {
                if let Some(cell) = to {
                    let top = state.tokens.stack(*cell).len().saturating_sub(1);
                    state.tokens.remove(*cell, top, *company);
                }
                if let Some((cell, index)) = from {
                    state.tokens.insert(*cell, *index, *company);
                }
                state.public_mut(*company).price = from.map(|(cell, _)| cell);
            }
            Move::Tile { hex, before, .. } => {
                let h = state.map.hex_mut(*hex);
                h.tile = before.0;
                h.rotation = before.1;
            }
            Move::BaseToken { hex, company, index, placed } => {
                let tokens = &mut state.map.hex_mut(*hex).tokens;
                if *placed {
                    assert_eq!(tokens.get(*index), Some(company), "Token of {company} missing");
                    tokens.remove(*index);
                } else {
                    tokens.insert(*index, *company);
                }
            }
            Move::BankBroken => {
                state.bank.broken = false;
            }
            Move::Manager { before, .. } => {
                state.manager = before.as_ref().clone();
            }
            Move::Round { before, .. } => {
                state.round = before.as_ref().clone();
            }
        }
    }
}

fn adjust_cash(state: &mut GameState, holder: CashHolder, delta: i64) {
    match holder {
        CashHolder::Bank => state.bank.cash += delta,
        CashHolder::Player(player) => {
            let p = state.players.get_mut(player);
            p.cash += delta;
            assert!(p.cash >= 0, "{} cash went negative", p.name);
        }
        CashHolder::Company(company) => {
            let c = state.public_mut(company);
            c.cash += delta;
            assert!(c.cash >= 0, "{} treasury went negative", c.core.name);
        }
    }
}
