//! Round state machines.
//!
//! Each round type implements `Round`:
//! - `current_player`: whose input the round waits for
//! - `candidate_actions`: actions worth offering, before validation
//! - `validate`: ordered precondition checks, first failure wins
//! - `execute`: apply a validated action through a `Transaction`
//!
//! `execute` never fails. Anything that could go wrong was checked by
//! `validate`, and the session never calls `execute` without it.
//!
//! Rounds report what happened through `RoundStatus`; the sequencer decides
//! what runs next. There are no callbacks between rounds.

pub mod operating;
pub mod selling;
pub mod start;
pub mod stock;

pub use operating::{OperatingRound, OperatingStep};
pub use selling::ShareSellingRound;
pub use start::StartRound;
pub use stock::StockRound;

use serde::{Deserialize, Serialize};

use crate::core::{Action, CompanyId, PlayerId, TrainId, ValidationError};
use crate::game::GameState;
use crate::moves::Transaction;

/// A train purchase waiting for the president to raise cash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPurchase {
    pub company: CompanyId,
    pub president: PlayerId,
    pub train: TrainId,
    pub price: i64,
    /// Amount the president must contribute.
    pub president_cash: i64,
}

/// Outcome of one executed action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// Same round, same turn or next player.
    Continue,
    /// An operating company finished its turn.
    TurnEnded,
    /// The round is over.
    Finished,
    /// A president must sell shares to pay for a train.
    NeedsCash(PendingPurchase),
    /// A player cannot meet an obligation.
    Bankrupt(PlayerId),
}

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Shared first place.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Rank players by net worth.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let worth: Vec<(PlayerId, i64)> = state
            .players
            .player_ids()
            .map(|p| (p, state.net_worth(p)))
            .collect();
        let best = worth.iter().map(|&(_, w)| w).max().unwrap_or(0);
        let winners: Vec<PlayerId> = worth
            .into_iter()
            .filter(|&(_, w)| w == best)
            .map(|(p, _)| p)
            .collect();
        match winners.as_slice() {
            [single] => GameResult::Winner(*single),
            _ => GameResult::Winners(winners),
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
        }
    }
}

/// Turn logic of one round type.
pub trait Round {
    /// Round name for reports, e.g. "Stock round 2".
    fn name(&self) -> String;

    /// The player expected to act.
    fn current_player(&self, state: &GameState) -> PlayerId;

    /// Actions to consider for the current player. May include illegal
    /// ones; `possible_actions` filters them.
    fn candidate_actions(&self, state: &GameState) -> Vec<Action>;

    /// Check an action without changing anything.
    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError>;

    /// Apply a validated action.
    fn execute(&mut self, tx: &mut Transaction, player: PlayerId, action: &Action) -> RoundStatus;

    /// Work done when the round becomes active. May finish it at once.
    fn begin(&mut self, _tx: &mut Transaction) -> RoundStatus {
        RoundStatus::Continue
    }

    /// Legal actions for the current player.
    fn possible_actions(&self, state: &GameState) -> Vec<Action> {
        let player = self.current_player(state);
        self.candidate_actions(state)
            .into_iter()
            .filter(|action| self.validate(state, player, action).is_ok())
            .collect()
    }
}

/// The round in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveRound {
    Start(StartRound),
    Stock(StockRound),
    Operating(OperatingRound),
    ShareSelling(ShareSellingRound),
}

impl ActiveRound {
    fn inner(&self) -> &dyn Round {
        match self {
            ActiveRound::Start(r) => r,
            ActiveRound::Stock(r) => r,
            ActiveRound::Operating(r) => r,
            ActiveRound::ShareSelling(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Round {
        match self {
            ActiveRound::Start(r) => r,
            ActiveRound::Stock(r) => r,
            ActiveRound::Operating(r) => r,
            ActiveRound::ShareSelling(r) => r,
        }
    }
}

impl Round for ActiveRound {
    fn name(&self) -> String {
        self.inner().name()
    }

    fn current_player(&self, state: &GameState) -> PlayerId {
        self.inner().current_player(state)
    }

    fn candidate_actions(&self, state: &GameState) -> Vec<Action> {
        self.inner().candidate_actions(state)
    }

    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError> {
        self.inner().validate(state, player, action)
    }

    fn execute(&mut self, tx: &mut Transaction, player: PlayerId, action: &Action) -> RoundStatus {
        self.inner_mut().execute(tx, player, action)
    }

    fn begin(&mut self, tx: &mut Transaction) -> RoundStatus {
        self.inner_mut().begin(tx)
    }

    fn possible_actions(&self, state: &GameState) -> Vec<Action> {
        self.inner().possible_actions(state)
    }
}

/// Reject an action that the current round has no use for.
pub(crate) fn wrong_round(action: &Action) -> ValidationError {
    ValidationError::WrongRound {
        action: action.name(),
    }
}
