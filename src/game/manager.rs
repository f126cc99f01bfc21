//! Round sequencing.
//!
//! `ManagerState` is the cross-round bookkeeping: priority deal, phase,
//! round counters and the end-of-game flags. It lives inside `GameState`
//! and changes only through `Move::Manager`, so a round transition is
//! undone together with the action that caused it.
//!
//! ## Sequence
//!
//! ```text
//! Start ──unsold──> OR set ──> Start (unsold items left) or Stock
//!   └───sold out──> Stock ──> OR set ──> ...
//! ```
//!
//! An OR set has as many operating rounds as the phase current when it
//! starts. A broken bank or a market end cell finishes the game after the
//! operating round in progress or after the whole set, depending on
//! `GameEndRule`. Bankruptcy finishes it at once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{Action, GameEndRule, PlayerId};
use crate::moves::Transaction;
use crate::rounds::{
    ActiveRound, OperatingRound, Round, RoundStatus, ShareSellingRound, StartRound, StockRound,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerState {
    /// Holder of the priority deal.
    pub priority: PlayerId,
    /// Index into the phase table.
    pub phase: usize,
    /// Number of the latest stock round; 0 before the first.
    pub stock_round: u32,
    /// Operating round within the current set, from 1.
    pub operating_round: u32,
    pub operating_rounds_in_set: u32,
    /// A market end cell was reached.
    pub end_triggered: bool,
    pub game_over: bool,
    pub bankrupt: Option<PlayerId>,
    /// Accepted actions so far.
    pub action_count: u32,
}

impl ManagerState {
    #[must_use]
    pub fn new(first_round_is_stock: bool) -> Self {
        Self {
            priority: PlayerId::new(0),
            phase: 0,
            stock_round: u32::from(first_round_is_stock),
            operating_round: 0,
            operating_rounds_in_set: 0,
            end_triggered: false,
            game_over: false,
            bankrupt: None,
            action_count: 0,
        }
    }
}

/// What processing one action did beyond the round itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// A company turn or a round ended; undo history is cut here.
    pub checkpoint: bool,
    /// The Bank broke during this action.
    pub bank_broken: bool,
}

/// Execute a validated action and run whatever it sets off.
pub fn process(tx: &mut Transaction, player: PlayerId, action: &Action) -> Outcome {
    tx.update_manager(|m| m.action_count += 1);
    let mut round = tx.state().round.clone();
    let status = round.execute(tx, player, action);

    let mut outcome = Outcome {
        bank_broken: check_bank(tx),
        ..Outcome::default()
    };
    outcome.checkpoint = settle(tx, round, status);
    outcome.bank_broken |= check_bank(tx);
    outcome
}

/// Flag the Bank broken the first time it runs dry.
fn check_bank(tx: &mut Transaction) -> bool {
    if !tx.state().bank.is_breaking() {
        return false;
    }
    tx.break_bank();
    tx.report("The Bank is broken");
    info!(cash = tx.state().bank.cash, "bank broken");
    true
}

/// Store the round back and follow its status through round changes.
/// Returns true when a checkpoint was passed.
fn settle(tx: &mut Transaction, mut round: ActiveRound, mut status: RoundStatus) -> bool {
    let mut checkpoint = false;
    loop {
        match status {
            RoundStatus::Continue => break,
            RoundStatus::TurnEnded => {
                checkpoint = true;
                break;
            }
            RoundStatus::NeedsCash(pending) => {
                let ActiveRound::Operating(operating) = round else {
                    panic!("Train purchase outside an operating round");
                };
                round = ActiveRound::ShareSelling(ShareSellingRound::new(operating, pending));
                status = round.begin(tx);
            }
            RoundStatus::Bankrupt(player) => {
                declare_bankruptcy(tx, player);
                checkpoint = true;
                break;
            }
            RoundStatus::Finished => {
                if let ActiveRound::ShareSelling(selling) = round {
                    let closed = selling.company_closed(tx.state());
                    let mut operating = *selling.operating;
                    if closed {
                        let name = tx.state().company(selling.pending.company).name().to_string();
                        tx.report(format!("{name} has closed; its train purchase is cancelled"));
                        status = operating.end_turn(tx);
                    } else {
                        operating.complete_purchase(tx, &selling.pending);
                        status = RoundStatus::Continue;
                    }
                    round = ActiveRound::Operating(operating);
                    continue;
                }
                checkpoint = true;
                if ends_game(tx, &round) {
                    finish_game(tx);
                    break;
                }
                round = next_round(tx, &round);
                debug!(round = %round.name(), "round starts");
                status = round.begin(tx);
            }
        }
    }
    tx.set_round(round);
    checkpoint
}

/// Check if the game is over now that `finished` has ended.
fn ends_game(tx: &Transaction, finished: &ActiveRound) -> bool {
    let state = tx.state();
    if !matches!(finished, ActiveRound::Operating(_)) {
        return false;
    }
    let manager = &state.manager;
    if !(state.bank.broken || manager.end_triggered) {
        return false;
    }
    match state.config.end_rule {
        GameEndRule::CurrentOperatingRound => true,
        GameEndRule::CurrentSetOfOperatingRounds => {
            manager.operating_round >= manager.operating_rounds_in_set
        }
    }
}

/// Build the round that follows `finished` and update the counters.
fn next_round(tx: &mut Transaction, finished: &ActiveRound) -> ActiveRound {
    match finished {
        ActiveRound::Start(start) if start.has_unsold() => start_operating_set(tx),
        ActiveRound::Start(_) => start_stock_round(tx),
        ActiveRound::Stock(_) => start_operating_set(tx),
        ActiveRound::Operating(_) => {
            let manager = &tx.state().manager;
            if manager.operating_round < manager.operating_rounds_in_set {
                tx.update_manager(|m| m.operating_round += 1);
                let manager = &tx.state().manager;
                let (set, number) = (manager.stock_round, manager.operating_round);
                return ActiveRound::Operating(OperatingRound::new(tx.state(), set, number));
            }
            let priority = tx.state().manager.priority;
            let unsold = StartRound::with_unsold(tx.state(), priority);
            if unsold.has_unsold() {
                ActiveRound::Start(unsold)
            } else {
                start_stock_round(tx)
            }
        }
        ActiveRound::ShareSelling(_) => panic!("Share selling hands back to its operating round"),
    }
}

fn start_stock_round(tx: &mut Transaction) -> ActiveRound {
    tx.update_manager(|m| m.stock_round += 1);
    let manager = &tx.state().manager;
    ActiveRound::Stock(StockRound::new(manager.stock_round, manager.priority))
}

fn start_operating_set(tx: &mut Transaction) -> ActiveRound {
    let rounds = tx.state().phase().operating_rounds;
    tx.update_manager(|m| {
        m.operating_round = 1;
        m.operating_rounds_in_set = rounds;
    });
    let set = tx.state().manager.stock_round;
    ActiveRound::Operating(OperatingRound::new(tx.state(), set, 1))
}

fn declare_bankruptcy(tx: &mut Transaction, player: PlayerId) {
    let name = tx.state().players[player].name.clone();
    tx.report(format!("{name} is bankrupt"));
    info!(player = %name, "bankruptcy");
    tx.update_manager(|m| m.bankrupt = Some(player));
    finish_game(tx);
}

fn finish_game(tx: &mut Transaction) {
    tx.update_manager(|m| m.game_over = true);
    tx.report("Game over");
    let state = tx.state();
    let standings: Vec<String> = state
        .players
        .player_ids()
        .map(|p| format!("{} {}", state.players[p].name, state.net_worth(p)))
        .collect();
    let line = format!("Final worth: {}", standings.join(", "));
    tx.report(line);
}
