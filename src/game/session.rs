//! A running game.
//!
//! `GameSession` is the host-facing API. It owns the state, the undo log,
//! the report channels and the action history, and is the only place where
//! move sets are opened and closed.
//!
//! Processing an action:
//!
//! 1. Reject it if the game is over, the wrong player acts, or the round's
//!    checks fail. Nothing is opened for a rejected action.
//! 2. Open a move set, run the action and everything it sets off, close
//!    the set.
//! 3. At a checkpoint (end of a company's turn or of a round) drop the undo
//!    history.

use tracing::{debug, info};

use crate::core::{
    Action, ActionRecord, ConfigError, GameConfig, GameRng, PlayerId, ReportLog, ValidationError,
};
use crate::moves::{MoveStack, Transaction};
use crate::rounds::{GameResult, Round};

use super::manager;
use super::state::GameState;

#[derive(Debug)]
pub struct GameSession {
    state: GameState,
    stack: MoveStack,
    report: ReportLog,
    history: Vec<ActionRecord>,
    /// Undone records, most recent last.
    undone: Vec<ActionRecord>,
    rng: GameRng,
    just_broken: bool,
}

impl GameSession {
    /// Seat the players and set up the first round. With
    /// `randomize_seating` the seating order is shuffled with `seed`.
    pub fn new(config: GameConfig, names: &[&str], seed: u64) -> Result<Self, ConfigError> {
        let mut rng = GameRng::new(seed);
        let mut seating = names.to_vec();
        if config.randomize_seating {
            rng.shuffle(&mut seating);
        }
        let state = GameState::new(config, &seating)?;
        info!(game = %state.config.name, players = seating.len(), seed, "game created");

        Ok(Self {
            state,
            stack: MoveStack::new(),
            report: ReportLog::new(),
            history: Vec::new(),
            undone: Vec::new(),
            rng,
            just_broken: false,
        })
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn report(&self) -> &ReportLog {
        &self.report
    }

    /// Seed the session was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Accepted actions since the start, without undone ones.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// The player whose input the game waits for.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.state.round.current_player(&self.state)
    }

    /// Legal actions for the current player.
    #[must_use]
    pub fn possible_actions(&self) -> Vec<Action> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.state.round.possible_actions(&self.state)
    }

    /// Process an action for the current player. Returns false if it was
    /// rejected; the reason is in `last_error`.
    pub fn process(&mut self, action: Action) -> bool {
        let player = self.current_player();
        self.process_as(player, action)
    }

    /// Process an action on behalf of `player`.
    pub fn process_as(&mut self, player: PlayerId, action: Action) -> bool {
        match self.try_process(player, &action) {
            Ok(()) => true,
            Err(e) => {
                debug!(%player, action = action.name(), error = %e, "action rejected");
                self.report.set_error(e.to_string());
                false
            }
        }
    }

    /// Process an action, returning why it was rejected.
    pub fn try_process(&mut self, player: PlayerId, action: &Action) -> Result<(), ValidationError> {
        self.validate(player, action)?;
        self.report.clear_error();

        self.stack.start();
        let outcome = {
            let mut tx = Transaction::new(&mut self.state, &mut self.stack, &mut self.report);
            manager::process(&mut tx, player, action)
        };
        self.stack.finish();

        let sequence = self.history.len() as u32;
        self.history.push(ActionRecord::new(player, action.clone(), sequence));
        self.undone.clear();
        self.just_broken = outcome.bank_broken;
        if outcome.checkpoint {
            self.stack.clear();
        }
        if self.is_game_over() {
            info!(actions = self.history.len(), "game over");
        }
        Ok(())
    }

    fn validate(&self, player: PlayerId, action: &Action) -> Result<(), ValidationError> {
        if self.is_game_over() {
            return Err(ValidationError::GameOver);
        }
        let expected = self.current_player();
        if player != expected {
            return Err(ValidationError::NotYourTurn { player, expected });
        }
        self.state.round.validate(&self.state, player, action)
    }

    /// Take back the latest action. Returns false if there is nothing to
    /// undo since the last checkpoint.
    pub fn undo(&mut self) -> bool {
        if !self.stack.undo(&mut self.state) {
            return false;
        }
        if let Some(record) = self.history.pop() {
            self.undone.push(record);
        }
        self.just_broken = false;
        true
    }

    /// Re-apply the latest undone action.
    pub fn redo(&mut self) -> bool {
        if !self.stack.redo(&mut self.state) {
            return false;
        }
        if let Some(record) = self.undone.pop() {
            self.history.push(record);
        }
        self.just_broken = false;
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.manager.game_over
    }

    #[must_use]
    pub fn is_bank_broken(&self) -> bool {
        self.state.bank.broken
    }

    /// True only right after the action that broke the Bank.
    #[must_use]
    pub fn is_just_broken(&self) -> bool {
        self.just_broken
    }

    /// Final ranking once the game is over.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.is_game_over().then(|| GameResult::from_state(&self.state))
    }

    /// Text of the most recent rejection.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.report.last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PortfolioId;
    use crate::game::economy;
    use crate::games::sample;
    use crate::rounds::ActiveRound;

    fn session() -> GameSession {
        GameSession::new(sample::config(), &["A", "B", "C", "D"], 42).unwrap()
    }

    #[test]
    fn test_wrong_player_rejected() {
        let mut s = session();
        assert!(!s.process_as(PlayerId::new(2), Action::Pass));
        assert_eq!(s.last_error(), Some("it is Player 0's turn, not Player 2's"));
        assert!(s.history().is_empty());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_rejection_sets_error_and_success_clears_it() {
        let mut s = session();
        let dh = s.state().config.company_id("DH").unwrap();
        assert!(!s.process(Action::BuyStartItem { company: dh }));
        assert_eq!(s.last_error(), Some("only the cheapest item may be bought"));

        assert!(s.process(Action::Pass));
        assert_eq!(s.last_error(), None);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_undo_redo_restores_state() {
        let mut s = session();
        let before = s.state().clone();
        let sv = s.state().config.company_id("SV").unwrap();

        assert!(s.process(Action::BuyStartItem { company: sv }));
        let after = s.state().clone();
        assert_ne!(before, after);

        assert!(s.undo());
        assert_eq!(s.state(), &before);
        assert!(s.history().is_empty());

        assert!(s.redo());
        assert_eq!(s.state(), &after);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_new_action_discards_redo() {
        let mut s = session();
        assert!(s.process(Action::Pass));
        assert!(s.undo());
        assert!(s.can_redo());
        assert!(s.process(Action::Pass));
        assert!(!s.can_redo());
    }

    #[test]
    fn test_start_round_leads_to_stock_round() {
        let mut s = session();
        let names = ["SV", "CS", "DH", "MH", "CA", "BO"];
        for name in names {
            let company = s.state().config.company_id(name).unwrap();
            assert!(s.process(Action::BuyStartItem { company }), "{name}: {:?}", s.last_error());
        }
        assert!(matches!(s.state().round, ActiveRound::Stock(_)));
        assert_eq!(s.state().manager.stock_round, 1);
        // Six purchases by four players: the last buyer was B.
        assert_eq!(s.state().manager.priority, PlayerId::new(2));
        assert!(!s.can_undo());
    }

    #[test]
    fn test_seating_is_deterministic() {
        let mut config = sample::config();
        config.randomize_seating = true;
        let a = GameSession::new(config.clone(), &["A", "B", "C", "D"], 9).unwrap();
        let b = GameSession::new(config, &["A", "B", "C", "D"], 9).unwrap();
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_just_broken_lasts_one_action() {
        let mut s = session();
        for name in ["SV", "CS", "DH", "MH", "CA", "BO"] {
            let company = s.state().config.company_id(name).unwrap();
            assert!(s.process(Action::BuyStartItem { company }));
        }

        // Float PRR for A and leave the Bank 50 short of the private revenue.
        let mut stack = MoveStack::new();
        stack.start();
        {
            let mut tx = Transaction::new(&mut s.state, &mut stack, &mut s.report);
            let prr = tx.state().config.company_id("PRR").unwrap();
            let par = tx.state().market.par_cell(100).unwrap();
            economy::start_company(&mut tx, prr, par);
            let certs = tx.state().public(prr).core.certificates.clone();
            for cert in certs.into_iter().take(5) {
                tx.move_certificate(cert, PortfolioId::Player(PlayerId::new(0)));
            }
            tx.update_company(prr, |st| st.floated = true);
            tx.bank_pays(prr, 1000);
            let cash = tx.state().bank.cash;
            tx.bank_pays(PlayerId::new(3), cash - 50);
        }
        stack.finish();

        while matches!(s.state().round, ActiveRound::Stock(_)) {
            assert!(s.process(Action::Pass), "{:?}", s.last_error());
        }
        assert!(matches!(s.state().round, ActiveRound::Operating(_)));
        assert!(s.is_just_broken());
        assert!(s.is_bank_broken());
        assert!(s.state().bank.cash < 0);
        assert!(!s.is_game_over());

        assert!(s.process(Action::Skip));
        assert!(!s.is_just_broken());
        assert!(s.is_bank_broken());
    }
}
