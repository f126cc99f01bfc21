//! Property-based tests over random legal play.
//!
//! Sessions are driven by choosing among `possible_actions` with indices
//! drawn by proptest. After every action money and certificates must be
//! conserved, and undoing the action must restore the exact prior state.

use proptest::prelude::*;

use rust_18xx::core::{PlayerId, PortfolioId};
use rust_18xx::games::sample;
use rust_18xx::{GameSession, GameState};

fn check_conservation(state: &GameState) -> Result<(), TestCaseError> {
    prop_assert_eq!(state.total_cash(), state.config.bank_cash);

    let mut portfolios = vec![
        PortfolioId::Ipo,
        PortfolioId::Pool,
        PortfolioId::Unavailable,
        PortfolioId::ScrapHeap,
    ];
    portfolios.extend(state.players.player_ids().map(PortfolioId::Player));
    portfolios.extend(state.companies.iter().map(|c| PortfolioId::Company(c.id())));

    for company in &state.companies {
        let total: u32 = portfolios.iter().map(|&p| state.percent(p, company.id())).sum();
        prop_assert_eq!(total, 100, "{}", company.name());
        prop_assert!(state.percent(PortfolioId::Pool, company.id()) <= state.config.stock.pool_limit);
    }
    for (_, player) in state.players.iter() {
        prop_assert!(player.blocked >= 0 && player.blocked <= player.cash);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Money and certificates are conserved by every legal action.
    #[test]
    fn prop_random_play_conserves(
        players in 3usize..=6,
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<prop::sample::Index>(), 1..120)
    ) {
        let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut session = GameSession::new(sample::config(), &names, seed).unwrap();

        for choice in choices {
            let actions = session.possible_actions();
            if actions.is_empty() {
                break;
            }
            let action = actions[choice.index(actions.len())].clone();
            prop_assert!(session.process(action), "{:?}", session.last_error());
            check_conservation(session.state())?;
        }
    }

    /// Undo then redo of any action is an exact round trip.
    #[test]
    fn prop_undo_redo_round_trip(
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<prop::sample::Index>(), 1..80)
    ) {
        let mut session = GameSession::new(sample::config(), &["A", "B", "C", "D"], seed).unwrap();

        for choice in choices {
            let actions = session.possible_actions();
            if actions.is_empty() {
                break;
            }
            let before = session.state().clone();
            let action = actions[choice.index(actions.len())].clone();
            prop_assert!(session.process(action));
            let after = session.state().clone();

            if session.can_undo() {
                prop_assert!(session.undo());
                prop_assert_eq!(session.state(), &before);
                prop_assert!(session.redo());
                prop_assert_eq!(session.state(), &after);
            }
        }
    }

    /// Rejected actions change nothing.
    #[test]
    fn prop_rejected_action_is_inert(
        seed in any::<u64>(),
        seat in 0u8..4,
        choices in prop::collection::vec(any::<prop::sample::Index>(), 0..40)
    ) {
        let mut session = GameSession::new(sample::config(), &["A", "B", "C", "D"], seed).unwrap();
        for choice in choices {
            let actions = session.possible_actions();
            if actions.is_empty() {
                break;
            }
            let action = actions[choice.index(actions.len())].clone();
            session.process(action);
        }

        let player = PlayerId::new(seat);
        if player != session.current_player() && !session.is_game_over() {
            let before = session.state().clone();
            let history = session.history().len();
            prop_assert!(!session.process_as(player, rust_18xx::Action::Done));
            prop_assert_eq!(session.state(), &before);
            prop_assert_eq!(session.history().len(), history);
        }
    }
}
