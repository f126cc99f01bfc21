//! Phase changes and train rusting.
//!
//! The first purchase of a train type from the IPO may rust older types
//! and start a new phase. Both effects are recorded as moves, so undoing
//! the purchase also reverts the phase and un-rusts the trains.

use crate::core::PortfolioId;
use crate::moves::Transaction;

use super::economy;

/// Effects of the first train of type `kind` leaving the IPO.
pub fn first_train_bought(tx: &mut Transaction, kind: usize) {
    let state = tx.state();
    let name = state.config.trains[kind].name.clone();

    let rusting: Vec<usize> = state
        .config
        .trains
        .iter()
        .enumerate()
        .filter(|(_, t)| t.rusted_by.as_deref() == Some(name.as_str()))
        .map(|(k, _)| k)
        .collect();
    for rusted in rusting {
        rust(tx, rusted);
    }

    let state = tx.state();
    let next = state
        .config
        .phases
        .iter()
        .enumerate()
        .skip(state.manager.phase + 1)
        .find(|(_, p)| p.trigger.as_deref() == Some(name.as_str()))
        .map(|(i, _)| i);
    if let Some(index) = next {
        change_phase(tx, index);
    }
}

/// Move every train of a type to the scrap heap.
fn rust(tx: &mut Transaction, kind: usize) {
    let state = tx.state();
    let trains: Vec<_> = state
        .trains
        .iter()
        .filter(|t| t.kind == kind && state.train_holdings.owner(t.id) != PortfolioId::ScrapHeap)
        .map(|t| t.id)
        .collect();
    let name = state.config.trains[kind].name.clone();
    if trains.is_empty() {
        return;
    }
    for train in trains {
        tx.move_train(train, PortfolioId::ScrapHeap);
    }
    tx.report(format!("{name} trains rust"));
}

/// Enter phase `index` and apply its global effects.
pub fn change_phase(tx: &mut Transaction, index: usize) {
    tx.update_manager(|m| m.phase = index);
    let phase = tx.state().phase().clone();
    tx.report(format!("Phase {} starts", phase.name));

    if phase.privates_close {
        let open: Vec<_> = tx
            .state()
            .privates()
            .filter(|p| !p.core.status.closed)
            .map(|p| p.core.id)
            .collect();
        for private in open {
            economy::close_company(tx, private);
        }
    }
    economy::discard_excess_trains(tx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompanyId, PlayerId, ReportLog, TrainId};
    use crate::game::GameState;
    use crate::games::sample;
    use crate::moves::MoveStack;

    fn run(state: &mut GameState, change: impl FnOnce(&mut Transaction)) -> ReportLog {
        let mut stack = MoveStack::new();
        let mut report = ReportLog::new();
        stack.start();
        {
            let mut tx = Transaction::new(state, &mut stack, &mut report);
            change(&mut tx);
        }
        stack.finish();
        report
    }

    /// PRR floated with a large treasury.
    fn floated() -> (GameState, CompanyId) {
        let mut state = GameState::new(sample::config(), &["A", "B", "C", "D"]).unwrap();
        let prr = state.config.company_id("PRR").unwrap();
        let par = state.market.par_cell(100).unwrap();
        run(&mut state, |tx| {
            economy::start_company(tx, prr, par);
            tx.update_company(prr, |s| s.floated = true);
            tx.bank_pays(prr, 5000);
        });
        (state, prr)
    }

    fn ipo_train(state: &GameState, name: &str) -> TrainId {
        state
            .trains
            .iter()
            .find(|t| t.name == name && state.train_holdings.owner(t.id) == PortfolioId::Ipo)
            .map(|t| t.id)
            .unwrap()
    }

    #[test]
    fn test_first_train_of_type_starts_phase() {
        let (mut state, prr) = floated();
        let three = ipo_train(&state, "3");
        let report = run(&mut state, |tx| economy::buy_train(tx, prr, three, 180));
        assert_eq!(state.manager.phase, 1);
        assert_eq!(state.phase().name, "3");
        assert!(report.contains("Phase 3 starts"));

        let second = ipo_train(&state, "3");
        let report = run(&mut state, |tx| economy::buy_train(tx, prr, second, 180));
        assert_eq!(state.manager.phase, 1);
        assert!(!report.contains("Phase"));
    }

    #[test]
    fn test_first_four_rusts_twos() {
        let (mut state, prr) = floated();
        let twos = [ipo_train(&state, "2"), state.trains[1].id];
        let four = ipo_train(&state, "4");
        let report = run(&mut state, |tx| {
            for train in twos {
                economy::buy_train(tx, prr, train, 80);
            }
            economy::buy_train(tx, prr, four, 300);
        });

        assert_eq!(state.trains_of(prr), &[four]);
        for train in twos {
            assert_eq!(state.train_holdings.owner(train), PortfolioId::ScrapHeap);
        }
        // Unsold 2 trains rust in the IPO as well.
        assert_eq!(state.train_holdings.owner(state.trains[5].id), PortfolioId::ScrapHeap);
        assert_eq!(state.phase().name, "4");
        assert!(report.contains("2 trains rust"));
    }

    #[test]
    fn test_lower_train_limit_discards_cheapest() {
        let (mut state, prr) = floated();
        let threes: Vec<_> = state.trains.iter().filter(|t| t.name == "3").map(|t| t.id).collect();
        let four = ipo_train(&state, "4");
        let report = run(&mut state, |tx| {
            for &train in &threes[..4] {
                tx.move_train(train, PortfolioId::Company(prr));
            }
            economy::buy_train(tx, prr, four, 300);
        });

        assert_eq!(state.phase().train_limit, 3);
        assert_eq!(state.trains_of(prr).len(), 3);
        assert!(state.trains_of(prr).contains(&four));
        assert_eq!(state.train_holdings.items(PortfolioId::Pool), &threes[..2]);
        assert!(report.contains("PRR discards a 3 train"));
    }

    #[test]
    fn test_privates_close_with_phase() {
        let (mut state, _) = floated();
        let sv = state.config.company_id("SV").unwrap();
        let cert = state.private(sv).certificate();
        run(&mut state, |tx| {
            tx.move_certificate(cert, PortfolioId::Player(PlayerId::new(0)));
            change_phase(tx, 3);
        });

        assert_eq!(state.phase().name, "5");
        assert!(state.privates().all(|p| p.core.status.closed));
        assert_eq!(state.certs.owner(cert), PortfolioId::ScrapHeap);
    }
}
