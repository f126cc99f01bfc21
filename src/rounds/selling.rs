//! Share sales and the forced share-selling round.
//!
//! Sales follow the same rules wherever they happen:
//!
//! 1. The company must be trading and the seller must hold the shares.
//! 2. The Pool may not exceed its limit.
//! 3. If the president would drop below the president's certificate, the
//!    first following player holding at least that percentage takes the
//!    presidency first. Without one the sale is refused.
//! 4. The price drops one row per share sold, then presidency is
//!    re-checked.
//!
//! `ShareSellingRound` interrupts an operating round when a president must
//! fund a train but lacks the cash. Selling presidency of the company in
//! trouble is not allowed there.

use crate::core::{Action, CompanyId, PlayerId, PortfolioId, ValidationError};
use crate::game::{economy, GameState};
use crate::moves::Transaction;

use super::operating::OperatingRound;
use super::{wrong_round, PendingPurchase, Round, RoundStatus};

/// What a validated sale needs to do before selling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SalePlan {
    /// New president taking over before the sale.
    pub dump_to: Option<PlayerId>,
}

/// Check a sale of `shares` ordinary shares.
///
/// With `protect_presidency`, the seller must remain president.
pub fn check_sale(
    state: &GameState,
    player: PlayerId,
    company: CompanyId,
    shares: u32,
    protect_presidency: bool,
) -> Result<SalePlan, ValidationError> {
    let public = state
        .company(company)
        .as_public()
        .ok_or_else(|| ValidationError::NotAvailable {
            what: state.company(company).name().to_string(),
        })?;
    let name = public.core.name.clone();
    if public.core.status.closed || !public.core.status.started || public.price.is_none() {
        return Err(ValidationError::NotStarted { company: name });
    }

    let unit = state.config.stock.share_unit;
    let held = state.percent(PortfolioId::Player(player), company);
    let selling = shares * unit;
    if shares == 0 || selling > held {
        return Err(ValidationError::NotEnoughShares {
            company: name,
            shares,
            held: held / unit,
        });
    }

    let pool = state.percent(PortfolioId::Pool, company);
    let limit = state.config.stock.pool_limit;
    if pool + selling > limit {
        return Err(ValidationError::PoolLimit {
            company: name,
            limit,
        });
    }

    let remaining = held - selling;
    let mut plan = SalePlan { dump_to: None };
    if state.president(company) == Some(player) {
        let president_percent = state.certificate(public.president_certificate()).percent;
        if protect_presidency {
            let overtaken = player
                .following(state.player_count())
                .any(|p| state.percent(PortfolioId::Player(p), company) > remaining);
            if remaining < president_percent || overtaken {
                return Err(ValidationError::PresidencyProtected { company: name });
            }
        } else if remaining < president_percent {
            plan.dump_to = player
                .following(state.player_count())
                .find(|&p| state.percent(PortfolioId::Player(p), company) >= president_percent);
            if plan.dump_to.is_none() {
                return Err(ValidationError::CannotDumpPresidency { company: name });
            }
        }
    }
    Ok(plan)
}

/// Sell shares to the Pool. The sale must have passed `check_sale`.
pub fn execute_sale(
    tx: &mut Transaction,
    player: PlayerId,
    company: CompanyId,
    shares: u32,
    plan: SalePlan,
) {
    if let Some(successor) = plan.dump_to {
        economy::swap_presidency(tx, company, player, successor);
    }

    let state = tx.state();
    let certs: Vec<_> = state
        .certificates_of(PortfolioId::Player(player), company)
        .filter(|c| !c.president)
        .map(|c| c.id)
        .collect();
    assert!(certs.len() >= shares as usize, "{player} lacks shares to sell");
    let sold: Vec<_> = certs[certs.len() - shares as usize..].to_vec();

    let cell = match state.public(company).price {
        Some(cell) => cell,
        None => panic!("{} has no price", state.company(company).name()),
    };
    let price = state.market.price(cell);
    let total = price * i64::from(shares);
    let line = format!(
        "{} sells {} share(s) of {} for {}",
        state.players[player].name,
        shares,
        state.company(company).name(),
        total
    );

    for cert in sold {
        tx.move_certificate(cert, PortfolioId::Pool);
    }
    tx.bank_pays(player, total);
    tx.report(line);

    let mv = tx.state().market.down(cell, shares);
    economy::apply_price_move(tx, company, mv);
    economy::check_presidency(tx, company);
}

/// Candidate sales for a player: every company held, every share count.
pub fn sale_candidates(state: &GameState, player: PlayerId) -> Vec<Action> {
    let unit = state.config.stock.share_unit;
    state
        .publics()
        .filter_map(|c| {
            let held = state.percent(PortfolioId::Player(player), c.core.id) / unit;
            (held > 0).then_some((c.core.id, held))
        })
        .flat_map(|(company, held)| {
            (1..=held).map(move |shares| Action::SellShares { company, shares })
        })
        .collect()
}

/// Forced sale of shares to fund an emergency train purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareSellingRound {
    pub operating: Box<OperatingRound>,
    pub pending: PendingPurchase,
}

impl ShareSellingRound {
    #[must_use]
    pub fn new(operating: OperatingRound, pending: PendingPurchase) -> Self {
        Self {
            operating: Box::new(operating),
            pending,
        }
    }

    /// Cash still missing.
    #[must_use]
    pub fn shortfall(&self, state: &GameState) -> i64 {
        (self.pending.president_cash - state.players[self.pending.president].cash).max(0)
    }

    /// Check if the company that needed the train has closed.
    #[must_use]
    pub fn company_closed(&self, state: &GameState) -> bool {
        state.company(self.pending.company).is_closed()
    }
}

impl Round for ShareSellingRound {
    fn name(&self) -> String {
        format!("Share selling ({})", self.operating.name())
    }

    fn current_player(&self, _state: &GameState) -> PlayerId {
        self.pending.president
    }

    fn candidate_actions(&self, state: &GameState) -> Vec<Action> {
        sale_candidates(state, self.pending.president)
    }

    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError> {
        match action {
            Action::SellShares { company, shares } => {
                let protect = *company == self.pending.company;
                check_sale(state, player, *company, *shares, protect).map(|_| ())
            }
            other => Err(wrong_round(other)),
        }
    }

    fn execute(&mut self, tx: &mut Transaction, player: PlayerId, action: &Action) -> RoundStatus {
        let Action::SellShares { company, shares } = action else {
            return RoundStatus::Continue;
        };
        let protect = *company == self.pending.company;
        let plan = match check_sale(tx.state(), player, *company, *shares, protect) {
            Ok(plan) => plan,
            Err(e) => panic!("Unvalidated sale reached execute: {e}"),
        };
        execute_sale(tx, player, *company, *shares, plan);

        if self.shortfall(tx.state()) == 0 || self.company_closed(tx.state()) {
            RoundStatus::Finished
        } else if self.possible_actions(tx.state()).is_empty() {
            RoundStatus::Bankrupt(player)
        } else {
            RoundStatus::Continue
        }
    }

    fn begin(&mut self, tx: &mut Transaction) -> RoundStatus {
        let needed = self.shortfall(tx.state());
        let line = format!(
            "{} must raise {} by selling shares",
            tx.state().players[self.pending.president].name,
            needed
        );
        tx.report(line);
        if self.possible_actions(tx.state()).is_empty() {
            RoundStatus::Bankrupt(self.pending.president)
        } else {
            RoundStatus::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReportLog;
    use crate::games::sample;
    use crate::moves::MoveStack;

    /// State with one started company and certificates dealt directly.
    fn dealt(holdings: &[(u8, u32)]) -> (GameState, CompanyId) {
        let mut state = GameState::new(sample::config(), &["A", "B", "C", "D"]).unwrap();
        let company = state.config.company_id("PRR").unwrap();
        let par = state.market.par_cell(100).unwrap();
        let mut stack = MoveStack::new();
        let mut report = ReportLog::new();
        stack.start();
        {
            let mut tx = Transaction::new(&mut state, &mut stack, &mut report);
            economy::start_company(&mut tx, company, par);
            let certs = tx.state().public(company).core.certificates.clone();
            let mut next = certs.iter().skip(1);
            tx.move_certificate(certs[0], PortfolioId::Player(PlayerId::new(0)));
            for &(seat, shares) in holdings {
                for _ in 0..shares {
                    let cert = *next.next().unwrap();
                    tx.move_certificate(cert, PortfolioId::Player(PlayerId::new(seat)));
                }
            }
        }
        stack.finish();
        (state, company)
    }

    #[test]
    fn test_cannot_dump_without_successor() {
        let (state, prr) = dealt(&[(1, 1)]);
        let result = check_sale(&state, PlayerId::new(0), prr, 1, false);
        assert_eq!(
            result,
            Err(ValidationError::CannotDumpPresidency { company: "PRR".into() })
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "cannot dump presidency of PRR"
        );
    }

    #[test]
    fn test_dump_to_first_following_holder() {
        let (state, prr) = dealt(&[(0, 1), (2, 2), (3, 2)]);
        let plan = check_sale(&state, PlayerId::new(0), prr, 2, false).unwrap();
        assert_eq!(plan.dump_to, Some(PlayerId::new(2)));
    }

    #[test]
    fn test_pool_limit() {
        let (state, prr) = dealt(&[(1, 6)]);
        let result = check_sale(&state, PlayerId::new(1), prr, 6, false);
        assert_eq!(
            result,
            Err(ValidationError::PoolLimit {
                company: "PRR".into(),
                limit: 50
            })
        );
        assert!(check_sale(&state, PlayerId::new(1), prr, 5, false).is_ok());
    }

    #[test]
    fn test_protected_presidency() {
        let (state, prr) = dealt(&[(0, 1), (1, 3)]);
        assert!(check_sale(&state, PlayerId::new(0), prr, 1, false).is_ok());
        let result = check_sale(&state, PlayerId::new(0), prr, 1, true);
        assert_eq!(
            result,
            Err(ValidationError::PresidencyProtected { company: "PRR".into() })
        );
    }

    #[test]
    fn test_execute_sale_moves_price_and_cash() {
        let (mut state, prr) = dealt(&[(1, 2)]);
        let before_cash = state.players[PlayerId::new(1)].cash;
        let start_cell = state.public(prr).price.unwrap();
        let mut stack = MoveStack::new();
        let mut report = ReportLog::new();

        stack.start();
        {
            let mut tx = Transaction::new(&mut state, &mut stack, &mut report);
            let plan = check_sale(tx.state(), PlayerId::new(1), prr, 2, false).unwrap();
            execute_sale(&mut tx, PlayerId::new(1), prr, 2, plan);
        }
        stack.finish();

        assert_eq!(state.players[PlayerId::new(1)].cash, before_cash + 200);
        assert_eq!(state.percent(PortfolioId::Pool, prr), 20);
        let expected = state.market.down(start_cell, 2).to;
        assert_eq!(state.public(prr).price, Some(expected));
        assert!(report.contains("sells 2 share(s) of PRR for 200"));
    }

    fn sell(state: &mut GameState, seat: u8, company: CompanyId, shares: u32) -> ReportLog {
        let mut stack = MoveStack::new();
        let mut report = ReportLog::new();
        stack.start();
        {
            let mut tx = Transaction::new(state, &mut stack, &mut report);
            let player = PlayerId::new(seat);
            let plan = check_sale(tx.state(), player, company, shares, false).unwrap();
            execute_sale(&mut tx, player, company, shares, plan);
        }
        stack.finish();
        report
    }

    #[test]
    fn test_dump_sale_hands_over_presidency() {
        // A: 30%, C: 20%, D: 20%.
        let (mut state, prr) = dealt(&[(0, 1), (2, 2), (3, 2)]);
        let report = sell(&mut state, 0, prr, 2);

        assert_eq!(state.president(prr), Some(PlayerId::new(2)));
        assert_eq!(state.percent(PortfolioId::Player(PlayerId::new(0)), prr), 10);
        assert_eq!(state.percent(PortfolioId::Player(PlayerId::new(2)), prr), 20);
        assert_eq!(state.percent(PortfolioId::Pool, prr), 20);
        assert!(report.contains("C becomes president of PRR"));
    }

    #[test]
    fn test_sale_below_another_holder_moves_presidency() {
        // A: 40%, B: 30%. A keeps the president's certificate through the
        // sale and loses it afterwards.
        let (mut state, prr) = dealt(&[(0, 2), (1, 3)]);
        let plan = check_sale(&state, PlayerId::new(0), prr, 2, false).unwrap();
        assert_eq!(plan.dump_to, None);

        sell(&mut state, 0, prr, 2);
        assert_eq!(state.president(prr), Some(PlayerId::new(1)));
        assert_eq!(state.percent(PortfolioId::Player(PlayerId::new(0)), prr), 20);
        assert_eq!(state.percent(PortfolioId::Player(PlayerId::new(1)), prr), 30);
    }
}
