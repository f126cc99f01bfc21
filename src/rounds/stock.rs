//! Stock round.
//!
//! Players take turns in seat order starting with the priority holder. A
//! turn is any number of sales plus at most one purchase (more of the same
//! company on a `no-buy-limit` cell), ended by `Done`. A `Done` without
//! buying or selling is a pass; once every player has passed in a row the
//! round ends, sold-out companies move up, and priority goes to the player
//! after the last one who acted.

use crate::core::{
    Action, Capitalisation, CashHolder, CompanyId, IpoPrice, PlayerId, PortfolioId,
    SellBuyPolicy, ShareSource, ValidationError,
};
use crate::game::{economy, GameState};
use crate::moves::Transaction;

use super::selling::{check_sale, execute_sale, sale_candidates};
use super::{wrong_round, Round, RoundStatus};

/// What the current player has done this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TurnRecord {
    bought: Option<CompanyId>,
    buys: u32,
    sold: bool,
}

impl TurnRecord {
    fn acted(&self) -> bool {
        self.buys > 0 || self.sold
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockRound {
    pub number: u32,
    current: PlayerId,
    passes: usize,
    turn: TurnRecord,
    /// (seller, company) pairs sold this round.
    sold: Vec<(PlayerId, CompanyId)>,
    last_actor: Option<PlayerId>,
}

impl StockRound {
    /// Stock round `number`, opened by the priority holder.
    #[must_use]
    pub fn new(number: u32, priority: PlayerId) -> Self {
        Self {
            number,
            current: priority,
            passes: 0,
            turn: TurnRecord::default(),
            sold: Vec::new(),
            last_actor: None,
        }
    }

    /// Consecutive passes so far.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn check_turn(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
    ) -> Result<(), ValidationError> {
        if self.turn.buys > 0 {
            let same = self.turn.bought == Some(company);
            let unlimited = state.space(company).is_some_and(|s| s.no_buy_limit);
            if !(same && unlimited) {
                return Err(ValidationError::BuyLimit);
            }
        }
        let rules = &state.config.stock;
        if rules.sell_buy == SellBuyPolicy::NoBuyAfterSell && self.turn.sold {
            return Err(ValidationError::BuyAfterSell);
        }
        if rules.no_rebuy_after_sale && self.sold.contains(&(player, company)) {
            return Err(ValidationError::RebuyAfterSale {
                company: state.company(company).name().to_string(),
            });
        }
        Ok(())
    }

    fn check_limits(
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
        percent: u32,
    ) -> Result<(), ValidationError> {
        let space = state.space(company);
        if !space.is_some_and(|s| s.no_cert_limit)
            && state.certificate_count(player) >= state.certificate_limit
        {
            return Err(ValidationError::CertificateLimit {
                limit: state.certificate_limit,
            });
        }
        let limit = state.config.stock.hold_limit;
        let held = state.percent(PortfolioId::Player(player), company);
        if !space.is_some_and(|s| s.no_hold_limit) && held + percent > limit {
            return Err(ValidationError::HoldingLimit {
                company: state.company(company).name().to_string(),
                limit,
            });
        }
        Ok(())
    }

    fn check_cash(state: &GameState, player: PlayerId, cost: i64) -> Result<(), ValidationError> {
        let p = &state.players[player];
        if p.free_cash() < cost {
            return Err(ValidationError::InsufficientCash {
                holder: p.name.clone(),
                need: cost,
                have: p.free_cash(),
            });
        }
        Ok(())
    }

    fn validate_start(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
        price: i64,
    ) -> Result<(), ValidationError> {
        let public = state
            .company(company)
            .as_public()
            .filter(|p| p.has_stock_price && !p.core.status.closed)
            .ok_or_else(|| ValidationError::NotAvailable {
                what: state.company(company).name().to_string(),
            })?;
        if public.core.status.started {
            return Err(ValidationError::AlreadyStarted {
                company: public.core.name.clone(),
            });
        }
        let president = public.president_certificate();
        if state.certs.owner(president) != PortfolioId::Ipo {
            return Err(ValidationError::NotAvailable {
                what: format!("president's certificate of {}", public.core.name),
            });
        }
        state
            .market
            .par_cell(price)
            .ok_or(ValidationError::InvalidPar { price })?;

        self.check_turn(state, player, company)?;
        let percent = state.certificate(president).percent;
        Self::check_limits(state, player, company, percent)?;
        let units = state.certificate(president).units(state.config.stock.share_unit);
        Self::check_cash(state, player, price * i64::from(units))
    }

    /// The certificate a purchase would take, and its price.
    fn offer(
        state: &GameState,
        company: CompanyId,
        from: ShareSource,
    ) -> Result<(crate::core::CertificateId, i64), ValidationError> {
        let public = state
            .company(company)
            .as_public()
            .ok_or_else(|| ValidationError::NotAvailable {
                what: state.company(company).name().to_string(),
            })?;
        let name = public.core.name.clone();
        if public.core.status.closed || !public.core.status.started {
            return Err(ValidationError::NotStarted { company: name });
        }
        let portfolio = match from {
            ShareSource::Ipo => PortfolioId::Ipo,
            ShareSource::Pool => PortfolioId::Pool,
        };
        let cert = state
            .certificates_of(portfolio, company)
            .find(|c| !c.president)
            .ok_or_else(|| ValidationError::NotAvailable {
                what: format!("{name} share in {portfolio}"),
            })?;

        let current = state.price(company);
        let price = match (from, state.config.stock.ipo_price) {
            (ShareSource::Ipo, IpoPrice::Par) => state.par_price(company),
            _ => current,
        }
        .ok_or(ValidationError::NotStarted { company: name })?;
        let units = cert.units(state.config.stock.share_unit);
        Ok((cert.id, price * i64::from(units)))
    }

    fn validate_buy(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
        from: ShareSource,
    ) -> Result<(), ValidationError> {
        let (cert, cost) = Self::offer(state, company, from)?;
        self.check_turn(state, player, company)?;
        Self::check_limits(state, player, company, state.certificate(cert).percent)?;
        Self::check_cash(state, player, cost)
    }

    fn validate_sell(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
        shares: u32,
    ) -> Result<(), ValidationError> {
        let rules = &state.config.stock;
        if rules.no_sale_in_first_round && self.number == 1 {
            return Err(ValidationError::NoSaleInFirstRound);
        }
        if rules.sell_buy == SellBuyPolicy::SellBeforeBuy && self.turn.buys > 0 {
            return Err(ValidationError::SellAfterBuy);
        }
        check_sale(state, player, company, shares, false).map(|_| ())
    }

    /// Who receives money paid for an IPO certificate.
    fn ipo_payee(state: &GameState, company: CompanyId) -> CashHolder {
        match state.config.stock.capitalisation {
            Capitalisation::Full => CashHolder::Bank,
            Capitalisation::Incremental => CashHolder::Company(company),
        }
    }

    fn start(&mut self, tx: &mut Transaction, player: PlayerId, company: CompanyId, price: i64) {
        let state = tx.state();
        let Some(par) = state.market.par_cell(price) else {
            panic!("Unvalidated par price {price}");
        };
        let president = state.public(company).president_certificate();
        let units = state.certificate(president).units(state.config.stock.share_unit);
        let cost = price * i64::from(units);
        let payee = Self::ipo_payee(state, company);
        let line = format!(
            "{} buys the president's certificate of {} for {}",
            state.players[player].name,
            state.company(company).name(),
            cost
        );

        tx.cash(player, payee, cost);
        economy::start_company(tx, company, par);
        tx.move_certificate(president, PortfolioId::Player(player));
        tx.report(line);
        economy::check_flotation(tx, company);
        self.record_buy(company);
    }

    fn buy(&mut self, tx: &mut Transaction, player: PlayerId, company: CompanyId, from: ShareSource) {
        let (cert, cost) = match Self::offer(tx.state(), company, from) {
            Ok(offer) => offer,
            Err(e) => panic!("Unvalidated purchase reached execute: {e}"),
        };
        let state = tx.state();
        let payee = match from {
            ShareSource::Ipo => Self::ipo_payee(state, company),
            ShareSource::Pool => CashHolder::Bank,
        };
        let line = format!(
            "{} buys a {}% share of {} from {} for {}",
            state.players[player].name,
            state.certificate(cert).percent,
            state.company(company).name(),
            if from == ShareSource::Ipo { "the IPO" } else { "the Pool" },
            cost
        );

        tx.cash(player, payee, cost);
        tx.move_certificate(cert, PortfolioId::Player(player));
        tx.report(line);
        if from == ShareSource::Ipo {
            economy::check_flotation(tx, company);
        }
        economy::check_presidency(tx, company);
        self.record_buy(company);
    }

    fn record_buy(&mut self, company: CompanyId) {
        self.turn.bought = Some(company);
        self.turn.buys += 1;
    }

    fn done(&mut self, tx: &mut Transaction, player: PlayerId) -> RoundStatus {
        if self.turn.acted() {
            self.passes = 0;
            self.last_actor = Some(player);
        } else {
            self.passes += 1;
            let name = tx.state().players[player].name.clone();
            tx.report(format!("{name} passes"));
        }

        if self.passes >= tx.state().player_count() {
            self.finish(tx);
            return RoundStatus::Finished;
        }
        self.current = player.next(tx.state().player_count());
        self.turn = TurnRecord::default();
        RoundStatus::Continue
    }

    fn finish(&mut self, tx: &mut Transaction) {
        let sold_out: Vec<CompanyId> = {
            let state = tx.state();
            state
                .publics()
                .filter(|c| c.core.status.started && !c.core.status.closed && c.price.is_some())
                .filter(|c| state.is_sold_out(c.core.id))
                .map(|c| c.core.id)
                .collect()
        };
        for company in sold_out {
            let Some(cell) = tx.state().public(company).price else {
                continue;
            };
            let mv = tx.state().market.up(cell);
            economy::apply_price_move(tx, company, mv);
        }

        if let Some(last) = self.last_actor {
            let priority = last.next(tx.state().player_count());
            tx.update_manager(|m| m.priority = priority);
        }
        tx.report(format!("{} ends", self.name()));
    }
}

impl Round for StockRound {
    fn name(&self) -> String {
        format!("Stock round {}", self.number)
    }

    fn current_player(&self, _state: &GameState) -> PlayerId {
        self.current
    }

    fn candidate_actions(&self, state: &GameState) -> Vec<Action> {
        let mut actions = Vec::new();
        let pars: Vec<i64> = state
            .market
            .par_cells()
            .into_iter()
            .map(|cell| state.market.price(cell))
            .collect();

        for company in state.publics().filter(|c| !c.core.status.closed) {
            let id = company.core.id;
            if company.core.status.started {
                actions.push(Action::BuyCertificate { company: id, from: ShareSource::Ipo });
                actions.push(Action::BuyCertificate { company: id, from: ShareSource::Pool });
            } else if company.has_stock_price {
                actions.extend(pars.iter().map(|&price| Action::StartCompany { company: id, price }));
            }
        }
        actions.extend(sale_candidates(state, self.current));
        actions.push(Action::Done);
        actions
    }

    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError> {
        match action {
            Action::StartCompany { company, price } => {
                self.validate_start(state, player, *company, *price)
            }
            Action::BuyCertificate { company, from } => {
                self.validate_buy(state, player, *company, *from)
            }
            Action::SellShares { company, shares } => {
                self.validate_sell(state, player, *company, *shares)
            }
            Action::Done => Ok(()),
            other => Err(wrong_round(other)),
        }
    }

    fn execute(&mut self, tx: &mut Transaction, player: PlayerId, action: &Action) -> RoundStatus {
        match action {
            Action::StartCompany { company, price } => {
                self.start(tx, player, *company, *price);
                RoundStatus::Continue
            }
            Action::BuyCertificate { company, from } => {
                self.buy(tx, player, *company, *from);
                RoundStatus::Continue
            }
            Action::SellShares { company, shares } => {
                let plan = match check_sale(tx.state(), player, *company, *shares, false) {
                    Ok(plan) => plan,
                    Err(e) => panic!("Unvalidated sale reached execute: {e}"),
                };
                execute_sale(tx, player, *company, *shares, plan);
                self.turn.sold = true;
                self.sold.push((player, *company));
                RoundStatus::Continue
            }
            Action::Done => self.done(tx, player),
            _ => RoundStatus::Continue,
        }
    }

    fn begin(&mut self, tx: &mut Transaction) -> RoundStatus {
        tx.report(format!("{} begins", self.name()));
        RoundStatus::Continue
    }
}
