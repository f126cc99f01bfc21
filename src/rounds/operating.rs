//! Operating round.
//!
//! Every floated company operates once, in an order fixed when the round
//! starts. A company's turn walks through the steps in order:
//!
//! ```text
//! LayTrack -> LayToken -> CalcRevenue -> Payout -> BuyTrain -> Final
//! ```
//!
//! Steps only move forward. `LayToken` is skipped when the company has no
//! tokens left; a company without trains earns nothing and withholds
//! without being asked. Privates may be bought and closed at any step.
//!
//! A train purchase the president cannot fund ends in
//! `RoundStatus::NeedsCash`; the sequencer runs a share-selling round and
//! then calls `complete_purchase`.

use crate::core::{
    Action, Allocation, CompanyId, HexId, PlayerId, PortfolioId, SpecialKind, TileColour, TileId,
    TrainId, ValidationError,
};
use crate::game::{economy, GameState};
use crate::ledger::Company;
use crate::moves::Transaction;

use super::{wrong_round, PendingPurchase, Round, RoundStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatingStep {
    LayTrack,
    LayToken,
    CalcRevenue,
    Payout,
    BuyTrain,
    Final,
}

impl OperatingStep {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OperatingStep::LayTrack => "lay track",
            OperatingStep::LayToken => "lay token",
            OperatingStep::CalcRevenue => "calculate revenue",
            OperatingStep::Payout => "payout",
            OperatingStep::BuyTrain => "buy train",
            OperatingStep::Final => "final",
        }
    }

    fn next(self) -> Self {
        match self {
            OperatingStep::LayTrack => OperatingStep::LayToken,
            OperatingStep::LayToken => OperatingStep::CalcRevenue,
            OperatingStep::CalcRevenue => OperatingStep::Payout,
            OperatingStep::Payout => OperatingStep::BuyTrain,
            OperatingStep::BuyTrain | OperatingStep::Final => OperatingStep::Final,
        }
    }
}

/// Normal tile lays left this turn, per colour.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TileCredits(Vec<(TileColour, u32)>);

impl TileCredits {
    fn for_phase(colours: &[TileColour], lays: u32) -> Self {
        Self(colours.iter().map(|&c| (c, lays)).collect())
    }

    fn left(&self, colour: TileColour) -> u32 {
        self.0.iter().find(|(c, _)| *c == colour).map_or(0, |&(_, n)| n)
    }

    /// Use one lay of `colour`. Further lays must be the same colour.
    fn consume(&mut self, colour: TileColour) {
        let n = self.left(colour);
        if n <= 1 {
            self.0.clear();
        } else {
            self.0 = vec![(colour, n - 1)];
        }
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|&(_, n)| n == 0)
    }
}

/// Where a train purchase takes its train from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TrainSource {
    Ipo,
    Pool,
    Company(CompanyId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatingRound {
    /// Stock round number of the current set.
    pub set: u32,
    /// Position within the set, from 1.
    pub number: u32,
    order: Vec<CompanyId>,
    index: usize,
    step: OperatingStep,
    visited: Vec<OperatingStep>,
    credits: TileCredits,
    token_laid: bool,
    revenue: i64,
}

impl OperatingRound {
    /// Fix the operating order from the current state.
    #[must_use]
    pub fn new(state: &GameState, set: u32, number: u32) -> Self {
        Self {
            set,
            number,
            order: operating_order(state),
            index: 0,
            step: OperatingStep::LayTrack,
            visited: Vec::new(),
            credits: TileCredits::default(),
            token_laid: false,
            revenue: 0,
        }
    }

    /// The company whose turn it is.
    #[must_use]
    pub fn operating_company(&self) -> Option<CompanyId> {
        self.order.get(self.index).copied()
    }

    #[must_use]
    pub fn order(&self) -> &[CompanyId] {
        &self.order
    }

    #[must_use]
    pub fn step(&self) -> OperatingStep {
        self.step
    }

    /// Steps entered by the current company, in order.
    #[must_use]
    pub fn steps_visited(&self) -> &[OperatingStep] {
        &self.visited
    }

    fn company(&self) -> CompanyId {
        match self.operating_company() {
            Some(company) => company,
            None => panic!("Operating round has no operating company"),
        }
    }

    fn enter(&mut self, step: OperatingStep) {
        assert!(step >= self.step, "Step went back from {:?} to {:?}", self.step, step);
        self.step = step;
        if self.visited.last() != Some(&step) {
            self.visited.push(step);
        }
    }

    fn start_turn(&mut self, tx: &mut Transaction) {
        let company = self.company();
        let phase = tx.state().phase();
        self.credits = TileCredits::for_phase(&phase.tile_colours, phase.tile_lays);
        self.step = OperatingStep::LayTrack;
        self.visited = vec![OperatingStep::LayTrack];
        self.token_laid = false;
        self.revenue = 0;

        let state = tx.state();
        let president = state
            .president(company)
            .map_or_else(|| "nobody".to_string(), |p| state.players[p].name.clone());
        let line = format!("{} operates for {}", president, state.company(company).name());
        tx.report(line);
    }

    /// Move to the next company that is still open. Returns false at the
    /// end of the order.
    fn next_company(&mut self, tx: &mut Transaction) -> bool {
        loop {
            self.index += 1;
            match self.operating_company() {
                None => return false,
                Some(c) if tx.state().company(c).is_closed() => continue,
                Some(_) => {
                    self.start_turn(tx);
                    return true;
                }
            }
        }
    }

    /// Advance past `self.step`, resolving steps that need no decision.
    fn advance(&mut self, tx: &mut Transaction) {
        let company = self.company();
        let mut step = self.step.next();
        loop {
            match step {
                OperatingStep::LayToken if !self.can_lay_token(tx.state(), company) => {
                    step = step.next();
                }
                OperatingStep::CalcRevenue if tx.state().trains_of(company).is_empty() => {
                    self.enter(step);
                    let name = tx.state().company(company).name().to_string();
                    tx.report(format!("{name} owns no trains and earns nothing"));
                    self.revenue = 0;
                    self.allocate(tx, company, Allocation::Withhold);
                    if tx.state().company(company).is_closed() {
                        return;
                    }
                    step = OperatingStep::BuyTrain;
                }
                _ => break,
            }
        }
        self.enter(step);
    }

    fn can_lay_token(&self, state: &GameState, company: CompanyId) -> bool {
        state.public(company).tokens_left() > 0
            && (!self.token_laid || self.extra_special(state, company, SpecialKind::TokenLay))
    }

    /// Check if any usable special of `kind` grants an extra lay.
    fn extra_special(&self, state: &GameState, company: CompanyId, kind: SpecialKind) -> bool {
        usable_privates(state, company).into_iter().any(|private| {
            state
                .private(private)
                .unused_specials()
                .any(|(_, s)| s.kind == kind && s.extra)
        })
    }

    fn check_step(&self, action: &Action, step: OperatingStep) -> Result<(), ValidationError> {
        if self.step == step {
            Ok(())
        } else {
            Err(ValidationError::WrongStep {
                action: action.name(),
                step: self.step.name(),
            })
        }
    }

    fn check_treasury(state: &GameState, company: CompanyId, cost: i64) -> Result<(), ValidationError> {
        let cash = state.public(company).cash;
        if cash < cost {
            return Err(ValidationError::InsufficientCash {
                holder: state.company(company).name().to_string(),
                need: cost,
                have: cash,
            });
        }
        Ok(())
    }

    // ---- track ----

    fn validate_tile(
        &self,
        state: &GameState,
        action: &Action,
        hex: HexId,
        tile: TileId,
        rotation: u8,
        special: Option<CompanyId>,
    ) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::LayTrack)?;
        let company = self.company();
        let config = &state.config;
        if hex.index() >= config.map.hexes.len() {
            return Err(ValidationError::NotAvailable { what: hex.to_string() });
        }
        if tile.index() >= config.map.tiles.len() || rotation >= 6 {
            return Err(ValidationError::NotAvailable { what: tile.to_string() });
        }
        let tile_config = &config.map.tiles[tile.index()];
        let hex_name = config.map.hexes[hex.index()].name.clone();

        if !state.phase().tile_colours.contains(&tile_config.colour) {
            return Err(ValidationError::TileColourNotAllowed {
                colour: tile_config.colour.to_string(),
            });
        }
        if state.map.copies_left(config, tile) == Some(0) {
            return Err(ValidationError::NoTileCopies { tile: tile_config.name.clone() });
        }
        if !state.map.is_valid_lay(config, hex, tile) {
            return Err(ValidationError::InvalidUpgrade {
                tile: tile_config.name.clone(),
                hex: hex_name,
            });
        }

        let grant = match special {
            Some(private) => Some(special_grant(state, company, private, SpecialKind::TileLay, hex)?),
            None => None,
        };
        let extra = grant.is_some_and(|g| g.extra);
        if !extra && self.credits.left(tile_config.colour) == 0 {
            return Err(ValidationError::NoTileLays);
        }
        let cost = if grant.is_some_and(|g| g.free) {
            0
        } else {
            state.map.lay_cost(config, hex)
        };
        Self::check_treasury(state, company, cost)
    }

    fn lay_tile(
        &mut self,
        tx: &mut Transaction,
        hex: HexId,
        tile: TileId,
        rotation: u8,
        special: Option<CompanyId>,
    ) {
        let company = self.company();
        let state = tx.state();
        let config = &state.config;
        let colour = config.map.tiles[tile.index()].colour;
        let grant = special.and_then(|p| special_grant(state, company, p, SpecialKind::TileLay, hex).ok());
        let cost = if grant.is_some_and(|g| g.free) {
            0
        } else {
            state.map.lay_cost(config, hex)
        };
        let line = format!(
            "{} lays tile {} on {} for {}",
            state.company(company).name(),
            config.map.tiles[tile.index()].name,
            config.map.hexes[hex.index()].name,
            cost
        );

        tx.pay_bank(company, cost);
        tx.set_tile(hex, tile, rotation);
        tx.report(line);
        if let (Some(private), Some(g)) = (special, grant) {
            use_special(tx, private, g.index);
        }
        if !grant.is_some_and(|g| g.extra) {
            self.credits.consume(colour);
        }

        if self.credits.is_empty() && !self.extra_special(tx.state(), company, SpecialKind::TileLay) {
            self.advance(tx);
        }
    }

    // ---- tokens ----

    fn validate_token(
        &self,
        state: &GameState,
        action: &Action,
        hex: HexId,
        special: Option<CompanyId>,
    ) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::LayToken)?;
        let company = self.company();
        let config = &state.config;
        if hex.index() >= config.map.hexes.len() {
            return Err(ValidationError::NotAvailable { what: hex.to_string() });
        }
        let public = state.public(company);
        let hex_name = config.map.hexes[hex.index()].name.clone();
        if public.tokens_left() == 0 {
            return Err(ValidationError::NoTokensLeft { company: public.core.name.clone() });
        }
        if state.map.hex(hex).tokens.contains(&company) {
            return Err(ValidationError::AlreadyTokened {
                company: public.core.name.clone(),
                hex: hex_name,
            });
        }
        if state.map.free_slots(config, hex) == 0 {
            return Err(ValidationError::NoTokenSlot { hex: hex_name });
        }

        let grant = match special {
            Some(private) => Some(special_grant(state, company, private, SpecialKind::TokenLay, hex)?),
            None => None,
        };
        if self.token_laid && !grant.is_some_and(|g| g.extra) {
            return Err(ValidationError::NotAvailable {
                what: "a second base token this turn".into(),
            });
        }
        let cost = if grant.is_some_and(|g| g.free) {
            0
        } else {
            config.operating.token_cost(public.core.status.tokens_laid)
        };
        Self::check_treasury(state, company, cost)
    }

    fn lay_token(&mut self, tx: &mut Transaction, hex: HexId, special: Option<CompanyId>) {
        let company = self.company();
        let state = tx.state();
        let grant = special.and_then(|p| special_grant(state, company, p, SpecialKind::TokenLay, hex).ok());
        let cost = if grant.is_some_and(|g| g.free) {
            0
        } else {
            let laid = state.company(company).status().tokens_laid;
            state.config.operating.token_cost(laid)
        };
        let line = format!(
            "{} lays a base token on {} for {}",
            state.company(company).name(),
            state.config.map.hexes[hex.index()].name,
            cost
        );

        tx.pay_bank(company, cost);
        tx.place_token(hex, company);
        tx.update_company(company, |s| s.tokens_laid += 1);
        tx.report(line);
        if let (Some(private), Some(g)) = (special, grant) {
            use_special(tx, private, g.index);
        }
        if !grant.is_some_and(|g| g.extra) {
            self.token_laid = true;
        }

        if !self.can_lay_token(tx.state(), company) {
            self.advance(tx);
        }
    }

    // ---- revenue ----

    fn validate_revenue(&self, state: &GameState, action: &Action, amount: i64) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::CalcRevenue)?;
        let unit = state.config.operating.revenue_unit;
        if amount < 0 || amount % unit != 0 {
            return Err(ValidationError::InvalidRevenue { amount, unit });
        }
        Ok(())
    }

    fn set_revenue(&mut self, tx: &mut Transaction, amount: i64) {
        let company = self.company();
        self.revenue = amount;
        let name = tx.state().company(company).name().to_string();
        tx.report(format!("{name} earns {amount}"));

        let automatic = if amount == 0 {
            Some(Allocation::Withhold)
        } else if tx.state().public(company).always_split {
            Some(Allocation::Split)
        } else {
            None
        };
        if let Some(allocation) = automatic {
            self.enter(OperatingStep::Payout);
            self.allocate(tx, company, allocation);
            if tx.state().company(company).is_closed() {
                return;
            }
        }
        self.advance(tx);
    }

    fn validate_dividend(
        &self,
        state: &GameState,
        action: &Action,
        allocation: Allocation,
    ) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::Payout)?;
        if allocation == Allocation::Split && !state.public(self.company()).can_split {
            return Err(ValidationError::NotAvailable {
                what: format!("a split for {}", state.company(self.company()).name()),
            });
        }
        Ok(())
    }

    /// Distribute `self.revenue` and move the price.
    fn allocate(&mut self, tx: &mut Transaction, company: CompanyId, allocation: Allocation) {
        let revenue = self.revenue;
        let state = tx.state();
        let units = i64::from(100 / state.config.stock.share_unit);
        let name = state.company(company).name().to_string();

        let per_unit = match allocation {
            Allocation::Payout => revenue / units,
            Allocation::Split => ((revenue / 2 + units - 1) / units).min(revenue / units),
            Allocation::Withhold => 0,
        };
        let retained = revenue - per_unit * units;
        if per_unit > 0 {
            economy::pay_dividends(tx, company, per_unit);
        }
        tx.bank_pays(company, retained);
        let line = match allocation {
            Allocation::Payout => format!("{name} pays out {per_unit} per share"),
            Allocation::Split => {
                format!("{name} splits: {per_unit} per share, {retained} to the treasury")
            }
            Allocation::Withhold => format!("{name} withholds {revenue}"),
        };
        tx.report(line);

        let Some(cell) = tx.state().public(company).price else {
            return;
        };
        let market = &tx.state().market;
        let mv = match allocation {
            Allocation::Payout | Allocation::Split => market.right_or_up(cell),
            Allocation::Withhold => market.left_or_down(cell),
        };
        economy::apply_price_move(tx, company, mv);
    }

    // ---- trains ----

    fn train_source(&self, state: &GameState, train: TrainId) -> Result<TrainSource, ValidationError> {
        let not_available = || ValidationError::NotAvailable {
            what: format!("train {}", state.train(train).name),
        };
        match state.train_holdings.owner(train) {
            PortfolioId::Ipo if state.next_new_train() == Some(train) => Ok(TrainSource::Ipo),
            PortfolioId::Pool => Ok(TrainSource::Pool),
            PortfolioId::Company(other) if other != self.company() => {
                if !state.phase().train_trading {
                    return Err(ValidationError::TrainTradingClosed);
                }
                Ok(TrainSource::Company(other))
            }
            _ => Err(not_available()),
        }
    }

    fn validate_train(
        &self,
        state: &GameState,
        action: &Action,
        train: TrainId,
        price: i64,
        president_cash: i64,
    ) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::BuyTrain)?;
        if train.index() >= state.trains.len() {
            return Err(ValidationError::NotAvailable { what: train.to_string() });
        }
        let company = self.company();
        let limit = state.phase().train_limit;
        if state.trains_of(company).len() as u32 >= limit {
            return Err(ValidationError::TrainLimit { limit });
        }

        let source = self.train_source(state, train)?;
        let list = state.train(train).price;
        match source {
            TrainSource::Ipo | TrainSource::Pool if price != list => {
                return Err(ValidationError::PriceOutOfRange { price, min: list, max: list });
            }
            TrainSource::Company(_) if price < 1 => {
                return Err(ValidationError::PriceOutOfRange { price, min: 1, max: i64::MAX });
            }
            _ => {}
        }

        let treasury = state.public(company).cash;
        let shortfall = (price - treasury).max(0);
        if president_cash == 0 {
            return Self::check_treasury(state, company, price);
        }
        if president_cash != shortfall {
            return Err(ValidationError::InvalidPresidentCash {
                expected: shortfall,
                got: president_cash,
            });
        }
        if matches!(source, TrainSource::Company(_)) {
            return Err(ValidationError::InvalidPresidentCash { expected: 0, got: president_cash });
        }

        if is_emergency(state, company) {
            if Some(list) != cheapest_bank_train(state).map(|t| state.train(t).price) {
                return Err(ValidationError::NotCheapestTrain);
            }
            Ok(())
        } else if state.config.operating.president_may_help {
            let Some(president) = state.president(company) else {
                return Err(ValidationError::InvalidPresidentCash { expected: 0, got: president_cash });
            };
            let p = &state.players[president];
            if p.cash < president_cash {
                return Err(ValidationError::InsufficientCash {
                    holder: p.name.clone(),
                    need: president_cash,
                    have: p.cash,
                });
            }
            Ok(())
        } else {
            Err(ValidationError::InvalidPresidentCash { expected: 0, got: president_cash })
        }
    }

    fn buy_train(&mut self, tx: &mut Transaction, train: TrainId, price: i64, president_cash: i64) -> RoundStatus {
        let company = self.company();
        let state = tx.state();
        let president = state.president(company).unwrap_or(state.manager.priority);
        let pending = PendingPurchase {
            company,
            president,
            train,
            price,
            president_cash,
        };
        if president_cash > state.players[president].cash {
            let line = format!(
                "{} cannot contribute {} towards the train",
                state.players[president].name, president_cash
            );
            tx.report(line);
            return RoundStatus::NeedsCash(pending);
        }
        self.complete_purchase(tx, &pending);
        RoundStatus::Continue
    }

    /// Carry out a train purchase, including the president's contribution.
    pub fn complete_purchase(&mut self, tx: &mut Transaction, pending: &PendingPurchase) {
        if pending.president_cash > 0 {
            tx.cash(pending.president, pending.company, pending.president_cash);
            let state = tx.state();
            let line = format!(
                "{} contributes {} to {}",
                state.players[pending.president].name,
                pending.president_cash,
                state.company(pending.company).name()
            );
            tx.report(line);
        }
        economy::buy_train(tx, pending.company, pending.train, pending.price);
    }

    // ---- privates ----

    fn validate_buy_private(
        &self,
        state: &GameState,
        private: CompanyId,
        price: i64,
    ) -> Result<(), ValidationError> {
        if !state.phase().private_sales {
            return Err(ValidationError::PrivateSalesClosed);
        }
        let Some(p) = state.companies.get(private.index()).and_then(Company::as_private) else {
            return Err(ValidationError::NotAvailable { what: private.to_string() });
        };
        if p.core.status.closed || !matches!(state.private_owner(private), PortfolioId::Player(_)) {
            return Err(ValidationError::NotAvailable { what: p.core.name.clone() });
        }
        let rules = &state.config.operating;
        let min = p.base_price * i64::from(rules.private_price_min_percent) / 100;
        let max = p.base_price * i64::from(rules.private_price_max_percent) / 100;
        if price < min || price > max {
            return Err(ValidationError::PriceOutOfRange { price, min, max });
        }
        Self::check_treasury(state, self.company(), price)
    }

    fn buy_private(&mut self, tx: &mut Transaction, private: CompanyId, price: i64) {
        let company = self.company();
        let state = tx.state();
        let Some(seller) = state.private_owner(private).player() else {
            panic!("Unvalidated private purchase of {private}");
        };
        let cert = state.private(private).certificate();
        let line = format!(
            "{} buys {} from {} for {}",
            state.company(company).name(),
            state.company(private).name(),
            state.players[seller].name,
            price
        );
        tx.cash(company, seller, price);
        tx.move_certificate(cert, PortfolioId::Company(company));
        tx.report(line);
    }

    fn validate_close_private(&self, state: &GameState, private: CompanyId) -> Result<(), ValidationError> {
        let Some(p) = state.companies.get(private.index()).and_then(Company::as_private) else {
            return Err(ValidationError::NotAvailable { what: private.to_string() });
        };
        let company = self.company();
        if p.core.status.closed || state.private_owner(private) != PortfolioId::Company(company) {
            return Err(ValidationError::NotOwner {
                what: p.core.name.clone(),
                owner: state.company(company).name().to_string(),
            });
        }
        Ok(())
    }

    // ---- end of turn ----

    fn validate_done(&self, state: &GameState, action: &Action) -> Result<(), ValidationError> {
        self.check_step(action, OperatingStep::BuyTrain)?;
        let company = self.company();
        if state.config.operating.mandatory_train
            && state.trains_of(company).is_empty()
            && cheapest_bank_train(state).is_some()
        {
            return Err(ValidationError::MustOwnTrain {
                company: state.company(company).name().to_string(),
            });
        }
        Ok(())
    }

    fn done(&mut self, tx: &mut Transaction) -> RoundStatus {
        let name = tx.state().company(self.company()).name().to_string();
        tx.report(format!("{name} finishes its turn"));
        self.end_turn(tx)
    }

    /// Hand over to the next company, or finish the round.
    pub fn end_turn(&mut self, tx: &mut Transaction) -> RoundStatus {
        self.enter(OperatingStep::Final);
        if self.next_company(tx) {
            RoundStatus::TurnEnded
        } else {
            tx.report(format!("{} ends", self.name()));
            RoundStatus::Finished
        }
    }
}

impl Round for OperatingRound {
    fn name(&self) -> String {
        format!("Operating round {}.{}", self.set, self.number)
    }

    fn current_player(&self, state: &GameState) -> PlayerId {
        self.operating_company()
            .and_then(|c| state.president(c))
            .unwrap_or(state.manager.priority)
    }

    fn candidate_actions(&self, state: &GameState) -> Vec<Action> {
        let Some(company) = self.operating_company() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        match self.step {
            OperatingStep::LayTrack => {
                for hex in (0..state.config.map.hexes.len()).map(|h| HexId::new(h as u16)) {
                    for tile in (0..state.config.map.tiles.len()).map(|t| TileId::new(t as u16)) {
                        actions.push(Action::LayTile { hex, tile, rotation: 0, special: None });
                        for private in usable_privates(state, company) {
                            actions.push(Action::LayTile { hex, tile, rotation: 0, special: Some(private) });
                        }
                    }
                }
                actions.push(Action::Skip);
            }
            OperatingStep::LayToken => {
                for hex in (0..state.config.map.hexes.len()).map(|h| HexId::new(h as u16)) {
                    actions.push(Action::LayBaseToken { hex, special: None });
                    for private in usable_privates(state, company) {
                        actions.push(Action::LayBaseToken { hex, special: Some(private) });
                    }
                }
                actions.push(Action::Skip);
            }
            OperatingStep::CalcRevenue => {
                actions.push(Action::SetRevenue { amount: 0 });
            }
            OperatingStep::Payout => {
                for allocation in [Allocation::Payout, Allocation::Split, Allocation::Withhold] {
                    actions.push(Action::SetDividend { allocation });
                }
            }
            OperatingStep::BuyTrain => {
                let treasury = state.public(company).cash;
                let mut offers: Vec<TrainId> = Vec::new();
                offers.extend(state.next_new_train());
                offers.extend(state.train_holdings.items(PortfolioId::Pool).iter().copied());
                for train in offers {
                    let price = state.train(train).price;
                    let president_cash = (price - treasury).max(0);
                    actions.push(Action::BuyTrain { train, price, president_cash });
                }
                actions.push(Action::Done);
            }
            OperatingStep::Final => {}
        }
        if self.step < OperatingStep::Final {
            for private in state.privates() {
                actions.push(Action::BuyPrivate { private: private.core.id, price: private.base_price });
                actions.push(Action::ClosePrivate { private: private.core.id });
            }
        }
        actions
    }

    fn validate(
        &self,
        state: &GameState,
        _player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError> {
        if self.operating_company().is_none() {
            return Err(wrong_round(action));
        }
        match action {
            Action::LayTile { hex, tile, rotation, special } => {
                self.validate_tile(state, action, *hex, *tile, *rotation, *special)
            }
            Action::LayBaseToken { hex, special } => self.validate_token(state, action, *hex, *special),
            Action::SetRevenue { amount } => self.validate_revenue(state, action, *amount),
            Action::SetDividend { allocation } => self.validate_dividend(state, action, *allocation),
            Action::BuyTrain { train, price, president_cash } => {
                self.validate_train(state, action, *train, *price, *president_cash)
            }
            Action::BuyPrivate { private, price } => self.validate_buy_private(state, *private, *price),
            Action::ClosePrivate { private } => self.validate_close_private(state, *private),
            Action::Skip => match self.step {
                OperatingStep::LayTrack | OperatingStep::LayToken => Ok(()),
                _ => Err(ValidationError::WrongStep {
                    action: action.name(),
                    step: self.step.name(),
                }),
            },
            Action::Done => self.validate_done(state, action),
            other => Err(wrong_round(other)),
        }
    }

    fn execute(&mut self, tx: &mut Transaction, _player: PlayerId, action: &Action) -> RoundStatus {
        match action {
            Action::LayTile { hex, tile, rotation, special } => {
                self.lay_tile(tx, *hex, *tile, *rotation, *special);
            }
            Action::LayBaseToken { hex, special } => self.lay_token(tx, *hex, *special),
            Action::SetRevenue { amount } => self.set_revenue(tx, *amount),
            Action::SetDividend { allocation } => {
                let company = self.company();
                self.allocate(tx, company, *allocation);
                if !tx.state().company(company).is_closed() {
                    self.advance(tx);
                }
            }
            Action::BuyTrain { train, price, president_cash } => {
                return self.buy_train(tx, *train, *price, *president_cash);
            }
            Action::BuyPrivate { private, price } => self.buy_private(tx, *private, *price),
            Action::ClosePrivate { private } => economy::close_company(tx, *private),
            Action::Skip => self.advance(tx),
            Action::Done => return self.done(tx),
            _ => {}
        }
        let company = self.company();
        if tx.state().company(company).is_closed() {
            let name = tx.state().company(company).name().to_string();
            tx.report(format!("{name} stops operating"));
            return self.end_turn(tx);
        }
        RoundStatus::Continue
    }

    fn begin(&mut self, tx: &mut Transaction) -> RoundStatus {
        tx.report(format!("{} begins", self.name()));
        economy::pay_private_revenue(tx);

        while let Some(company) = self.operating_company() {
            if !tx.state().company(company).is_closed() {
                self.start_turn(tx);
                return RoundStatus::Continue;
            }
            self.index += 1;
        }
        tx.report(format!("{} ends", self.name()));
        RoundStatus::Finished
    }
}

/// Floated companies in operating order. Companies without a stock price
/// go first in configuration order; the rest follow by price, then
/// column (right first), then row (top first), then token stack position.
pub fn operating_order(state: &GameState) -> Vec<CompanyId> {
    let floated: Vec<_> = state
        .publics()
        .filter(|c| c.core.status.floated && !c.core.status.closed)
        .collect();

    let mut order: Vec<CompanyId> = floated
        .iter()
        .filter(|c| c.price.is_none())
        .map(|c| c.core.id)
        .collect();

    let mut priced: Vec<_> = floated
        .iter()
        .filter_map(|c| c.price.map(|cell| (c.core.id, cell)))
        .map(|(id, cell)| {
            let stack = state.tokens.stack_index(cell, id).unwrap_or(usize::MAX);
            (id, cell, state.market.price(cell), stack)
        })
        .collect();
    priced.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then(b.1.column.cmp(&a.1.column))
            .then(a.1.row.cmp(&b.1.row))
            .then(a.3.cmp(&b.3))
    });
    order.extend(priced.into_iter().map(|(id, ..)| id));
    order
}

/// Check if a company without trains cannot afford the cheapest one.
fn is_emergency(state: &GameState, company: CompanyId) -> bool {
    if !state.trains_of(company).is_empty() {
        return false;
    }
    cheapest_bank_train(state).is_some_and(|t| state.train(t).price > state.public(company).cash)
}

/// Cheapest train the Bank offers: the next new train or a Pool train.
fn cheapest_bank_train(state: &GameState) -> Option<TrainId> {
    state
        .next_new_train()
        .into_iter()
        .chain(state.train_holdings.items(PortfolioId::Pool).iter().copied())
        .min_by_key(|&t| (state.train(t).price, t))
}

/// Privates whose specials the operating company may use: those it owns,
/// plus its president's where the property allows it.
fn usable_privates(state: &GameState, company: CompanyId) -> Vec<CompanyId> {
    let president = state.president(company);
    state
        .privates()
        .filter(|p| !p.core.status.closed)
        .filter(|p| match state.private_owner(p.core.id) {
            PortfolioId::Company(owner) => owner == company,
            PortfolioId::Player(player) => {
                Some(player) == president && p.specials.iter().any(|s| s.usable_by_player)
            }
            _ => false,
        })
        .map(|p| p.core.id)
        .collect()
}

/// A special property selected for one lay.
#[derive(Clone, Copy, Debug)]
struct Grant {
    index: usize,
    extra: bool,
    free: bool,
}

fn special_grant(
    state: &GameState,
    company: CompanyId,
    private: CompanyId,
    kind: SpecialKind,
    hex: HexId,
) -> Result<Grant, ValidationError> {
    let not_usable = || ValidationError::SpecialNotUsable {
        private: state
            .companies
            .get(private.index())
            .map_or_else(|| private.to_string(), |c| c.name().to_string()),
    };
    if !usable_privates(state, company).contains(&private) {
        return Err(not_usable());
    }
    let by_player = state.private_owner(private).player().is_some();
    state
        .private(private)
        .unused_specials()
        .find(|(_, s)| s.kind == kind && s.covers(hex) && (!by_player || s.usable_by_player))
        .map(|(index, s)| Grant {
            index,
            extra: s.extra,
            free: s.free,
        })
        .ok_or_else(not_usable)
}

fn use_special(tx: &mut Transaction, private: CompanyId, index: usize) {
    tx.update_company(private, |s| s.specials_used |= 1 << index);
    let name = tx.state().company(private).name().to_string();
    tx.report(format!("{name} special property used"));
}
