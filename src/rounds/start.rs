//! Start round: selling the start packet of private companies.
//!
//! Two variants share one state machine:
//!
//! - **Fixed price**: in turn order a player buys any unsold item at its
//!   price or passes. All players passing in a row ends the round.
//! - **Auction**: only the cheapest item can be bought outright. Other
//!   items take bids, and the bid amount is blocked from the bidder's cash.
//!   Once the cheapest item is sold the next one is resolved: no bids opens
//!   it for purchase, a single bid buys it, several bids start an auction
//!   between those bidders. If everyone passes, the cheapest item gets
//!   cheaper; at zero somebody has to take it.
//!
//! Items may carry a bonus certificate held back in the `Unavailable`
//! portfolio. A bonus president's certificate starts its company.

use crate::core::{
    Action, BonusConfig, CompanyId, GameConfig, PlayerId, PortfolioId, StartRoundKind,
    ValidationError,
};
use crate::game::{economy, GameState};
use crate::moves::Transaction;

use super::{wrong_round, Round, RoundStatus};

/// Certificate handed out with a start item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bonus {
    pub company: CompanyId,
    pub president: bool,
    pub par: Option<i64>,
}

impl Bonus {
    fn from_config(config: &GameConfig, bonus: &BonusConfig) -> Option<Self> {
        Some(Self {
            company: config.company_id(&bonus.company)?,
            president: bonus.president,
            par: bonus.par,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartItem {
    /// The private company sold.
    pub company: CompanyId,
    pub price: i64,
    /// Open bids in the order they were first placed.
    pub bids: Vec<(PlayerId, i64)>,
    pub bonus: Option<Bonus>,
    pub sold: bool,
}

impl StartItem {
    fn bid_of(&self, player: PlayerId) -> i64 {
        self.bids
            .iter()
            .find(|(p, _)| *p == player)
            .map_or(0, |&(_, amount)| amount)
    }

    fn highest_bid(&self) -> Option<(PlayerId, i64)> {
        self.bids
            .iter()
            .copied()
            .fold(None, |best, bid| match best {
                Some((_, amount)) if amount >= bid.1 => best,
                _ => Some(bid),
            })
    }
}

/// An auction between the bidders of one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Auction {
    item: usize,
    /// Who resumes normal play once the auction is settled.
    resume: PlayerId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartRound {
    kind: StartRoundKind,
    items: Vec<StartItem>,
    current: PlayerId,
    passes: usize,
    player_count: usize,
    last_buyer: Option<PlayerId>,
    auction: Option<Auction>,
    bid_increment: i64,
    price_reduction: i64,
}

impl StartRound {
    /// Round over the full start packet.
    #[must_use]
    pub fn new(config: &GameConfig, player_count: usize, first: PlayerId) -> Self {
        let packet = &config.start_packet;
        let items = packet
            .items
            .iter()
            .filter_map(|item| {
                Some(StartItem {
                    company: config.company_id(&item.company)?,
                    price: item.price,
                    bids: Vec::new(),
                    bonus: item.bonus.as_ref().and_then(|b| Bonus::from_config(config, b)),
                    sold: false,
                })
            })
            .collect();
        Self {
            kind: packet.kind,
            items,
            current: first,
            passes: 0,
            player_count,
            last_buyer: None,
            auction: None,
            bid_increment: packet.bid_increment,
            price_reduction: packet.price_reduction,
        }
    }

    /// Round over the items a previous start round left unsold.
    #[must_use]
    pub fn with_unsold(state: &GameState, first: PlayerId) -> Self {
        let mut round = Self::new(&state.config, state.player_count(), first);
        round.items.retain(|item| {
            let cert = state.private(item.company).certificate();
            state.certs.owner(cert) == PortfolioId::Ipo
        });
        round
    }

    /// Check if any item is still for sale.
    #[must_use]
    pub fn has_unsold(&self) -> bool {
        self.items.iter().any(|i| !i.sold)
    }

    #[must_use]
    pub fn items(&self) -> &[StartItem] {
        &self.items
    }

    #[must_use]
    pub fn last_buyer(&self) -> Option<PlayerId> {
        self.last_buyer
    }

    #[must_use]
    pub fn in_auction(&self) -> bool {
        self.auction.is_some()
    }

    /// Index of the cheapest unsold item; ties go to packet order.
    fn cheapest(&self) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.sold)
            .min_by_key(|(n, i)| (i.price, *n))
            .map(|(n, _)| n)
    }

    fn item_index(&self, company: CompanyId) -> Option<usize> {
        self.items.iter().position(|i| i.company == company && !i.sold)
    }

    fn minimum_bid(&self, item: &StartItem) -> i64 {
        let base = item.highest_bid().map_or(item.price, |(_, amount)| amount.max(item.price));
        base + self.bid_increment
    }

    fn item_name(state: &GameState, item: &StartItem) -> String {
        state.company(item.company).name().to_string()
    }

    fn validate_buy(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
    ) -> Result<(), ValidationError> {
        if self.auction.is_some() {
            return Err(ValidationError::WrongStep {
                action: "buy start item",
                step: "auction",
            });
        }
        let index = self.item_index(company).ok_or_else(|| ValidationError::NotAvailable {
            what: state.company(company).name().to_string(),
        })?;
        if self.kind == StartRoundKind::Auction && Some(index) != self.cheapest() {
            return Err(ValidationError::NotCheapest);
        }
        let price = self.items[index].price;
        let p = &state.players[player];
        if p.free_cash() < price {
            return Err(ValidationError::InsufficientCash {
                holder: p.name.clone(),
                need: price,
                have: p.free_cash(),
            });
        }
        Ok(())
    }

    fn validate_bid(
        &self,
        state: &GameState,
        player: PlayerId,
        company: CompanyId,
        amount: i64,
    ) -> Result<(), ValidationError> {
        if self.kind != StartRoundKind::Auction {
            return Err(wrong_round(&Action::Bid { company, amount }));
        }
        let not_open = || ValidationError::NotAvailable {
            what: format!("a bid on {}", state.company(company).name()),
        };
        let index = self.item_index(company).ok_or_else(not_open)?;
        match self.auction {
            Some(auction) if auction.item != index => return Err(not_open()),
            None if Some(index) == self.cheapest() => return Err(not_open()),
            _ => {}
        }

        let item = &self.items[index];
        let minimum = self.minimum_bid(item);
        if amount < minimum {
            return Err(ValidationError::BidTooLow { minimum });
        }
        let p = &state.players[player];
        let need = amount - item.bid_of(player);
        if p.free_cash() < need {
            return Err(ValidationError::InsufficientCash {
                holder: p.name.clone(),
                need,
                have: p.free_cash(),
            });
        }
        Ok(())
    }

    fn validate_pass(&self) -> Result<(), ValidationError> {
        if self.auction.is_none() && self.kind == StartRoundKind::Auction {
            if let Some(index) = self.cheapest() {
                if self.items[index].price == 0 {
                    return Err(ValidationError::MustBuy);
                }
            }
        }
        Ok(())
    }

    /// Hand an item to a player for `price`, with its bonus.
    fn sell_item(&mut self, tx: &mut Transaction, index: usize, player: PlayerId, price: i64) {
        let item = self.items[index].clone();
        self.items[index].sold = true;
        self.items[index].bids.clear();
        self.last_buyer = Some(player);

        let state = tx.state();
        let cert = state.private(item.company).certificate();
        let line = format!(
            "{} buys {} for {}",
            state.players[player].name,
            Self::item_name(state, &item),
            price
        );
        tx.pay_bank(player, price);
        tx.move_certificate(cert, PortfolioId::Player(player));
        tx.report(line);

        let Some(bonus) = item.bonus else { return };
        let state = tx.state();
        let Some(bonus_cert) = state
            .certificates_of(PortfolioId::Unavailable, bonus.company)
            .find(|c| c.president == bonus.president)
            .map(|c| c.id)
        else {
            return;
        };
        let line = format!(
            "{} receives a {}% certificate of {}",
            state.players[player].name,
            state.certificate(bonus_cert).percent,
            state.company(bonus.company).name()
        );
        let par = bonus.par.and_then(|price| state.market.par_cell(price));
        tx.move_certificate(bonus_cert, PortfolioId::Player(player));
        tx.report(line);
        if bonus.president {
            if let Some(cell) = par {
                economy::start_company(tx, bonus.company, cell);
            }
        }
        economy::check_flotation(tx, bonus.company);
    }

    /// Settle items with bids as they become the cheapest.
    fn resolve(&mut self, tx: &mut Transaction, resume: PlayerId) -> RoundStatus {
        loop {
            let Some(index) = self.cheapest() else {
                self.finish(tx);
                return RoundStatus::Finished;
            };
            let bids = self.items[index].bids.clone();
            match bids.as_slice() {
                [] => {
                    self.current = resume;
                    return RoundStatus::Continue;
                }
                &[(bidder, amount)] => {
                    let blocked = tx.state().players[bidder].blocked;
                    tx.set_blocked(bidder, blocked - amount);
                    self.sell_item(tx, index, bidder, amount);
                }
                _ => {
                    let highest = self.items[index].highest_bid().map_or(resume, |(p, _)| p);
                    self.current = self.next_bidder(index, highest);
                    self.auction = Some(Auction { item: index, resume });
                    let line = format!(
                        "Auction for {} starts",
                        Self::item_name(tx.state(), &self.items[index])
                    );
                    tx.report(line);
                    return RoundStatus::Continue;
                }
            }
        }
    }

    /// The bidder on an item after `player` in seat order.
    fn next_bidder(&self, index: usize, player: PlayerId) -> PlayerId {
        let item = &self.items[index];
        player
            .following(self.player_count)
            .find(|p| item.bids.iter().any(|(b, _)| b == p))
            .unwrap_or(player)
    }

    fn buy(&mut self, tx: &mut Transaction, player: PlayerId, company: CompanyId) -> RoundStatus {
        let Some(index) = self.item_index(company) else {
            panic!("Unvalidated start item {company}");
        };
        let price = self.items[index].price;
        self.sell_item(tx, index, player, price);
        self.passes = 0;
        self.resolve(tx, player.next(self.player_count))
    }

    fn bid(&mut self, tx: &mut Transaction, player: PlayerId, company: CompanyId, amount: i64) {
        let Some(index) = self.item_index(company) else {
            panic!("Unvalidated bid on {company}");
        };
        let previous = self.items[index].bid_of(player);
        let blocked = tx.state().players[player].blocked;
        tx.set_blocked(player, blocked - previous + amount);

        let item = &mut self.items[index];
        match item.bids.iter_mut().find(|(p, _)| *p == player) {
            Some(bid) => bid.1 = amount,
            None => item.bids.push((player, amount)),
        }
        let line = format!(
            "{} bids {} on {}",
            tx.state().players[player].name,
            amount,
            Self::item_name(tx.state(), &self.items[index])
        );
        tx.report(line);

        if self.auction.is_some() {
            self.current = self.next_bidder(index, player);
        } else {
            self.passes = 0;
            self.current = player.next(self.player_count);
        }
    }

    fn pass(&mut self, tx: &mut Transaction, player: PlayerId) -> RoundStatus {
        if let Some(auction) = self.auction {
            return self.leave_auction(tx, player, auction);
        }

        let name = tx.state().players[player].name.clone();
        tx.report(format!("{name} passes"));
        self.passes += 1;
        if self.passes < self.player_count {
            self.current = player.next(self.player_count);
            return RoundStatus::Continue;
        }

        let reducible = self.kind == StartRoundKind::Auction && self.price_reduction > 0;
        let Some(index) = self.cheapest().filter(|_| reducible) else {
            self.finish(tx);
            return RoundStatus::Finished;
        };
        let item = &mut self.items[index];
        item.price = (item.price - self.price_reduction).max(0);
        let line = format!(
            "{} is reduced to {}",
            Self::item_name(tx.state(), item),
            item.price
        );
        tx.report(line);
        self.passes = 0;
        self.current = player.next(self.player_count);
        RoundStatus::Continue
    }

    fn leave_auction(&mut self, tx: &mut Transaction, player: PlayerId, auction: Auction) -> RoundStatus {
        let index = auction.item;
        let own = self.items[index].bid_of(player);
        let blocked = tx.state().players[player].blocked;
        tx.set_blocked(player, blocked - own);
        let next = self.next_bidder(index, player);
        self.items[index].bids.retain(|(p, _)| *p != player);

        let line = format!(
            "{} leaves the auction for {}",
            tx.state().players[player].name,
            Self::item_name(tx.state(), &self.items[index])
        );
        tx.report(line);

        if self.items[index].bids.len() > 1 {
            self.current = next;
            return RoundStatus::Continue;
        }
        self.auction = None;
        self.passes = 0;
        self.resolve(tx, auction.resume)
    }

    fn finish(&mut self, tx: &mut Transaction) {
        // Bids on unsold items lapse.
        for item in &mut self.items {
            for &(bidder, amount) in &item.bids {
                let blocked = tx.state().players[bidder].blocked;
                tx.set_blocked(bidder, blocked - amount);
            }
            item.bids.clear();
        }
        if let Some(buyer) = self.last_buyer {
            let priority = buyer.next(self.player_count);
            tx.update_manager(|m| m.priority = priority);
        }
        tx.report("Start round ends");
    }
}

impl Round for StartRound {
    fn name(&self) -> String {
        "Start round".to_string()
    }

    fn current_player(&self, _state: &GameState) -> PlayerId {
        self.current
    }

    fn candidate_actions(&self, _state: &GameState) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.auction {
            Some(auction) => {
                let item = &self.items[auction.item];
                actions.push(Action::Bid {
                    company: item.company,
                    amount: self.minimum_bid(item),
                });
            }
            None => {
                for item in self.items.iter().filter(|i| !i.sold) {
                    actions.push(Action::BuyStartItem { company: item.company });
                    if self.kind == StartRoundKind::Auction {
                        actions.push(Action::Bid {
                            company: item.company,
                            amount: self.minimum_bid(item),
                        });
                    }
                }
            }
        }
        actions.push(Action::Pass);
        actions
    }

    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), ValidationError> {
        match action {
            Action::BuyStartItem { company } => self.validate_buy(state, player, *company),
            Action::Bid { company, amount } => self.validate_bid(state, player, *company, *amount),
            Action::Pass => self.validate_pass(),
            other => Err(wrong_round(other)),
        }
    }

    fn execute(&mut self, tx: &mut Transaction, player: PlayerId, action: &Action) -> RoundStatus {
        match action {
            Action::BuyStartItem { company } => self.buy(tx, player, *company),
            Action::Bid { company, amount } => {
                self.bid(tx, player, *company, *amount);
                RoundStatus::Continue
            }
            Action::Pass => self.pass(tx, player),
            _ => RoundStatus::Continue,
        }
    }

    fn begin(&mut self, tx: &mut Transaction) -> RoundStatus {
        tx.report("Start round begins");
        if self.has_unsold() {
            RoundStatus::Continue
        } else {
            self.finish(tx);
            RoundStatus::Finished
        }
    }
}
