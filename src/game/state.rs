//! Complete game state.
//!
//! `GameState` holds everything the log can change: player and Bank cash,
//! companies, certificate and train ownership, the market tokens, the map,
//! the sequencer state and the active round. The configuration and the
//! market layout are shared, immutable, and compared by value.
//!
//! Two states compare equal exactly when every mutable part is equal, which
//! is what the undo/redo round trip is checked against.

use std::rc::Rc;

use crate::core::{
    CashHolder, CertificateId, CompanyConfig, CompanyId, ConfigError, GameConfig, PhaseConfig,
    PlayerId, PlayerMap, PortfolioId, TrainId,
};
use crate::ledger::{
    Bank, Certificate, Company, CompanyCore, CompanyStatus, Holdings, Player, PrivateCompany,
    PublicCompany, Special, Train,
};
use crate::map::MapState;
use crate::market::{MarketTokens, StockMarket, StockSpace};
use crate::rounds::{ActiveRound, StartRound, StockRound};

use super::manager::ManagerState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub config: Rc<GameConfig>,
    pub market: Rc<StockMarket>,
    pub players: PlayerMap<Player>,
    pub bank: Bank,
    pub companies: Vec<Company>,
    pub certificates: Vec<Certificate>,
    pub certs: Holdings<CertificateId>,
    pub trains: Vec<Train>,
    pub train_holdings: Holdings<TrainId>,
    pub tokens: MarketTokens,
    pub map: MapState,
    pub manager: ManagerState,
    pub round: ActiveRound,
    pub certificate_limit: u32,
}

impl GameState {
    /// Set up a new game with players seated in the given order.
    pub fn new(config: GameConfig, names: &[&str]) -> Result<Self, ConfigError> {
        config.validate()?;
        config.check_player_count(names.len())?;
        let market = StockMarket::from_config(&config.market)?;

        let starting_cash = config
            .starting_cash(names.len())
            .ok_or(ConfigError::PlayerCount(names.len()))?;
        let certificate_limit = config
            .certificate_limit(names.len())
            .ok_or(ConfigError::PlayerCount(names.len()))?;

        let players = PlayerMap::new(names.len(), |p| Player {
            name: names[p.index()].to_string(),
            cash: starting_cash,
            blocked: 0,
        });
        let bank = Bank::new(config.bank_cash - starting_cash * names.len() as i64);
        if bank.cash <= 0 {
            return Err(ConfigError::Invalid(
                "bank cannot cover the starting cash".into(),
            ));
        }

        let reserved = reserved_certificates(&config);
        let mut companies = Vec::with_capacity(config.companies.len());
        let mut certificates = Vec::new();
        let mut certs = Holdings::new();

        for (i, company) in config.companies.iter().enumerate() {
            let id = CompanyId::new(i as u16);
            let percents: Vec<(u32, bool)> = match company {
                CompanyConfig::Private(_) => vec![(100, false)],
                CompanyConfig::Public(public) => public
                    .shares
                    .iter()
                    .enumerate()
                    .map(|(n, &p)| (p, n == 0))
                    .collect(),
            };

            let mut ids = Vec::with_capacity(percents.len());
            for (n, (percent, president)) in percents.into_iter().enumerate() {
                let cert = CertificateId::new(certificates.len() as u32);
                certificates.push(Certificate {
                    id: cert,
                    company: id,
                    percent,
                    president,
                });
                let home = if reserved.contains(&(id, n)) {
                    PortfolioId::Unavailable
                } else {
                    PortfolioId::Ipo
                };
                certs.add(cert, home);
                ids.push(cert);
            }

            let core = CompanyCore {
                id,
                name: company.name().to_string(),
                certificates: ids,
                status: CompanyStatus::default(),
            };
            companies.push(match company {
                CompanyConfig::Private(private) => Company::Private(PrivateCompany {
                    core,
                    base_price: private.base_price,
                    revenue: private.revenue,
                    specials: private
                        .specials
                        .iter()
                        .map(|s| Special {
                            kind: s.kind,
                            hexes: s.hexes.iter().filter_map(|h| config.hex_id(h)).collect(),
                            extra: s.extra,
                            free: s.free,
                            usable_by_player: s.usable_by_player,
                        })
                        .collect(),
                }),
                CompanyConfig::Public(public) => Company::Public(PublicCompany {
                    core,
                    cash: 0,
                    price: None,
                    tokens: public.tokens,
                    home: public.home.as_deref().and_then(|h| config.hex_id(h)),
                    has_stock_price: public.has_stock_price,
                    starting_treasury: public.starting_treasury,
                    can_split: public.can_split,
                    always_split: public.always_split,
                }),
            });
        }

        let mut trains = Vec::new();
        let mut train_holdings = Holdings::new();
        for (kind, train) in config.trains.iter().enumerate() {
            for _ in 0..train.count {
                let id = TrainId::new(trains.len() as u32);
                trains.push(Train {
                    id,
                    kind,
                    name: train.name.clone(),
                    price: train.price,
                });
                train_holdings.add(id, PortfolioId::Ipo);
            }
        }

        let round = if config.start_packet.items.is_empty() {
            ActiveRound::Stock(StockRound::new(1, PlayerId::new(0)))
        } else {
            ActiveRound::Start(StartRound::new(&config, names.len(), PlayerId::new(0)))
        };
        let map = MapState::new(&config);
        let first_round_is_stock = config.start_packet.items.is_empty();

        Ok(Self {
            config: Rc::new(config),
            market: Rc::new(market),
            players,
            bank,
            companies,
            certificates,
            certs,
            trains,
            train_holdings,
            tokens: MarketTokens::new(),
            map,
            manager: ManagerState::new(first_round_is_stock),
            round,
            certificate_limit,
        })
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn company(&self, id: CompanyId) -> &Company {
        &self.companies[id.index()]
    }

    /// A public company.
    ///
    /// Panics for a private; callers have already checked the kind.
    #[must_use]
    pub fn public(&self, id: CompanyId) -> &PublicCompany {
        match self.company(id) {
            Company::Public(p) => p,
            Company::Private(p) => panic!("{} is not a public company", p.core.name),
        }
    }

    pub fn public_mut(&mut self, id: CompanyId) -> &mut PublicCompany {
        match &mut self.companies[id.index()] {
            Company::Public(p) => p,
            Company::Private(p) => panic!("{} is not a public company", p.core.name),
        }
    }

    /// A private company. Panics for a public one.
    #[must_use]
    pub fn private(&self, id: CompanyId) -> &PrivateCompany {
        match self.company(id) {
            Company::Private(p) => p,
            Company::Public(p) => panic!("{} is not a private company", p.core.name),
        }
    }

    /// All public companies.
    pub fn publics(&self) -> impl Iterator<Item = &PublicCompany> {
        self.companies.iter().filter_map(Company::as_public)
    }

    /// All private companies.
    pub fn privates(&self) -> impl Iterator<Item = &PrivateCompany> {
        self.companies.iter().filter_map(Company::as_private)
    }

    #[must_use]
    pub fn certificate(&self, id: CertificateId) -> &Certificate {
        &self.certificates[id.index()]
    }

    #[must_use]
    pub fn train(&self, id: TrainId) -> &Train {
        &self.trains[id.index()]
    }

    #[must_use]
    pub fn cash(&self, holder: CashHolder) -> i64 {
        match holder {
            CashHolder::Bank => self.bank.cash,
            CashHolder::Player(p) => self.players[p].cash,
            CashHolder::Company(c) => self.public(c).cash,
        }
    }

    /// Sum of cash over every holder. Constant for the whole game.
    #[must_use]
    pub fn total_cash(&self) -> i64 {
        let players: i64 = self.players.iter().map(|(_, p)| p.cash).sum();
        let companies: i64 = self.publics().map(|c| c.cash).sum();
        self.bank.cash + players + companies
    }

    /// Display name of a cash holder.
    #[must_use]
    pub fn holder_name(&self, holder: CashHolder) -> String {
        match holder {
            CashHolder::Bank => "Bank".to_string(),
            CashHolder::Player(p) => self.players[p].name.clone(),
            CashHolder::Company(c) => self.company(c).name().to_string(),
        }
    }

    /// Display name of a portfolio owner.
    #[must_use]
    pub fn portfolio_name(&self, portfolio: PortfolioId) -> String {
        match portfolio {
            PortfolioId::Player(p) => self.players[p].name.clone(),
            PortfolioId::Company(c) => self.company(c).name().to_string(),
            other => other.to_string(),
        }
    }

    /// Certificates of one company in a portfolio, in acquisition order.
    pub fn certificates_of(
        &self,
        portfolio: PortfolioId,
        company: CompanyId,
    ) -> impl Iterator<Item = &Certificate> {
        self.certs
            .items(portfolio)
            .iter()
            .map(|&id| self.certificate(id))
            .filter(move |c| c.company == company)
    }

    /// Percentage of a company held by a portfolio.
    #[must_use]
    pub fn percent(&self, portfolio: PortfolioId, company: CompanyId) -> u32 {
        self.certificates_of(portfolio, company).map(|c| c.percent).sum()
    }

    /// Percentage still held by the Bank's IPO, Pool and reserve.
    #[must_use]
    pub fn bank_percent(&self, company: CompanyId) -> u32 {
        [PortfolioId::Ipo, PortfolioId::Pool, PortfolioId::Unavailable]
            .into_iter()
            .map(|p| self.percent(p, company))
            .sum()
    }

    /// Check if no share of a started company is held by the Bank.
    #[must_use]
    pub fn is_sold_out(&self, company: CompanyId) -> bool {
        self.bank_percent(company) == 0
    }

    /// The player holding a company's president's certificate.
    #[must_use]
    pub fn president(&self, company: CompanyId) -> Option<PlayerId> {
        match self.company(company) {
            Company::Public(p) => self.certs.owner(p.president_certificate()).player(),
            Company::Private(_) => None,
        }
    }

    /// Current holder of a private.
    #[must_use]
    pub fn private_owner(&self, private: CompanyId) -> PortfolioId {
        self.certs.owner(self.private(private).certificate())
    }

    /// The stock space a company's token is on.
    #[must_use]
    pub fn space(&self, company: CompanyId) -> Option<&StockSpace> {
        self.public(company).price.map(|cell| self.market.expect_space(cell))
    }

    /// Current share price.
    #[must_use]
    pub fn price(&self, company: CompanyId) -> Option<i64> {
        self.space(company).map(|s| s.price)
    }

    /// Par price.
    #[must_use]
    pub fn par_price(&self, company: CompanyId) -> Option<i64> {
        self.company(company)
            .status()
            .par
            .map(|cell| self.market.price(cell))
    }

    /// Certificates a player holds that count towards the limit.
    #[must_use]
    pub fn certificate_count(&self, player: PlayerId) -> u32 {
        self.certs
            .items(PortfolioId::Player(player))
            .iter()
            .map(|&id| self.certificate(id))
            .filter(|cert| match self.company(cert.company) {
                Company::Public(_) => !self.space(cert.company).is_some_and(|s| s.no_cert_limit),
                Company::Private(_) => true,
            })
            .count() as u32
    }

    /// Trains owned by a company.
    #[must_use]
    pub fn trains_of(&self, company: CompanyId) -> &[TrainId] {
        self.train_holdings.items(PortfolioId::Company(company))
    }

    /// The phase in effect.
    #[must_use]
    pub fn phase(&self) -> &PhaseConfig {
        &self.config.phases[self.manager.phase]
    }

    /// The next new train for sale, if any remain.
    #[must_use]
    pub fn next_new_train(&self) -> Option<TrainId> {
        self.train_holdings.items(PortfolioId::Ipo).first().copied()
    }

    /// Check if no train of this type has left the IPO yet.
    #[must_use]
    pub fn untouched_train_type(&self, kind: usize) -> bool {
        self.trains
            .iter()
            .filter(|t| t.kind == kind)
            .all(|t| self.train_holdings.owner(t.id) == PortfolioId::Ipo)
    }

    /// Cash plus shares at market value plus privates at base price.
    #[must_use]
    pub fn net_worth(&self, player: PlayerId) -> i64 {
        let holdings: i64 = self
            .certs
            .items(PortfolioId::Player(player))
            .iter()
            .map(|&id| {
                let cert = self.certificate(id);
                match self.company(cert.company) {
                    Company::Public(p) if !p.core.status.closed => self
                        .price(cert.company)
                        .map_or(0, |price| price * i64::from(cert.percent) / i64::from(self.config.stock.share_unit)),
                    Company::Private(p) if !p.core.status.closed => p.base_price,
                    _ => 0,
                }
            })
            .sum();
        self.players[player].cash + holdings
    }
}

/// Certificates handed out as start packet bonuses, as (company, position).
fn reserved_certificates(config: &GameConfig) -> Vec<(CompanyId, usize)> {
    let mut reserved: Vec<(CompanyId, usize)> = Vec::new();
    for bonus in config.start_packet.items.iter().filter_map(|i| i.bonus.as_ref()) {
        let Some(company) = config.company_id(&bonus.company) else {
            continue;
        };
        let position = if bonus.president {
            Some(0)
        } else {
            let shares = match &config.companies[company.index()] {
                CompanyConfig::Public(p) => p.shares.len(),
                CompanyConfig::Private(_) => 0,
            };
            (1..shares).find(|n| !reserved.contains(&(company, *n)))
        };
        if let Some(position) = position {
            reserved.push((company, position));
        }
    }
    reserved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::sample;

    fn state() -> GameState {
        GameState::new(sample::config(), &["Ann", "Bob", "Cy", "Di"]).unwrap()
    }

    #[test]
    fn test_setup_cash() {
        let s = state();
        let config = sample::config();
        assert_eq!(s.players[PlayerId::new(0)].cash, 600);
        assert_eq!(s.bank.cash, config.bank_cash - 4 * 600);
        assert_eq!(s.total_cash(), config.bank_cash);
    }

    #[test]
    fn test_setup_certificates_sum_to_100() {
        let s = state();
        for company in &s.companies {
            let total: u32 = [
                PortfolioId::Ipo,
                PortfolioId::Pool,
                PortfolioId::Unavailable,
                PortfolioId::ScrapHeap,
            ]
            .into_iter()
            .map(|p| s.percent(p, company.id()))
            .sum();
            assert_eq!(total, 100, "{}", company.name());
        }
    }

    #[test]
    fn test_bonus_certificates_reserved() {
        let s = state();
        let prr = s.config.company_id("PRR").unwrap();
        let bo = s.config.company_id("B&O").unwrap();

        assert_eq!(s.percent(PortfolioId::Unavailable, prr), 10);
        assert_eq!(s.percent(PortfolioId::Unavailable, bo), 20);
        assert_eq!(s.president(bo), None);
    }

    #[test]
    fn test_first_round_is_start_round() {
        let s = state();
        assert!(matches!(s.round, ActiveRound::Start(_)));
    }

    #[test]
    fn test_player_count_rejected() {
        let err = GameState::new(sample::config(), &["Solo"]).unwrap_err();
        assert_eq!(err, ConfigError::PlayerCount(1));
    }

    #[test]
    fn test_trains_in_ipo_in_order() {
        let s = state();
        let first = s.next_new_train().unwrap();
        assert_eq!(s.train(first).name, "2");
        assert!(s.untouched_train_type(0));
    }

    #[test]
    fn test_net_worth_is_cash_at_start() {
        let s = state();
        assert_eq!(s.net_worth(PlayerId::new(2)), 600);
    }
}
