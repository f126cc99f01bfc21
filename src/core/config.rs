//! Game configuration types.
//!
//! A game title is described entirely by a `GameConfig`: the stock market
//! layout, phases, trains, companies, start packet and map data. The engine
//! never hardcodes any of it.
//!
//! ## Loading
//!
//! Configurations are usually written in TOML and loaded with
//! `GameConfig::from_toml`, which parses and then runs `validate`. A
//! configuration that fails validation never reaches a running game.
//!
//! References between sections (a phase trigger naming a train, a start
//! item naming a private) are by name and resolved to table IDs at setup.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::ids::{CompanyId, HexId, TileId};
use crate::market::StockMarket;

/// Track colour, in upgrade order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColour {
    Yellow,
    Green,
    Brown,
    Grey,
}

impl std::fmt::Display for TileColour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileColour::Yellow => "yellow",
            TileColour::Green => "green",
            TileColour::Brown => "brown",
            TileColour::Grey => "grey",
        };
        f.write_str(name)
    }
}

/// Ordering constraint between selling and buying within one stock turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellBuyPolicy {
    /// Sell and buy in any order.
    #[default]
    Unrestricted,
    /// All sales must come before the first buy.
    SellBeforeBuy,
    /// No buying once something was sold.
    NoBuyAfterSell,
}

/// Who receives dividends on shares held by a Bank portfolio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendDestination {
    /// Paid into the company treasury.
    Company,
    /// Not paid out.
    Bank,
}

/// How a company receives its capital.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capitalisation {
    /// IPO proceeds go to the Bank; on flotation the Bank pays
    /// `capital_multiple` times the par price into the treasury.
    #[default]
    Full,
    /// IPO proceeds go straight into the treasury.
    Incremental,
}

/// Price of certificates bought from the IPO after the company started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpoPrice {
    /// Always the par price.
    Par,
    /// The current market price.
    #[default]
    Current,
}

/// Start round variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartRoundKind {
    /// Items are bought at list price in turn order.
    #[default]
    FixedPrice,
    /// Cheapest item bought outright, others bid on.
    Auction,
}

/// When a broken bank (or a market end cell) finishes the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndRule {
    /// At the end of the operating round in progress.
    CurrentOperatingRound,
    /// At the end of the current set of operating rounds.
    #[default]
    CurrentSetOfOperatingRounds,
}

/// A value that depends on the number of players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCountValue {
    pub players: usize,
    pub value: i64,
}

/// Stock round and share rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockRules {
    /// Percentage represented by one ordinary share.
    pub share_unit: u32,
    /// Maximum percentage of one company a player may hold.
    pub hold_limit: u32,
    /// Maximum percentage of one company the Bank Pool may hold.
    pub pool_limit: u32,
    /// Percentage that must leave the IPO before a company floats.
    pub float_percent: u32,
    pub capitalisation: Capitalisation,
    /// Par multiples paid at flotation under full capitalisation.
    pub capital_multiple: i64,
    pub ipo_price: IpoPrice,
    pub sell_buy: SellBuyPolicy,
    pub no_sale_in_first_round: bool,
    pub no_rebuy_after_sale: bool,
    pub ipo_pays: DividendDestination,
    pub pool_pays: DividendDestination,
}

impl Default for StockRules {
    fn default() -> Self {
        Self {
            share_unit: 10,
            hold_limit: 60,
            pool_limit: 50,
            float_percent: 60,
            capitalisation: Capitalisation::Full,
            capital_multiple: 10,
            ipo_price: IpoPrice::Current,
            sell_buy: SellBuyPolicy::Unrestricted,
            no_sale_in_first_round: false,
            no_rebuy_after_sale: true,
            ipo_pays: DividendDestination::Bank,
            pool_pays: DividendDestination::Company,
        }
    }
}

/// Operating round rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingRules {
    /// Revenue must be a multiple of this.
    pub revenue_unit: i64,
    /// Companies must own a train at the end of their turn.
    pub mandatory_train: bool,
    /// Presidents may top up a train purchase outside emergencies.
    pub president_may_help: bool,
    /// Lowest private price, as a percentage of its base price.
    pub private_price_min_percent: u32,
    /// Highest private price, as a percentage of its base price.
    pub private_price_max_percent: u32,
    /// Base token cost by token sequence number; the last entry repeats.
    pub token_costs: Vec<i64>,
}

impl Default for OperatingRules {
    fn default() -> Self {
        Self {
            revenue_unit: 10,
            mandatory_train: true,
            president_may_help: false,
            private_price_min_percent: 50,
            private_price_max_percent: 200,
            token_costs: vec![0, 40],
        }
    }
}

impl OperatingRules {
    /// Cost of a company's `sequence`-th base token (0-based).
    #[must_use]
    pub fn token_cost(&self, sequence: u32) -> i64 {
        let index = (sequence as usize).min(self.token_costs.len().saturating_sub(1));
        self.token_costs.get(index).copied().unwrap_or(0)
    }
}

/// Stock market layout. Each cell is a code such as `"100p"`; empty
/// strings are holes in the grid. See `market::space` for the flag letters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub up_or_down_right: bool,
}

/// One entry of the phase table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: String,
    /// Train whose first purchase starts this phase.
    #[serde(default)]
    pub trigger: Option<String>,
    pub tile_colours: Vec<TileColour>,
    /// Normal tile lays per turn.
    #[serde(default = "one")]
    pub tile_lays: u32,
    pub operating_rounds: u32,
    pub train_limit: u32,
    #[serde(default)]
    pub private_sales: bool,
    #[serde(default)]
    pub privates_close: bool,
    #[serde(default)]
    pub train_trading: bool,
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

/// A train type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub name: String,
    pub price: i64,
    pub count: u32,
    /// Train type whose first purchase rusts this one.
    #[serde(default)]
    pub rusted_by: Option<String>,
}

/// What a special property allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    TileLay,
    TokenLay,
}

/// A special property attached to a private.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialConfig {
    pub kind: SpecialKind,
    /// Hexes where it may be used; empty means anywhere.
    #[serde(default)]
    pub hexes: Vec<String>,
    /// Grants a lay on top of the normal allowance.
    #[serde(default)]
    pub extra: bool,
    /// Waives the lay cost.
    #[serde(default)]
    pub free: bool,
    /// Usable while the private is held by the operating company's president.
    #[serde(default)]
    pub usable_by_player: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateConfig {
    pub name: String,
    pub base_price: i64,
    pub revenue: i64,
    #[serde(default)]
    pub specials: Vec<SpecialConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub name: String,
    /// Certificate percentages; the first is the president's certificate.
    pub shares: Vec<u32>,
    pub tokens: u32,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default = "yes")]
    pub has_stock_price: bool,
    /// Treasury paid at flotation for companies without a stock price.
    #[serde(default)]
    pub starting_treasury: i64,
    #[serde(default)]
    pub can_split: bool,
    #[serde(default)]
    pub always_split: bool,
}

/// Company definition; the factory discriminator is the `type` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompanyConfig {
    Private(PrivateConfig),
    Public(PublicConfig),
}

impl CompanyConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            CompanyConfig::Private(p) => &p.name,
            CompanyConfig::Public(p) => &p.name,
        }
    }
}

/// Certificate handed out together with a start item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusConfig {
    pub company: String,
    #[serde(default)]
    pub president: bool,
    /// Par price set when the bonus is a president's certificate.
    #[serde(default)]
    pub par: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartItemConfig {
    /// A private company.
    pub company: String,
    pub price: i64,
    #[serde(default)]
    pub bonus: Option<BonusConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartPacketConfig {
    pub kind: StartRoundKind,
    pub items: Vec<StartItemConfig>,
    pub bid_increment: i64,
    pub price_reduction: i64,
}

impl Default for StartPacketConfig {
    fn default() -> Self {
        Self {
            kind: StartRoundKind::FixedPrice,
            items: Vec::new(),
            bid_increment: 5,
            price_reduction: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexConfig {
    pub name: String,
    /// Cost of the first tile lay.
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub token_slots: u32,
    /// Preprinted tile.
    #[serde(default)]
    pub tile: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileConfig {
    pub name: String,
    pub colour: TileColour,
    /// Copies available; `None` is unlimited.
    #[serde(default)]
    pub count: Option<u32>,
    /// Tiles that may replace this one.
    #[serde(default)]
    pub upgrades: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub hexes: Vec<HexConfig>,
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
}

/// Complete game definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub bank_cash: i64,
    pub starting_cash: Vec<PlayerCountValue>,
    pub certificate_limits: Vec<PlayerCountValue>,
    #[serde(default)]
    pub stock: StockRules,
    #[serde(default)]
    pub operating: OperatingRules,
    pub market: MarketConfig,
    pub phases: Vec<PhaseConfig>,
    pub trains: Vec<TrainConfig>,
    pub companies: Vec<CompanyConfig>,
    #[serde(default)]
    pub start_packet: StartPacketConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub end_rule: GameEndRule,
    #[serde(default)]
    pub randomize_seating: bool,
}

impl GameConfig {
    /// Parse and validate a TOML game definition.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the market layout.
    #[must_use]
    pub fn with_market(mut self, market: MarketConfig) -> Self {
        self.market = market;
        self
    }

    /// Replace the stock rules.
    #[must_use]
    pub fn with_stock_rules(mut self, rules: StockRules) -> Self {
        self.stock = rules;
        self
    }

    /// Replace the operating rules.
    #[must_use]
    pub fn with_operating_rules(mut self, rules: OperatingRules) -> Self {
        self.operating = rules;
        self
    }

    /// Add a company definition.
    #[must_use]
    pub fn with_company(mut self, company: CompanyConfig) -> Self {
        self.companies.push(company);
        self
    }

    /// Replace the start packet.
    #[must_use]
    pub fn with_start_packet(mut self, packet: StartPacketConfig) -> Self {
        self.start_packet = packet;
        self
    }

    /// Starting cash for a player count.
    #[must_use]
    pub fn starting_cash(&self, players: usize) -> Option<i64> {
        lookup(&self.starting_cash, players)
    }

    /// Certificate limit for a player count.
    #[must_use]
    pub fn certificate_limit(&self, players: usize) -> Option<u32> {
        lookup(&self.certificate_limits, players).map(|v| v as u32)
    }

    /// Check that a game can be set up with this many players.
    pub fn check_player_count(&self, players: usize) -> Result<(), ConfigError> {
        if players == 0
            || self.starting_cash(players).is_none()
            || self.certificate_limit(players).is_none()
        {
            return Err(ConfigError::PlayerCount(players));
        }
        Ok(())
    }

    /// Look up a company by name.
    #[must_use]
    pub fn company_id(&self, name: &str) -> Option<CompanyId> {
        self.companies
            .iter()
            .position(|c| c.name() == name)
            .map(|i| CompanyId::new(i as u16))
    }

    /// Look up a train type by name.
    #[must_use]
    pub fn train_type(&self, name: &str) -> Option<usize> {
        self.trains.iter().position(|t| t.name == name)
    }

    /// Look up a hex by name.
    #[must_use]
    pub fn hex_id(&self, name: &str) -> Option<HexId> {
        self.map
            .hexes
            .iter()
            .position(|h| h.name == name)
            .map(|i| HexId::new(i as u16))
    }

    /// Look up a tile by name.
    #[must_use]
    pub fn tile_id(&self, name: &str) -> Option<TileId> {
        self.map
            .tiles
            .iter()
            .position(|t| t.name == name)
            .map(|i| TileId::new(i as u16))
    }

    /// Run every configuration check and report the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_rules()?;
        let market = StockMarket::from_config(&self.market)?;
        self.validate_trains_and_phases()?;
        self.validate_map()?;
        self.validate_companies()?;
        self.validate_start_packet(&market)?;
        Ok(())
    }

    fn validate_rules(&self) -> Result<(), ConfigError> {
        if self.bank_cash <= 0 {
            return Err(ConfigError::Invalid("bank cash must be positive".into()));
        }
        if self.starting_cash.is_empty() || self.certificate_limits.is_empty() {
            return Err(ConfigError::Invalid(
                "starting cash and certificate limits need at least one player count".into(),
            ));
        }
        let unit = self.stock.share_unit;
        if unit == 0 || 100 % unit != 0 {
            return Err(ConfigError::Invalid(format!("share unit {unit} does not divide 100")));
        }
        if self.stock.pool_limit > 100 || self.stock.hold_limit > 100 || self.stock.float_percent > 100 {
            return Err(ConfigError::Invalid("percentages must not exceed 100".into()));
        }
        if self.operating.revenue_unit <= 0 {
            return Err(ConfigError::Invalid("revenue unit must be positive".into()));
        }
        if self.operating.token_costs.is_empty() {
            return Err(ConfigError::Invalid("token costs must not be empty".into()));
        }
        if self.operating.private_price_min_percent > self.operating.private_price_max_percent {
            return Err(ConfigError::Invalid("private price band is inverted".into()));
        }
        Ok(())
    }

    fn validate_trains_and_phases(&self) -> Result<(), ConfigError> {
        if self.trains.is_empty() {
            return Err(ConfigError::Invalid("no trains defined".into()));
        }
        check_unique(self.trains.iter().map(|t| t.name.as_str()))?;
        for train in &self.trains {
            if let Some(rust) = &train.rusted_by {
                self.train_type(rust)
                    .ok_or_else(|| ConfigError::UnknownTrain(rust.clone()))?;
            }
        }

        let first = self.phases.first().ok_or(ConfigError::NoPhases)?;
        if first.trigger.is_some() {
            return Err(ConfigError::Invalid("the first phase cannot have a trigger".into()));
        }
        for phase in &self.phases {
            if let Some(trigger) = &phase.trigger {
                self.train_type(trigger)
                    .ok_or_else(|| ConfigError::UnknownTrain(trigger.clone()))?;
            }
            if phase.operating_rounds == 0 {
                return Err(ConfigError::Invalid(format!(
                    "phase {} needs at least one operating round",
                    phase.name
                )));
            }
        }
        Ok(())
    }

    fn validate_map(&self) -> Result<(), ConfigError> {
        check_unique(self.map.hexes.iter().map(|h| h.name.as_str()))?;
        check_unique(self.map.tiles.iter().map(|t| t.name.as_str()))?;
        for tile in &self.map.tiles {
            for upgrade in &tile.upgrades {
                self.tile_id(upgrade)
                    .ok_or_else(|| ConfigError::UnknownTile(upgrade.clone()))?;
            }
        }
        for hex in &self.map.hexes {
            if let Some(tile) = &hex.tile {
                self.tile_id(tile).ok_or_else(|| ConfigError::UnknownTile(tile.clone()))?;
            }
        }
        Ok(())
    }

    fn validate_companies(&self) -> Result<(), ConfigError> {
        check_unique(self.companies.iter().map(CompanyConfig::name))?;
        let unit = self.stock.share_unit;

        for company in &self.companies {
            match company {
                CompanyConfig::Private(private) => {
                    // Used specials are tracked as bits of a u32.
                    if private.specials.len() > u32::BITS as usize {
                        return Err(ConfigError::Invalid(format!(
                            "{}: at most {} special properties",
                            private.name,
                            u32::BITS
                        )));
                    }
                    for special in &private.specials {
                        for hex in &special.hexes {
                            self.hex_id(hex).ok_or_else(|| ConfigError::UnknownHex(hex.clone()))?;
                        }
                    }
                }
                CompanyConfig::Public(public) => {
                    let total: u32 = public.shares.iter().sum();
                    if total != 100 {
                        return Err(ConfigError::BadShares {
                            company: public.name.clone(),
                            total,
                        });
                    }
                    let (president, ordinary) = public.shares.split_first().ok_or_else(|| {
                        ConfigError::BadShares {
                            company: public.name.clone(),
                            total: 0,
                        }
                    })?;
                    if president % unit != 0 || ordinary.iter().any(|&s| s != unit) {
                        return Err(ConfigError::Invalid(format!(
                            "{}: ordinary certificates must be {unit}% and the president's a multiple",
                            public.name
                        )));
                    }
                    if let Some(home) = &public.home {
                        self.hex_id(home).ok_or_else(|| ConfigError::UnknownHex(home.clone()))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_start_packet(&self, market: &StockMarket) -> Result<(), ConfigError> {
        for item in &self.start_packet.items {
            let id = self
                .company_id(&item.company)
                .ok_or_else(|| ConfigError::UnknownCompany(item.company.clone()))?;
            if !matches!(self.companies[id.index()], CompanyConfig::Private(_)) {
                return Err(ConfigError::Invalid(format!(
                    "start item {} must be a private company",
                    item.company
                )));
            }
            let Some(bonus) = &item.bonus else { continue };
            let bonus_id = self
                .company_id(&bonus.company)
                .ok_or_else(|| ConfigError::UnknownCompany(bonus.company.clone()))?;
            let CompanyConfig::Public(public) = &self.companies[bonus_id.index()] else {
                return Err(ConfigError::Invalid(format!(
                    "bonus {} must be a public company",
                    bonus.company
                )));
            };
            if bonus.president && public.has_stock_price {
                let par = bonus.par.ok_or_else(|| {
                    ConfigError::Invalid(format!("bonus president of {} needs a par", public.name))
                })?;
                market.par_cell(par).ok_or(ConfigError::NoParSpaceAt(par))?;
            }
        }
        Ok(())
    }
}

fn lookup(table: &[PlayerCountValue], players: usize) -> Option<i64> {
    table.iter().find(|e| e.players == players).map(|e| e.value)
}

fn check_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = rustc_hash::FxHashSet::default();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::sample;

    #[test]
    fn test_sample_config_is_valid() {
        let config = sample::config();
        assert!(config.validate().is_ok());
        assert_eq!(config.starting_cash(4), Some(600));
        assert_eq!(config.certificate_limit(4), Some(16));
    }

    #[test]
    fn test_player_count_check() {
        let config = sample::config();
        assert!(config.check_player_count(3).is_ok());
        assert_eq!(config.check_player_count(9), Err(ConfigError::PlayerCount(9)));
    }

    #[test]
    fn test_token_cost_repeats_last() {
        let rules = OperatingRules {
            token_costs: vec![0, 40, 100],
            ..OperatingRules::default()
        };
        assert_eq!(rules.token_cost(0), 0);
        assert_eq!(rules.token_cost(2), 100);
        assert_eq!(rules.token_cost(7), 100);
    }

    #[test]
    fn test_bad_shares_rejected() {
        let config = sample::config().with_company(CompanyConfig::Public(PublicConfig {
            name: "Broken".into(),
            shares: vec![20, 10, 10],
            tokens: 2,
            home: None,
            has_stock_price: true,
            starting_treasury: 0,
            can_split: false,
            always_split: false,
        }));
        assert_eq!(
            config.validate(),
            Err(ConfigError::BadShares {
                company: "Broken".into(),
                total: 40
            })
        );
    }

    #[test]
    fn test_too_many_specials_rejected() {
        let mut config = sample::config();
        let special = SpecialConfig {
            kind: SpecialKind::TileLay,
            hexes: Vec::new(),
            extra: true,
            free: false,
            usable_by_player: false,
        };
        let Some(CompanyConfig::Private(sv)) = config.companies.iter_mut().find(|c| c.name() == "SV") else {
            panic!("SV missing");
        };
        sv.specials = vec![special; 32];
        assert!(config.validate().is_ok());

        if let Some(CompanyConfig::Private(sv)) = config.companies.iter_mut().find(|c| c.name() == "SV") {
            sv.specials.push(sv.specials[0].clone());
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid("SV: at most 32 special properties".into()))
        );
    }

    #[test]
    fn test_duplicate_company_rejected() {
        let mut config = sample::config();
        let copy = config.companies[0].clone();
        config = config.with_company(copy);
        assert!(matches!(config.validate(), Err(ConfigError::Duplicate(_))));
    }

    #[test]
    fn test_unknown_phase_trigger_rejected() {
        let mut config = sample::config();
        config.phases[1].trigger = Some("9".into());
        assert_eq!(config.validate(), Err(ConfigError::UnknownTrain("9".into())));
    }

    #[test]
    fn test_toml_parse_error() {
        let err = GameConfig::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_company_lookup() {
        let config = sample::config();
        let prr = config.company_id("PRR").unwrap();
        assert_eq!(config.companies[prr.index()].name(), "PRR");
        assert!(config.company_id("Nowhere").is_none());
    }
}
