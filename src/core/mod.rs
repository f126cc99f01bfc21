//! Core engine types: players, IDs, actions, errors, configuration, RNG.
//!
//! Nothing in here knows about rounds or the ledger. Game titles configure
//! the engine through `GameConfig` rather than code.

pub mod action;
pub mod config;
pub mod error;
pub mod ids;
pub mod player;
pub mod report;
pub mod rng;

pub use action::{Action, ActionRecord, Allocation, ShareSource};
pub use config::{
    BonusConfig, Capitalisation, CompanyConfig, DividendDestination, GameConfig, GameEndRule,
    HexConfig, IpoPrice, MapConfig, MarketConfig, OperatingRules, PhaseConfig, PlayerCountValue,
    PrivateConfig, PublicConfig, SellBuyPolicy, SpecialConfig, SpecialKind, StartItemConfig,
    StartPacketConfig, StartRoundKind, StockRules, TileColour, TileConfig, TrainConfig,
};
pub use error::{ConfigError, ValidationError};
pub use ids::{CashHolder, CertificateId, CompanyId, HexId, PortfolioId, TileId, TrainId};
pub use player::{PlayerId, PlayerMap};
pub use report::ReportLog;
pub use rng::GameRng;
