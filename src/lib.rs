//! # rust-18xx
//!
//! A rules engine for 18xx railway/stock-market board games.
//!
//! ## Design Principles
//!
//! 1. **Configuration Over Code**: A title is a `GameConfig` loaded from
//!    TOML: market grid, phases, trains, companies, start packet and map.
//!
//! 2. **Everything Through the Log**: Every state change is a reversible
//!    `Move` recorded in a move set, one set per action. Undo and redo
//!    replay the log; checkpoints cut it at company turns and round ends.
//!
//! 3. **Validate, Then Execute**: Rounds check an action completely before
//!    touching state. A rejected action leaves no trace but an error line.
//!
//! ## Architecture
//!
//! - **Sequencer**: Start round, then stock rounds alternating with sets
//!   of operating rounds, until the Bank breaks, a market end cell is
//!   reached, or a player goes bankrupt.
//!
//! - **Deterministic**: A seed plus the accepted action list reproduces a
//!   game exactly (`GameSession::replay`).
//!
//! ## Modules
//!
//! - `core`: IDs, players, actions, errors, configuration, reports, RNG
//! - `market`: Stock price grid, movement rules, price tokens
//! - `ledger`: Cash holders, companies, certificates, trains, holdings
//! - `map`: Tiles and base tokens on hexes
//! - `moves`: Reversible moves, move sets, undo/redo
//! - `rounds`: Start, stock, operating and share-selling rounds
//! - `game`: Game state, shared ledger operations, sequencing, sessions
//! - `games`: Bundled titles

pub mod core;
pub mod game;
pub mod games;
pub mod ledger;
pub mod map;
pub mod market;
pub mod moves;
pub mod rounds;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, Allocation, CertificateId, CompanyId, ConfigError, GameConfig, GameRng,
    HexId, PlayerId, PlayerMap, PortfolioId, ReportLog, ShareSource, TileId, TrainId,
    ValidationError,
};

pub use crate::game::{GameSession, GameState, ManagerState, ReplayError};

pub use crate::market::{Cell, PriceMove, StockMarket, StockSpace};

pub use crate::moves::{Move, MoveSet, MoveStack, Transaction};

pub use crate::rounds::{
    ActiveRound, GameResult, OperatingRound, OperatingStep, PendingPurchase, Round, RoundStatus,
    ShareSellingRound, StartRound, StockRound,
};
