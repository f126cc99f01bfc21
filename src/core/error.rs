//! Error types.
//!
//! - `ValidationError`: a player action was rejected. Non-fatal; the game
//!   state is untouched and the message goes to the display channel.
//! - `ConfigError`: the game definition is unusable. Fatal at load time.
//!
//! Broken internal invariants (moving a certificate its owner does not hold,
//! closing a move set that was never opened) are bugs and panic instead.

use thiserror::Error;

use super::player::PlayerId;

/// Why an action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the game is over")]
    GameOver,

    #[error("it is {expected}'s turn, not {player}'s")]
    NotYourTurn { player: PlayerId, expected: PlayerId },

    #[error("{action} is not allowed in the current round")]
    WrongRound { action: &'static str },

    #[error("{action} is not allowed in step {step}")]
    WrongStep { action: &'static str, step: &'static str },

    #[error("{what} is not available")]
    NotAvailable { what: String },

    #[error("{holder} needs {need} but has {have}")]
    InsufficientCash { holder: String, need: i64, have: i64 },

    #[error("{what} is not owned by {owner}")]
    NotOwner { what: String, owner: String },

    // Stock round
    #[error("certificate limit of {limit} reached")]
    CertificateLimit { limit: u32 },

    #[error("holding limit of {limit}% in {company} reached")]
    HoldingLimit { company: String, limit: u32 },

    #[error("pool may not hold more than {limit}% of {company}")]
    PoolLimit { company: String, limit: u32 },

    #[error("cannot dump presidency of {company}")]
    CannotDumpPresidency { company: String },

    #[error("only one certificate may be bought per turn")]
    BuyLimit,

    #[error("cannot buy after selling this turn")]
    BuyAfterSell,

    #[error("cannot sell after buying this turn")]
    SellAfterBuy,

    #[error("no shares may be sold in the first stock round")]
    NoSaleInFirstRound,

    #[error("cannot buy {company} after selling it this round")]
    RebuyAfterSale { company: String },

    #[error("{company} has already been started")]
    AlreadyStarted { company: String },

    #[error("{company} has not been started")]
    NotStarted { company: String },

    #[error("{price} is not a valid par price")]
    InvalidPar { price: i64 },

    #[error("cannot sell {shares} share(s) of {company}; {held} held")]
    NotEnoughShares { company: String, shares: u32, held: u32 },

    #[error("selling {company} would hand its presidency to another player")]
    PresidencyProtected { company: String },

    // Start round
    #[error("bid must be at least {minimum}")]
    BidTooLow { minimum: i64 },

    #[error("only the cheapest item may be bought")]
    NotCheapest,

    #[error("the cheapest item must be taken")]
    MustBuy,

    // Operating round
    #[error("{company} is not operating")]
    WrongCompany { company: String },

    #[error("revenue {amount} is not a non-negative multiple of {unit}")]
    InvalidRevenue { amount: i64, unit: i64 },

    #[error("{company} owns no trains")]
    NoTrains { company: String },

    #[error("{company} must own a train")]
    MustOwnTrain { company: String },

    #[error("train limit of {limit} reached")]
    TrainLimit { limit: u32 },

    #[error("price {price} is invalid; allowed {min}..={max}")]
    PriceOutOfRange { price: i64, min: i64, max: i64 },

    #[error("president cash must be {expected}, got {got}")]
    InvalidPresidentCash { expected: i64, got: i64 },

    #[error("only the cheapest train may be bought with president cash")]
    NotCheapestTrain,

    #[error("privates may not be bought in this phase")]
    PrivateSalesClosed,

    #[error("trains may not be traded between companies in this phase")]
    TrainTradingClosed,

    #[error("{colour} tiles may not be laid in this phase")]
    TileColourNotAllowed { colour: String },

    #[error("no copies of tile {tile} left")]
    NoTileCopies { tile: String },

    #[error("tile {tile} cannot be laid on {hex}")]
    InvalidUpgrade { tile: String, hex: String },

    #[error("no tile lays left this turn")]
    NoTileLays,

    #[error("{company} has no tokens left")]
    NoTokensLeft { company: String },

    #[error("no free token slot on {hex}")]
    NoTokenSlot { hex: String },

    #[error("{company} already has a token on {hex}")]
    AlreadyTokened { company: String, hex: String },

    #[error("special property of {private} cannot be used here")]
    SpecialNotUsable { private: String },
}

/// Why a game definition could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown company: {0}")]
    UnknownCompany(String),

    #[error("unknown train: {0}")]
    UnknownTrain(String),

    #[error("unknown hex: {0}")]
    UnknownHex(String),

    #[error("unknown tile: {0}")]
    UnknownTile(String),

    #[error("invalid market cell {code:?} at row {row}, column {column}")]
    InvalidMarketCell { row: usize, column: usize, code: String },

    #[error("stock market has no par spaces")]
    NoParSpaces,

    #[error("no par space at price {0}")]
    NoParSpaceAt(i64),

    #[error("no phases defined")]
    NoPhases,

    #[error("shares of {company} sum to {total}%, expected 100%")]
    BadShares { company: String, total: u32 },

    #[error("{0} players not supported")]
    PlayerCount(usize),

    #[error("duplicate name: {0}")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_message() {
        let err = ValidationError::CannotDumpPresidency { company: "PRR".into() };
        assert_eq!(err.to_string(), "cannot dump presidency of PRR");
    }

    #[test]
    fn test_turn_message() {
        let err = ValidationError::NotYourTurn {
            player: PlayerId::new(1),
            expected: PlayerId::new(0),
        };
        assert_eq!(err.to_string(), "it is Player 0's turn, not Player 1's");
    }

    #[test]
    fn test_config_message() {
        let err = ConfigError::BadShares { company: "B&O".into(), total: 90 };
        assert_eq!(err.to_string(), "shares of B&O sum to 90%, expected 100%");
    }
}
