//! Identifiers for ledger objects, map objects and owners.
//!
//! ## Table IDs
//!
//! Companies, certificates, trains, hexes and tiles are stored in flat
//! tables built from `GameConfig` at setup. Their IDs are indices into those
//! tables and never change during a game.
//!
//! ## Owners
//!
//! - `PortfolioId`: who holds a certificate or a train. The Bank owns four
//!   distinct portfolios (IPO, Pool, Unavailable, ScrapHeap).
//! - `CashHolder`: who holds money. The Bank is a single cash holder.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

macro_rules! table_id {
    ($(#[$meta:meta])* $name:ident($inner:ty), $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl $name {
            /// Create a new ID.
            #[must_use]
            pub const fn new(id: $inner) -> Self {
                Self(id)
            }

            /// Position in the owning table.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

table_id!(
    /// A private or public company.
    CompanyId(u16),
    "Company"
);
table_id!(
    /// One physical share certificate (or the single certificate of a private).
    CertificateId(u32),
    "Certificate"
);
table_id!(
    /// One physical train.
    TrainId(u32),
    "Train"
);
table_id!(
    /// A map hex.
    HexId(u16),
    "Hex"
);
table_id!(
    /// An entry of the tile manifest.
    TileId(u16),
    "Tile"
);

/// Owner of certificates and trains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortfolioId {
    /// A player's hand.
    Player(PlayerId),
    /// A company's treasury holdings.
    Company(CompanyId),
    /// Initial offering: unsold certificates and new trains.
    Ipo,
    /// Bank pool: sold certificates and discarded trains.
    Pool,
    /// Reserved certificates (start packet bonuses).
    Unavailable,
    /// Closed privates, closed companies' certificates, rusted trains.
    ScrapHeap,
}

impl PortfolioId {
    /// Check if this portfolio belongs to the Bank.
    #[must_use]
    pub const fn is_bank(self) -> bool {
        matches!(
            self,
            PortfolioId::Ipo | PortfolioId::Pool | PortfolioId::Unavailable | PortfolioId::ScrapHeap
        )
    }

    /// The owning player, if any.
    #[must_use]
    pub const fn player(self) -> Option<PlayerId> {
        match self {
            PortfolioId::Player(p) => Some(p),
            _ => None,
        }
    }

    /// The owning company, if any.
    #[must_use]
    pub const fn company(self) -> Option<CompanyId> {
        match self {
            PortfolioId::Company(c) => Some(c),
            _ => None,
        }
    }
}

impl std::fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioId::Player(p) => write!(f, "{p}"),
            PortfolioId::Company(c) => write!(f, "{c}"),
            PortfolioId::Ipo => f.write_str("IPO"),
            PortfolioId::Pool => f.write_str("Pool"),
            PortfolioId::Unavailable => f.write_str("Unavailable"),
            PortfolioId::ScrapHeap => f.write_str("ScrapHeap"),
        }
    }
}

/// Owner of money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashHolder {
    /// A player's personal cash.
    Player(PlayerId),
    /// A public company's treasury.
    Company(CompanyId),
    /// The Bank.
    Bank,
}

impl From<PlayerId> for CashHolder {
    fn from(player: PlayerId) -> Self {
        CashHolder::Player(player)
    }
}

impl From<CompanyId> for CashHolder {
    fn from(company: CompanyId) -> Self {
        CashHolder::Company(company)
    }
}
