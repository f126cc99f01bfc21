//! Player actions.
//!
//! An `Action` is the only input the engine accepts. Each variant names the
//! ledger or map objects it refers to by table ID; the active round decides
//! whether it is legal. Actions are plain data so they can be listed by
//! `possible_actions`, compared, and recorded for replay.

use serde::{Deserialize, Serialize};

use super::ids::{CompanyId, HexId, TileId, TrainId};
use super::player::PlayerId;

/// Where a share is bought from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareSource {
    Ipo,
    Pool,
}

/// How an operating company distributes its revenue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allocation {
    /// Everything to the shareholders.
    Payout,
    /// Half to the shareholders, half to the treasury.
    Split,
    /// Everything to the treasury.
    Withhold,
}

/// A complete game action.
///
/// ```
/// use rust_18xx::core::{Action, CompanyId, ShareSource};
///
/// let buy = Action::BuyCertificate { company: CompanyId::new(3), from: ShareSource::Pool };
/// assert_eq!(buy.name(), "buy certificate");
/// assert_ne!(buy, Action::Done);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Buy a start packet item at its current price.
    BuyStartItem { company: CompanyId },
    /// Bid on a start packet item, or raise in an auction.
    Bid { company: CompanyId, amount: i64 },
    /// Pass in the start round.
    Pass,

    /// Set the par price and buy the president's certificate.
    StartCompany { company: CompanyId, price: i64 },
    /// Buy one certificate.
    BuyCertificate { company: CompanyId, from: ShareSource },
    /// Sell ordinary shares of a company to the Pool.
    SellShares { company: CompanyId, shares: u32 },

    /// Lay or upgrade a tile, optionally through a private's special property.
    LayTile {
        hex: HexId,
        tile: TileId,
        rotation: u8,
        special: Option<CompanyId>,
    },
    /// Place a base token, optionally through a private's special property.
    LayBaseToken { hex: HexId, special: Option<CompanyId> },
    /// Declare this turn's revenue.
    SetRevenue { amount: i64 },
    /// Choose how to distribute the declared revenue.
    SetDividend { allocation: Allocation },
    /// Buy a train. `president_cash` is the president's contribution.
    BuyTrain {
        train: TrainId,
        price: i64,
        president_cash: i64,
    },
    /// Buy a private from its owning player.
    BuyPrivate { private: CompanyId, price: i64 },
    /// Close a private owned by the operating company.
    ClosePrivate { private: CompanyId },
    /// Leave the current operating step.
    Skip,

    /// End the turn (stock round) or the company's operation (operating round).
    Done,
}

impl Action {
    /// Short human-readable name used in rejection messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::BuyStartItem { .. } => "buy start item",
            Action::Bid { .. } => "bid",
            Action::Pass => "pass",
            Action::StartCompany { .. } => "start company",
            Action::BuyCertificate { .. } => "buy certificate",
            Action::SellShares { .. } => "sell shares",
            Action::LayTile { .. } => "lay tile",
            Action::LayBaseToken { .. } => "lay base token",
            Action::SetRevenue { .. } => "set revenue",
            Action::SetDividend { .. } => "set dividend",
            Action::BuyTrain { .. } => "buy train",
            Action::BuyPrivate { .. } => "buy private",
            Action::ClosePrivate { .. } => "close private",
            Action::Skip => "skip",
            Action::Done => "done",
        }
    }
}

/// A processed action with its position in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Position among all successfully processed actions.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, sequence: u32) -> Self {
        Self {
            player,
            action,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        let a = Action::SellShares { company: CompanyId::new(1), shares: 2 };
        let b = Action::SellShares { company: CompanyId::new(1), shares: 2 };
        let c = Action::SellShares { company: CompanyId::new(1), shares: 1 };

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Pass.name(), "pass");
        assert_eq!(Action::SetRevenue { amount: 80 }.name(), "set revenue");
        assert_eq!(
            Action::LayTile {
                hex: HexId::new(0),
                tile: TileId::new(0),
                rotation: 0,
                special: None
            }
            .name(),
            "lay tile"
        );
    }

    #[test]
    fn test_action_record() {
        let action = Action::BuyStartItem { company: CompanyId::new(0) };
        let record = ActionRecord::new(PlayerId::new(2), action.clone(), 7);

        assert_eq!(record.player, PlayerId::new(2));
        assert_eq!(record.action, action);
        assert_eq!(record.sequence, 7);
    }

    #[test]
    fn test_action_record_serialization() {
        let record = ActionRecord::new(
            PlayerId::new(1),
            Action::BuyTrain {
                train: TrainId::new(4),
                price: 80,
                president_cash: 0,
            },
            3,
        );
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
