//! Trains.
//!
//! Physical trains are created from the configured train types at setup and
//! all start in the IPO. New trains are sold type by type in configuration
//! order.

use serde::{Deserialize, Serialize};

use crate::core::TrainId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub id: TrainId,
    /// Index into the configured train types.
    pub kind: usize,
    pub name: String,
    pub price: i64,
}
