//! Minimal map state: which tile lies on each hex and whose base tokens
//! sit there.
//!
//! Geometry and route finding live outside the engine. The engine only
//! checks what the rules need: upgrade paths, phase colours, tile copies,
//! lay costs and free token slots.
//!
//! ## Tile supply
//!
//! A tile copy is in use while it lies on a hex that did not start with it
//! preprinted. Upgrading returns the replaced copy to the supply, so the
//! number of copies left is computed from the map rather than stored.

use serde::{Deserialize, Serialize};

use crate::core::{CompanyId, GameConfig, HexId, TileColour, TileId};

/// Mutable state of one hex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexState {
    pub tile: Option<TileId>,
    pub rotation: u8,
    pub tokens: Vec<CompanyId>,
}

/// Map state indexed by `HexId`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapState {
    hexes: Vec<HexState>,
}

impl MapState {
    /// Build the starting map with preprinted tiles.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let hexes = config
            .map
            .hexes
            .iter()
            .map(|hex| HexState {
                tile: hex.tile.as_deref().and_then(|t| config.tile_id(t)),
                rotation: 0,
                tokens: Vec::new(),
            })
            .collect();
        Self { hexes }
    }

    #[must_use]
    pub fn hex(&self, hex: HexId) -> &HexState {
        &self.hexes[hex.index()]
    }

    pub fn hex_mut(&mut self, hex: HexId) -> &mut HexState {
        &mut self.hexes[hex.index()]
    }

    #[must_use]
    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    /// Check if a hex still carries its starting tile (or none).
    #[must_use]
    pub fn is_untouched(&self, config: &GameConfig, hex: HexId) -> bool {
        self.hex(hex).tile == preprinted(config, hex)
    }

    /// Copies of a tile still in the supply; `None` is unlimited.
    #[must_use]
    pub fn copies_left(&self, config: &GameConfig, tile: TileId) -> Option<u32> {
        let total = config.map.tiles[tile.index()].count?;
        let in_use = self
            .hexes
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                h.tile == Some(tile) && preprinted(config, HexId::new(*i as u16)) != Some(tile)
            })
            .count() as u32;
        Some(total.saturating_sub(in_use))
    }

    /// Check if `tile` may replace whatever lies on `hex`.
    #[must_use]
    pub fn is_valid_lay(&self, config: &GameConfig, hex: HexId, tile: TileId) -> bool {
        match self.hex(hex).tile {
            None => config.map.tiles[tile.index()].colour == TileColour::Yellow,
            Some(current) => {
                let name = &config.map.tiles[tile.index()].name;
                config.map.tiles[current.index()].upgrades.contains(name)
            }
        }
    }

    /// Cost of laying on a hex: its terrain cost on the first lay only.
    #[must_use]
    pub fn lay_cost(&self, config: &GameConfig, hex: HexId) -> i64 {
        if self.is_untouched(config, hex) {
            config.map.hexes[hex.index()].cost
        } else {
            0
        }
    }

    /// Free base token slots on a hex.
    #[must_use]
    pub fn free_slots(&self, config: &GameConfig, hex: HexId) -> u32 {
        let slots = config.map.hexes[hex.index()].token_slots;
        slots.saturating_sub(self.hex(hex).tokens.len() as u32)
    }

    /// Hexes where a company has a base token.
    pub fn tokens_of(&self, company: CompanyId) -> impl Iterator<Item = HexId> + '_ {
        self.hexes
            .iter()
            .enumerate()
            .filter(move |(_, h)| h.tokens.contains(&company))
            .map(|(i, _)| HexId::new(i as u16))
    }
}

fn preprinted(config: &GameConfig, hex: HexId) -> Option<TileId> {
    config.map.hexes[hex.index()]
        .tile
        .as_deref()
        .and_then(|t| config.tile_id(t))
}
