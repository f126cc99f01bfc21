//! Stock market: the price grid, price movement, and token positions.

pub mod grid;
pub mod space;
pub mod tokens;

pub use grid::{PriceMove, StockMarket};
pub use space::{Cell, StockSpace};
pub use tokens::MarketTokens;
