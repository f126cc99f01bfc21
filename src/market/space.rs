//! Stock market cells.
//!
//! A cell is written in configuration as its price followed by flag
//! letters, e.g. `"67p"` or `"0c"`:
//!
//! | Letter | Flag |
//! |--------|------|
//! | `p` | par price may be set here |
//! | `c` | entering closes the company |
//! | `e` | entering ends the game |
//! | `b` | below a ledge |
//! | `l` | left of a ledge |
//! | `y` | certificates do not count towards the certificate limit |
//! | `o` | no per-company holding limit |
//! | `n` | no one-certificate-per-turn buy limit |
//!
//! An empty string is a hole in the grid.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Grid coordinates; row 0 is the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub column: u8,
}

impl Cell {
    #[must_use]
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'A' + self.row) as char, u16::from(self.column) + 1)
    }
}

/// One priced cell of the stock market.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StockSpace {
    pub price: i64,
    pub start: bool,
    pub closes_company: bool,
    pub ends_game: bool,
    pub below_ledge: bool,
    pub left_of_ledge: bool,
    pub no_cert_limit: bool,
    pub no_hold_limit: bool,
    pub no_buy_limit: bool,
}

impl StockSpace {
    /// Parse a cell code. Returns `None` for a hole.
    pub fn parse(code: &str, row: usize, column: usize) -> Result<Option<Self>, ConfigError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        let invalid = || ConfigError::InvalidMarketCell {
            row,
            column,
            code: code.to_string(),
        };

        let split = code
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(code.len());
        let (digits, flags) = code.split_at(split);
        let price = digits.parse::<i64>().map_err(|_| invalid())?;

        let mut space = StockSpace {
            price,
            ..StockSpace::default()
        };
        for flag in flags.chars() {
            match flag.to_ascii_lowercase() {
                'p' => space.start = true,
                'c' => space.closes_company = true,
                'e' => space.ends_game = true,
                'b' => space.below_ledge = true,
                'l' => space.left_of_ledge = true,
                'y' => space.no_cert_limit = true,
                'o' => space.no_hold_limit = true,
                'n' => space.no_buy_limit = true,
                _ => return Err(invalid()),
            }
        }
        Ok(Some(space))
    }
}
