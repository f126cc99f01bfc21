//! Stock price grid and price movement.
//!
//! Movement functions are total: every call returns a destination, which
//! equals the origin when no move is possible. They never touch game state;
//! the caller turns a `PriceMove` into ledger moves.
//!
//! ## Rules
//!
//! - `right_or_up`: right one column, or up one row at the right edge or
//!   when the cell is left of a ledge.
//! - `left_or_down`: left one column, or down one row at the left edge.
//! - `down(n)`: drop `n` rows, stopping at the lowest defined cell of the
//!   column. Landing exactly `n` rows down on a below-ledge cell recoils one
//!   row up.
//! - `up`: up one row; at the top with `up_or_down_right` set, diagonally
//!   down-right instead.

use serde::{Deserialize, Serialize};

use super::space::{Cell, StockSpace};
use crate::core::{ConfigError, MarketConfig};

/// Result of a price movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMove {
    pub from: Cell,
    pub to: Cell,
    /// The destination closes the company; its token leaves the grid.
    pub closes: bool,
    /// The destination ends the game.
    pub ends_game: bool,
}

impl PriceMove {
    /// Check if the token changes cell.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Rows are named `A` to `Z`.
pub const MAX_ROWS: usize = 26;

/// The fixed layout of the stock market.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockMarket {
    rows: Vec<Vec<Option<StockSpace>>>,
    up_or_down_right: bool,
}

impl StockMarket {
    /// Build the grid from its configuration.
    pub fn from_config(config: &MarketConfig) -> Result<Self, ConfigError> {
        if config.rows.len() > MAX_ROWS {
            return Err(ConfigError::Invalid(format!(
                "stock market has {} rows; at most {MAX_ROWS} can be named",
                config.rows.len()
            )));
        }
        let mut rows = Vec::with_capacity(config.rows.len());
        for (r, codes) in config.rows.iter().enumerate() {
            if codes.len() > u8::MAX as usize {
                return Err(ConfigError::Invalid("stock market has too many columns".into()));
            }
            let row = codes
                .iter()
                .enumerate()
                .map(|(c, code)| StockSpace::parse(code, r, c))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let market = Self {
            rows,
            up_or_down_right: config.up_or_down_right,
        };
        if market.par_cells().is_empty() {
            return Err(ConfigError::NoParSpaces);
        }
        Ok(market)
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The space at `cell`, if defined.
    #[must_use]
    pub fn space(&self, cell: Cell) -> Option<&StockSpace> {
        self.rows
            .get(cell.row as usize)?
            .get(cell.column as usize)?
            .as_ref()
    }

    /// The space at `cell`.
    ///
    /// Panics if the cell is a hole; price tokens only ever sit on
    /// defined cells.
    #[must_use]
    pub fn expect_space(&self, cell: Cell) -> &StockSpace {
        match self.space(cell) {
            Some(space) => space,
            None => panic!("No stock space at {cell}"),
        }
    }

    /// Price of the space at `cell`.
    #[must_use]
    pub fn price(&self, cell: Cell) -> i64 {
        self.expect_space(cell).price
    }

    fn defined(&self, row: i64, column: i64) -> Option<Cell> {
        if row < 0 || column < 0 {
            return None;
        }
        let cell = Cell::new(row as u8, column as u8);
        self.space(cell).map(|_| cell)
    }

    /// All cells where a par price may be set, cheapest first.
    #[must_use]
    pub fn par_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter().enumerate().filter_map(move |(c, space)| {
                    space
                        .as_ref()
                        .filter(|s| s.start)
                        .map(|_| Cell::new(r as u8, c as u8))
                })
            })
            .collect();
        cells.sort_by_key(|&cell| (self.price(cell), cell));
        cells
    }

    /// The par cell with the given price.
    #[must_use]
    pub fn par_cell(&self, price: i64) -> Option<Cell> {
        self.par_cells().into_iter().find(|&c| self.price(c) == price)
    }

    fn result(&self, from: Cell, to: Cell) -> PriceMove {
        let space = self.expect_space(to);
        let moved = from != to;
        PriceMove {
            from,
            to,
            closes: moved && space.closes_company,
            ends_game: moved && space.ends_game,
        }
    }

    /// Movement after a dividend payout.
    #[must_use]
    pub fn right_or_up(&self, from: Cell) -> PriceMove {
        let (r, c) = (from.row as i64, from.column as i64);
        let here = self.expect_space(from);
        let to = if here.left_of_ledge {
            None
        } else {
            self.defined(r, c + 1)
        }
        .or_else(|| self.defined(r - 1, c))
        .unwrap_or(from);
        self.result(from, to)
    }

    /// Movement after withholding.
    #[must_use]
    pub fn left_or_down(&self, from: Cell) -> PriceMove {
        let (r, c) = (from.row as i64, from.column as i64);
        let to = self
            .defined(r, c - 1)
            .or_else(|| self.defined(r + 1, c))
            .unwrap_or(from);
        self.result(from, to)
    }

    /// Movement after selling `rows` shares.
    ///
    /// ```
    /// use rust_18xx::core::MarketConfig;
    /// use rust_18xx::market::{Cell, StockMarket};
    ///
    /// let rows = ["100p", "90", "80", "70"]
    ///     .iter()
    ///     .map(|c| vec![c.to_string()])
    ///     .collect();
    /// let market = StockMarket::from_config(&MarketConfig { rows, up_or_down_right: false }).unwrap();
    /// let mv = market.down(Cell::new(0, 0), 10);
    /// assert_eq!(mv.to, Cell::new(3, 0));
    /// ```
    #[must_use]
    pub fn down(&self, from: Cell, rows: u32) -> PriceMove {
        let (r, c) = (from.row as i64, from.column as i64);
        let mut landed = from;
        for step in 1..=rows as i64 {
            match self.defined(r + step, c) {
                Some(cell) => landed = cell,
                None => break,
            }
        }

        let exact = landed.row as i64 == r + rows as i64;
        if rows > 0 && exact && self.expect_space(landed).below_ledge {
            if let Some(recoil) = self.defined(landed.row as i64 - 1, c) {
                landed = recoil;
            }
        }
        self.result(from, landed)
    }

    /// Movement after a company sells out.
    #[must_use]
    pub fn up(&self, from: Cell) -> PriceMove {
        let (r, c) = (from.row as i64, from.column as i64);
        let to = match self.defined(r - 1, c) {
            Some(cell) => cell,
            None if r == 0 && self.up_or_down_right => {
                self.defined(r + 1, c + 1).unwrap_or(from)
            }
            None => from,
        };
        self.result(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(rows: &[&[&str]], up_or_down_right: bool) -> StockMarket {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        StockMarket::from_config(&MarketConfig {
            rows,
            up_or_down_right,
        })
        .unwrap()
    }

    fn small() -> StockMarket {
        market(
            &[
                &["60", "70", "80l", "90", "100e"],
                &["50", "60p", "70", "80", "90"],
                &["40", "50", "60p", "70", ""],
                &["30", "40", "50", "", ""],
                &["0c", "30", "40", "", ""],
            ],
            false,
        )
    }

    #[test]
    fn test_no_par_spaces() {
        let config = MarketConfig {
            rows: vec![vec!["100".into()]],
            up_or_down_right: false,
        };
        assert_eq!(StockMarket::from_config(&config), Err(ConfigError::NoParSpaces));
    }

    #[test]
    fn test_row_limit() {
        let mut rows: Vec<Vec<String>> = (0..MAX_ROWS).map(|_| vec!["50".to_string()]).collect();
        rows[0][0] = "100p".into();
        let mut config = MarketConfig {
            rows,
            up_or_down_right: false,
        };
        let market = StockMarket::from_config(&config).unwrap();
        assert_eq!(Cell::new(25, 0).to_string(), "Z1");
        assert!(market.space(Cell::new(25, 0)).is_some());

        config.rows.push(vec!["40".into()]);
        assert_eq!(
            StockMarket::from_config(&config),
            Err(ConfigError::Invalid(
                "stock market has 27 rows; at most 26 can be named".into()
            ))
        );
    }

    #[test]
    fn test_par_cells_sorted() {
        let m = small();
        assert_eq!(m.par_cells(), vec![Cell::new(1, 1), Cell::new(2, 2)]);
        assert_eq!(m.par_cell(60), Some(Cell::new(1, 1)));
        assert_eq!(m.par_cell(55), None);
    }

    #[test]
    fn test_right_moves_right() {
        let mv = small().right_or_up(Cell::new(1, 1));
        assert_eq!(mv.to, Cell::new(1, 2));
        assert!(mv.moved());
    }

    #[test]
    fn test_right_at_edge_moves_up() {
        let mv = small().right_or_up(Cell::new(2, 3));
        assert_eq!(mv.to, Cell::new(1, 3));
    }

    #[test]
    fn test_right_at_left_of_ledge_moves_up_or_stays() {
        let m = small();
        // Top row, left of ledge and nothing above: stays.
        let mv = m.right_or_up(Cell::new(0, 2));
        assert_eq!(mv.to, Cell::new(0, 2));
        assert!(!mv.moved());
    }

    #[test]
    fn test_right_into_end_cell() {
        let mv = small().right_or_up(Cell::new(0, 3));
        assert_eq!(mv.to, Cell::new(0, 4));
        assert!(mv.ends_game);
    }

    #[test]
    fn test_left_at_edge_moves_down() {
        let m = small();
        assert_eq!(m.left_or_down(Cell::new(2, 2)).to, Cell::new(2, 1));
        let mv = m.left_or_down(Cell::new(3, 0));
        assert_eq!(mv.to, Cell::new(4, 0));
        assert!(mv.closes);
    }

    #[test]
    fn test_left_bottom_corner_stays() {
        let mv = small().left_or_down(Cell::new(4, 0));
        assert!(!mv.moved());
        assert!(!mv.closes);
    }

    #[test]
    fn test_down_clamps_to_column() {
        let m = small();
        assert_eq!(m.down(Cell::new(1, 3), 5).to, Cell::new(2, 3));
        assert_eq!(m.down(Cell::new(1, 1), 0).to, Cell::new(1, 1));
    }

    #[test]
    fn test_down_ledge_recoil() {
        let m = market(
            &[
                &["", "", "120"],
                &["", "", "110"],
                &["", "", "100"],
                &["", "", "90p"],
                &["", "", "80"],
                &["", "", "70b"],
                &["", "", "60"],
            ],
            false,
        );
        // Exactly two rows down onto the below-ledge cell recoils one row.
        assert_eq!(m.down(Cell::new(3, 2), 2).to, Cell::new(4, 2));
        // Passing over the ledge does not.
        assert_eq!(m.down(Cell::new(3, 2), 3).to, Cell::new(6, 2));
    }

    #[test]
    fn test_down_into_closing_cell() {
        let mv = small().down(Cell::new(3, 0), 1);
        assert_eq!(mv.to, Cell::new(4, 0));
        assert!(mv.closes);
    }

    #[test]
    fn test_up_variants() {
        let m = small();
        assert_eq!(m.up(Cell::new(2, 1)).to, Cell::new(1, 1));
        assert_eq!(m.up(Cell::new(0, 1)).to, Cell::new(0, 1));

        let diagonal = market(&[&["100p", "110"], &["90", "100"]], true);
        assert_eq!(diagonal.up(Cell::new(0, 0)).to, Cell::new(1, 1));
    }
}
