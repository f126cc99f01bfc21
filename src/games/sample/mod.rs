//! A small 1830-style title used by the tests, the benches and as a
//! worked example of the configuration format.
//!
//! - Six privates sold in an auction start round, two with bonus
//!   certificates (a PRR share with CA, the B&O presidency with BO)
//! - Eight public companies with a 20% president's certificate
//! - Trains 2 to D; the 2, 3 and 4 rust
//! - Eleven hexes with enough tiles to exercise upgrades and copy limits

use crate::core::GameConfig;

/// TOML source of the title.
pub const SOURCE: &str = include_str!("sample.toml");

/// Load the title.
///
/// Panics if the bundled file does not load; it is part of the crate and
/// covered by the tests.
#[must_use]
pub fn config() -> GameConfig {
    match GameConfig::from_toml(SOURCE) {
        Ok(config) => config,
        Err(e) => panic!("Bundled sample title is invalid: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompanyConfig, StartRoundKind};

    #[test]
    fn test_loads() {
        let config = config();
        assert_eq!(config.name, "Sample 1830");
        assert_eq!(config.start_packet.kind, StartRoundKind::Auction);
        assert_eq!(config.start_packet.items.len(), 6);
    }

    #[test]
    fn test_privates_and_publics() {
        let config = config();
        let privates = config
            .companies
            .iter()
            .filter(|c| matches!(c, CompanyConfig::Private(_)))
            .count();
        assert_eq!(privates, 6);
        assert_eq!(config.companies.len(), 14);
    }

    #[test]
    fn test_first_phase_is_untriggered() {
        let config = config();
        assert!(config.phases[0].trigger.is_none());
        assert_eq!(config.phases[1].trigger.as_deref(), Some("3"));
        assert_eq!(config.trains[0].name, "2");
    }
}
