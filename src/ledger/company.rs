//! Companies.
//!
//! `Company` is a tagged union over the two kinds of company. Both share a
//! `CompanyCore` with the name, certificates and the mutable status flags;
//! everything else is kind-specific.
//!
//! Status changes go through `Move::Company`, which swaps whole
//! `CompanyStatus` values. Treasury cash and the stock price have their own
//! moves.

use serde::{Deserialize, Serialize};

use crate::core::{CertificateId, CompanyId, HexId, SpecialKind};
use crate::market::Cell;

/// Mutable per-company flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyStatus {
    /// President's certificate sold and par set.
    pub started: bool,
    /// Flotation threshold reached and capital paid.
    pub floated: bool,
    /// Terminal.
    pub closed: bool,
    pub par: Option<Cell>,
    pub tokens_laid: u32,
    /// Bit `i` set when special property `i` has been used.
    pub specials_used: u32,
}

/// Fields shared by every company.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyCore {
    pub id: CompanyId,
    pub name: String,
    /// Certificates in configuration order; a public company's president's
    /// certificate comes first.
    pub certificates: Vec<CertificateId>,
    pub status: CompanyStatus,
}

/// A resolved special property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Special {
    pub kind: SpecialKind,
    /// Usable hexes; empty means any hex.
    pub hexes: Vec<HexId>,
    pub extra: bool,
    pub free: bool,
    pub usable_by_player: bool,
}

impl Special {
    /// Check if the property applies to a hex.
    #[must_use]
    pub fn covers(&self, hex: HexId) -> bool {
        self.hexes.is_empty() || self.hexes.contains(&hex)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateCompany {
    pub core: CompanyCore,
    pub base_price: i64,
    pub revenue: i64,
    pub specials: Vec<Special>,
}

impl PrivateCompany {
    /// The private's single certificate.
    #[must_use]
    pub fn certificate(&self) -> CertificateId {
        self.core.certificates[0]
    }

    /// Special properties not used yet, with their indices.
    pub fn unused_specials(&self) -> impl Iterator<Item = (usize, &Special)> {
        let used = self.core.status.specials_used;
        self.specials
            .iter()
            .enumerate()
            .filter(move |(i, _)| used & (1 << i) == 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicCompany {
    pub core: CompanyCore,
    pub cash: i64,
    /// Current stock price cell; kept in step with the market tokens.
    pub price: Option<Cell>,
    pub tokens: u32,
    pub home: Option<HexId>,
    pub has_stock_price: bool,
    pub starting_treasury: i64,
    pub can_split: bool,
    pub always_split: bool,
}

impl PublicCompany {
    /// The president's certificate.
    #[must_use]
    pub fn president_certificate(&self) -> CertificateId {
        self.core.certificates[0]
    }

    /// Base tokens not yet on the map.
    #[must_use]
    pub fn tokens_left(&self) -> u32 {
        self.tokens.saturating_sub(self.core.status.tokens_laid)
    }
}

/// A private or public company.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Company {
    Private(PrivateCompany),
    Public(PublicCompany),
}

impl Company {
    #[must_use]
    pub fn core(&self) -> &CompanyCore {
        match self {
            Company::Private(p) => &p.core,
            Company::Public(p) => &p.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut CompanyCore {
        match self {
            Company::Private(p) => &mut p.core,
            Company::Public(p) => &mut p.core,
        }
    }

    #[must_use]
    pub fn id(&self) -> CompanyId {
        self.core().id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.core().name
    }

    #[must_use]
    pub fn status(&self) -> &CompanyStatus {
        &self.core().status
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core().status.closed
    }

    #[must_use]
    pub fn as_private(&self) -> Option<&PrivateCompany> {
        match self {
            Company::Private(p) => Some(p),
            Company::Public(_) => None,
        }
    }

    #[must_use]
    pub fn as_public(&self) -> Option<&PublicCompany> {
        match self {
            Company::Public(p) => Some(p),
            Company::Private(_) => None,
        }
    }

    pub fn as_public_mut(&mut self) -> Option<&mut PublicCompany> {
        match self {
            Company::Public(p) => Some(p),
            Company::Private(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private() -> PrivateCompany {
        PrivateCompany {
            core: CompanyCore {
                id: CompanyId::new(0),
                name: "SV".into(),
                certificates: vec![CertificateId::new(0)],
                status: CompanyStatus::default(),
            },
            base_price: 20,
            revenue: 5,
            specials: vec![
                Special {
                    kind: SpecialKind::TileLay,
                    hexes: vec![HexId::new(3)],
                    extra: true,
                    free: true,
                    usable_by_player: false,
                },
                Special {
                    kind: SpecialKind::TokenLay,
                    hexes: vec![],
                    extra: false,
                    free: true,
                    usable_by_player: false,
                },
            ],
        }
    }

    #[test]
    fn test_special_coverage() {
        let p = private();
        assert!(p.specials[0].covers(HexId::new(3)));
        assert!(!p.specials[0].covers(HexId::new(4)));
        assert!(p.specials[1].covers(HexId::new(4)));
    }

    #[test]
    fn test_unused_specials() {
        let mut p = private();
        assert_eq!(p.unused_specials().count(), 2);
        p.core.status.specials_used = 0b01;
        let left: Vec<_> = p.unused_specials().map(|(i, _)| i).collect();
        assert_eq!(left, vec![1]);
    }

    #[test]
    fn test_company_accessors() {
        let company = Company::Private(private());
        assert_eq!(company.name(), "SV");
        assert!(company.as_public().is_none());
        assert!(!company.is_closed());
        assert_eq!(company.as_private().map(PrivateCompany::certificate), Some(CertificateId::new(0)));
    }
}
