//! Share certificates.
//!
//! Every company is represented by certificates adding up to 100%. A
//! public company has one president's certificate and ordinary shares; a
//! private is a single 100% certificate. Certificates never change, only
//! their holder does.

use serde::{Deserialize, Serialize};

use crate::core::{CertificateId, CompanyId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub company: CompanyId,
    pub percent: u32,
    pub president: bool,
}

impl Certificate {
    /// Number of share units this certificate represents.
    #[must_use]
    pub fn units(&self, share_unit: u32) -> u32 {
        self.percent / share_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        let president = Certificate {
            id: CertificateId::new(0),
            company: CompanyId::new(0),
            percent: 20,
            president: true,
        };
        assert_eq!(president.units(10), 2);
        assert_eq!(president.units(20), 1);
    }
}
