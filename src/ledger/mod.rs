//! Economic ledger: cash holders, companies, certificates, trains, and who
//! holds what.
//!
//! Nothing here mutates itself during play. Every change is made by a
//! `Move` executed through a `Transaction`, so the log can reverse it.

pub mod cash;
pub mod certificate;
pub mod company;
pub mod holdings;
pub mod train;

pub use cash::{Bank, Player};
pub use certificate::Certificate;
pub use company::{Company, CompanyCore, CompanyStatus, PrivateCompany, PublicCompany, Special};
pub use holdings::Holdings;
pub use train::Train;
