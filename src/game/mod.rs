//! Game state, shared ledger operations, sequencing and the session API.

pub mod economy;
pub mod manager;
pub mod phase;
pub mod replay;
pub mod session;
pub mod state;

pub use manager::ManagerState;
pub use replay::ReplayError;
pub use session::GameSession;
pub use state::GameState;
