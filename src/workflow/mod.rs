pub mod match_flow;
pub mod match_session;

pub use match_flow::MatchFlow;
pub use match_session::{MatchSession, PendingRound};
