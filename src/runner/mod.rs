//! # Runner Module
//!
//! The client-side state machine: plan which setup instructions a run needs,
//! gate on deployment, submit, and report what it cost.

pub mod types;
pub mod planner;
pub mod submitter;
pub mod session;

pub use planner::ProgramIds;
pub use session::{run_session, SessionInputs, SessionSettings};
pub use types::RunReport;
