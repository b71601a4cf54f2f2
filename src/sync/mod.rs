//! Remote state synchronization
//!
//! `PollingSynchronizer` keeps local state in step with the remote authority
//! while a timer runs; `CommandDispatcher` issues the mutating commands.

pub mod dispatcher;
pub mod poller;
pub mod single_flight;

pub use dispatcher::CommandDispatcher;
pub use poller::PollingSynchronizer;
pub use single_flight::{CommandKind, SingleFlight};
