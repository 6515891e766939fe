//! Worker pool orchestration for split queries.
//!
//! ## Structure
//!
//! - `item` - [`WorkItem`]s pairing a sub-range with its private response
//!   channel.
//! - `feeder` - Streams jobs onto the shared work channel.
//! - `worker` - The per-worker receive/execute/deliver loop.
//! - `scheduler` - Starts the feeder and workers and collects results in
//!   order under an early-exit budget.

mod feeder;
mod item;
mod scheduler;
mod worker;

pub use item::{Outcome, WorkItem};
pub use scheduler::Scheduler;
