#![doc = include_str!("../README.md")]

mod config;
mod context;
mod coordinator;
mod error;
mod handler;
mod layer;
mod limits;
mod merge;
mod pool;
mod query;
mod split;
mod tenant;
pub mod telemetry;

pub use crate::config::*;
pub use crate::context::*;
pub use crate::coordinator::*;
pub use crate::error::*;
pub use crate::handler::*;
pub use crate::layer::*;
pub use crate::limits::*;
pub use crate::merge::*;
pub use crate::pool::{Outcome, Scheduler, WorkItem};
pub use crate::query::*;
pub use crate::split::*;
pub use crate::tenant::*;
// Re-exported so callers can build contexts from their own tokens.
pub use tokio_util::sync::CancellationToken;
