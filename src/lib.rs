//! Workaasana Client Sync
//!
//! Layered architecture:
//! - domain: entities, status sets, create drafts
//! - gateway: the remote REST API
//! - cache: durable snapshots of the last-known collections
//! - store / context / sync: per-view state, optimistic mutations and
//!   cross-view invalidation
//! - filter / report: derived views over loaded state

pub mod cache;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod report;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{SyncError, SyncResult};
pub use sync::{SyncHub, ViewSync};
