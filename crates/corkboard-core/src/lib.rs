//! corkboard-core library.
//!
//! A local-first issue board: shape-flexible JSON ingestion
//! ([`normalize`]), id-keyed merging ([`reconcile`]), a role and provenance
//! gate ([`auth`]), a transactional store over a pluggable persistence port
//! ([`store`], [`storage`]) and a single-slot draft workflow ([`draft`]).
//! [`board::Board`] wires them together for a view layer.
//!
//! # Conventions
//!
//! - **Errors**: operations return [`Result`] with [`CorkboardError`]; a
//!   failed operation leaves every piece of state as it was.
//! - **Logging**: `tracing` macros (`debug!` per record, `info!` per
//!   commit, `warn!` for denials and recovered anomalies).

pub mod auth;
pub mod baseline;
pub mod board;
pub mod config;
pub mod draft;
pub mod error;
pub mod lock;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod storage;
pub mod store;

pub use auth::{Role, Session, SharedSecret};
pub use board::{Board, Deleted};
pub use error::{CorkboardError, ErrorCode, Result};
pub use model::{Comment, Issue, IssuePatch, Issues, Priority, StatusSet};
pub use reconcile::MergeReport;
pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use store::IssueStore;
