//! Persistence port for board state.
//!
//! The board keeps two independent keys: the issue collection (a JSON array)
//! and the current role (a bare JSON string). The store and the session are
//! handed a [`StoragePort`] explicitly instead of reaching for ambient
//! global state, so the core runs the same against [`MemoryStorage`] in
//! tests and [`FileStorage`] from the CLI.

mod file;
mod memory;

pub use file::{BOARD_DIR, FileStorage};
pub use memory::MemoryStorage;

use crate::auth::Role;
use crate::error::StorageError;
use crate::model::Issue;

/// Key name of the issue collection.
pub const ISSUES_KEY: &str = "issues";
/// Key name of the current role.
pub const ROLE_KEY: &str = "role";

/// Load/save access to the two persisted keys.
///
/// `load_*` returns `Ok(None)` when the key has never been written. A save
/// either replaces the stored value entirely or fails leaving it intact.
pub trait StoragePort {
    fn load_issues(&self) -> Result<Option<Vec<Issue>>, StorageError>;
    fn save_issues(&mut self, issues: &[Issue]) -> Result<(), StorageError>;
    fn load_role(&self) -> Result<Option<Role>, StorageError>;
    fn save_role(&mut self, role: Role) -> Result<(), StorageError>;
}

impl<P: StoragePort + ?Sized> StoragePort for &mut P {
    fn load_issues(&self) -> Result<Option<Vec<Issue>>, StorageError> {
        (**self).load_issues()
    }

    fn save_issues(&mut self, issues: &[Issue]) -> Result<(), StorageError> {
        (**self).save_issues(issues)
    }

    fn load_role(&self) -> Result<Option<Role>, StorageError> {
        (**self).load_role()
    }

    fn save_role(&mut self, role: Role) -> Result<(), StorageError> {
        (**self).save_role(role)
    }
}
