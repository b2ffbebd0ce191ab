use crate::auth::Role;
use crate::error::StorageError;
use crate::model::Issue;
use crate::storage::{ISSUES_KEY, StoragePort};

/// In-process storage. Values are kept as serialized JSON, like a browser's
/// key-value store, so round-trip behavior matches [`super::FileStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    issues: Option<String>,
    role: Option<String>,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStorage {
    /// Storage pre-populated with `issues`.
    #[must_use]
    pub fn with_issues(issues: &[Issue]) -> Self {
        let mut storage = Self::default();
        storage.issues = serde_json::to_string(issues).ok();
        storage
    }

    /// Make every subsequent issue save fail (for transactional tests).
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful issue saves so far.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }

    /// Overwrite the raw stored issues text.
    pub fn set_raw_issues(&mut self, raw: impl Into<String>) {
        self.issues = Some(raw.into());
    }
}

impl StoragePort for MemoryStorage {
    fn load_issues(&self) -> Result<Option<Vec<Issue>>, StorageError> {
        self.issues
            .as_deref()
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|source| StorageError::Corrupt {
                key: ISSUES_KEY,
                source,
            })
    }

    fn save_issues(&mut self, issues: &[Issue]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Rejected {
                key: ISSUES_KEY,
                reason: "storage quota exceeded".into(),
            });
        }
        let raw = serde_json::to_string(issues).map_err(|source| StorageError::Encode {
            key: ISSUES_KEY,
            source,
        })?;
        self.issues = Some(raw);
        self.saves += 1;
        Ok(())
    }

    fn load_role(&self) -> Result<Option<Role>, StorageError> {
        self.role
            .as_deref()
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|source| StorageError::Corrupt {
                key: super::ROLE_KEY,
                source,
            })
    }

    fn save_role(&mut self, role: Role) -> Result<(), StorageError> {
        self.role = Some(format!("\"{}\"", role.as_str()));
        Ok(())
    }
}
