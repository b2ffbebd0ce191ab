use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Role;
use crate::error::StorageError;
use crate::lock::BoardLock;
use crate::model::Issue;
use crate::storage::{ISSUES_KEY, ROLE_KEY, StoragePort};

/// Name of the board directory inside a project.
pub const BOARD_DIR: &str = ".corkboard";

const LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// File-backed storage rooted at a `.corkboard` directory.
///
/// Layout:
/// - `issues.json`: the collection, a JSON array
/// - `role.json`: the current role, a bare JSON string
/// - `lock`: advisory lock held while either key is rewritten
///
/// Each save writes a sibling temp file and renames it over the key, so a
/// crash mid-write leaves the previous value readable.
#[derive(Debug, Clone)]
pub struct FileStorage {
    board_dir: PathBuf,
}

impl FileStorage {
    /// Storage for the given `.corkboard` directory. Nothing is created
    /// until the first save.
    #[must_use]
    pub fn new(board_dir: impl Into<PathBuf>) -> Self {
        Self {
            board_dir: board_dir.into(),
        }
    }

    /// Storage for `<project_root>/.corkboard`.
    #[must_use]
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(BOARD_DIR))
    }

    #[must_use]
    pub fn board_dir(&self) -> &Path {
        &self.board_dir
    }

    /// Path to the advisory lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        BoardLock::path_in(&self.board_dir)
    }

    #[must_use]
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.board_dir.join(format!("{key}.json"))
    }

    /// True once the issue collection has been written.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.key_path(ISSUES_KEY).exists()
    }

    fn read_key<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StorageError> {
        let path = self.key_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt { key, source })
    }

    fn write_key<T: Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
        pretty: bool,
    ) -> Result<(), StorageError> {
        let encoded = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|source| StorageError::Encode { key, source })?;

        let lock = BoardLock::acquire(&self.board_dir, LOCK_TIMEOUT)?;

        let path = self.key_path(key);
        let tmp = self.board_dir.join(format!(".{key}.json.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(encoded.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        lock.release();

        debug!(path = %path.display(), bytes = encoded.len(), "wrote board key");
        Ok(())
    }
}

impl StoragePort for FileStorage {
    fn load_issues(&self) -> Result<Option<Vec<Issue>>, StorageError> {
        self.read_key(ISSUES_KEY)
    }

    fn save_issues(&mut self, issues: &[Issue]) -> Result<(), StorageError> {
        self.write_key(ISSUES_KEY, issues, true)
    }

    fn load_role(&self) -> Result<Option<Role>, StorageError> {
        self.read_key(ROLE_KEY)
    }

    fn save_role(&mut self, role: Role) -> Result<(), StorageError> {
        self.write_key(ROLE_KEY, &role, false)
    }
}
