use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tempfile::NamedTempFile;

use super::{lock, UserRecord, UserStore, UserUpdate};
use crate::error::StoreError;

enum Contents {
    Records(Vec<UserRecord>),
    Corrupt(serde_json::Error),
}

/// User store backed by a single pretty-printed JSON array.
///
/// Every mutation rewrites the whole file through a temporary file in the
/// same directory, so a reader never observes a half-written file. One mutex
/// serializes all load/modify/save cycles on this instance.
pub struct JsonFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::io::Result<Contents> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Contents::Records(Vec::new())),
            Err(e) => return Err(e),
        };

        if contents.trim().is_empty() {
            return Ok(Contents::Records(Vec::new()));
        }

        Ok(match serde_json::from_str(&contents) {
            Ok(users) => Contents::Records(users),
            Err(e) => Contents::Corrupt(e),
        })
    }

    /// Records for a read-only operation; unreadable storage reads as empty.
    fn load(&self) -> Vec<UserRecord> {
        match self.read() {
            Ok(Contents::Records(users)) => users,
            Ok(Contents::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "User file is corrupt; treating as empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "User file unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    /// Records for a mutation.
    ///
    /// A corrupt file is renamed to `<name>.corrupt-<timestamp>` before the
    /// caller overwrites it. A file that cannot be read at all fails the write.
    fn load_for_update(&self) -> Result<Vec<UserRecord>, StoreError> {
        match self.read()? {
            Contents::Records(users) => Ok(users),
            Contents::Corrupt(e) => {
                let mut quarantined = self.path.clone().into_os_string();
                quarantined.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.6fZ")));
                let quarantined = PathBuf::from(quarantined);

                fs::rename(&self.path, &quarantined)?;
                tracing::error!(
                    path = %self.path.display(),
                    moved_to = %quarantined.display(),
                    error = %e,
                    "User file is corrupt; moved aside before rewriting"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, users)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), users = users.len(), "User file written");
        Ok(())
    }
}

impl UserStore for JsonFileUserStore {
    fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let _guard = lock(&self.lock);
        self.load().into_iter().find(|user| user.email == email)
    }

    fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        let _guard = lock(&self.lock);
        let mut users = self.load_for_update()?;

        let user = UserRecord::new(
            email.to_string(),
            password_hash.to_string(),
            full_name.map(str::to_string),
        );
        users.push(user.clone());
        self.save(&users)?;

        Ok(user)
    }

    fn list_all(&self) -> Vec<UserRecord> {
        let _guard = lock(&self.lock);
        self.load()
    }

    fn delete_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let _guard = lock(&self.lock);
        let mut users = self.load_for_update()?;

        let before = users.len();
        users.retain(|user| user.email != email);
        if users.len() == before {
            return Ok(false);
        }

        self.save(&users)?;
        Ok(true)
    }

    fn update(&self, email: &str, update: UserUpdate) -> Result<Option<UserRecord>, StoreError> {
        let _guard = lock(&self.lock);
        if update.is_empty() {
            return Ok(self.load().into_iter().find(|user| user.email == email));
        }

        let mut users = self.load_for_update()?;

        let Some(user) = users.iter_mut().find(|user| user.email == email) else {
            return Ok(None);
        };
        user.apply(update);
        let updated = user.clone();

        self.save(&users)?;
        Ok(Some(updated))
    }
}
