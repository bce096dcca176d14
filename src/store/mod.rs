/// User storage
///
/// `UserStore` is the persistence seam of the service. Reads never fail:
/// missing or corrupt storage reads as "no users". Writes persist the whole
/// record set before returning.

mod json_file;
mod memory;
mod record;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use json_file::JsonFileUserStore;
pub use memory::InMemoryUserStore;
pub use record::{UserPublic, UserRecord, UserUpdate};

use crate::error::StoreError;

pub trait UserStore: Send + Sync {
    /// Exact-match lookup by email.
    fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    fn exists(&self, email: &str) -> bool {
        self.find_by_email(email).is_some()
    }

    /// Append a new record stamped with the current time.
    ///
    /// Uniqueness is the caller's responsibility.
    fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<UserRecord, StoreError>;

    fn list_all(&self) -> Vec<UserRecord>;

    /// Returns true if a record was removed.
    fn delete_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Returns the updated record, or `None` if no user has this email.
    fn update(&self, email: &str, update: UserUpdate) -> Result<Option<UserRecord>, StoreError>;
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
