use std::sync::Mutex;

use super::{lock, UserRecord, UserStore, UserUpdate};
use crate::error::StoreError;

/// Volatile user store; same contract as the JSON file store, nothing
/// survives the process.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        lock(&self.users).iter().find(|user| user.email == email).cloned()
    }

    fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        let user = UserRecord::new(
            email.to_string(),
            password_hash.to_string(),
            full_name.map(str::to_string),
        );
        lock(&self.users).push(user.clone());
        Ok(user)
    }

    fn list_all(&self) -> Vec<UserRecord> {
        lock(&self.users).clone()
    }

    fn delete_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|user| user.email != email);
        Ok(users.len() < before)
    }

    fn update(&self, email: &str, update: UserUpdate) -> Result<Option<UserRecord>, StoreError> {
        let mut users = lock(&self.users);
        Ok(users.iter_mut().find(|user| user.email == email).map(|user| {
            user.apply(update);
            user.clone()
        }))
    }
}
