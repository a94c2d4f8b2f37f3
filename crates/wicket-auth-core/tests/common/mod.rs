//! Mock credential store for testing

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use wicket_auth_core::hash_password;
use wicket_store::{CredentialStore, StoreError, StoreResult};
use wicket_types::{Credential, SubjectId};

/// In-memory credential store for testing
#[derive(Default, Clone)]
pub struct MockCredentialStore {
    records: Arc<DashMap<SubjectId, Credential>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a credential record directly
    pub fn insert(&self, credential: Credential) {
        self.records
            .insert(credential.subject_id.clone(), credential);
    }

    /// Build a store seeded with one user whose password is hashed for real
    pub fn with_user(email: &str, password: &str) -> Self {
        let store = Self::new();
        let hash = hash_password(password).expect("password hashing succeeds");
        store.insert(Credential::new(email, hash));
        store
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn write(&self, credential: &Credential) -> StoreResult<()> {
        self.insert(credential.clone());
        Ok(())
    }

    async fn read(&self, email: &str) -> StoreResult<Credential> {
        self.records
            .get(&SubjectId::derive(email))
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, email: &str) -> StoreResult<()> {
        self.records
            .remove(&SubjectId::derive(email))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
