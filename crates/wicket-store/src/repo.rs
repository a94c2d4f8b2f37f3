//! Repository trait
//!
//! Defines the async interface for credential persistence.

use async_trait::async_trait;

use wicket_types::Credential;

use crate::error::StoreResult;

/// Credential repository trait.
///
/// Implementations key records by the subject identifier derived from the
/// email, so lookups take the email and derive the key internally.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a credential record, replacing any existing record for the
    /// same subject
    async fn write(&self, credential: &Credential) -> StoreResult<()>;

    /// Load the credential registered under an email
    async fn read(&self, email: &str) -> StoreResult<Credential>;

    /// Remove the credential registered under an email
    async fn delete(&self, email: &str) -> StoreResult<()>;
}
