//! File-backed credential store
//!
//! One JSON record per subject at `base_path/<subject_id>.json`. Writes go
//! to a temp file in the same directory and are renamed into place, so a
//! concurrent writer to the same record last-wins without torn content.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use wicket_types::{Credential, SubjectId};

use crate::error::{StoreError, StoreResult};
use crate::repo::CredentialStore;

const RECORD_EXTENSION: &str = "json";

/// Filesystem credential store
#[derive(Debug, Clone)]
pub struct FsCredentialStore {
    base_path: PathBuf,
}

impl FsCredentialStore {
    /// Create a store rooted at `base_path`.
    ///
    /// The directory is created on first write, not here.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Storage location for a subject's record
    fn record_path(&self, subject: &SubjectId) -> PathBuf {
        self.base_path
            .join(subject.as_str())
            .with_extension(RECORD_EXTENSION)
    }

    /// Map a missing file onto the store's not-found variant
    fn map_io(err: std::io::Error) -> StoreError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(err)
        }
    }
}

#[async_trait]
impl CredentialStore for FsCredentialStore {
    async fn write(&self, credential: &Credential) -> StoreResult<()> {
        fs::create_dir_all(&self.base_path).await?;

        let path = self.record_path(&credential.subject_id);
        let bytes = serde_json::to_vec_pretty(credential)?;

        // Temp file lives in the same directory so the rename stays on one
        // filesystem and replaces atomically.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes).await?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io(err));
        }

        tracing::debug!(subject = %credential.subject_id, path = %path.display(), "credential written");
        Ok(())
    }

    async fn read(&self, email: &str) -> StoreResult<Credential> {
        let subject = SubjectId::derive(email);
        let path = self.record_path(&subject);

        let bytes = fs::read(&path).await.map_err(Self::map_io)?;
        let credential: Credential = serde_json::from_slice(&bytes)?;
        Ok(credential)
    }

    async fn delete(&self, email: &str) -> StoreResult<()> {
        let subject = SubjectId::derive(email);
        let path = self.record_path(&subject);

        fs::remove_file(&path).await.map_err(Self::map_io)?;
        tracing::debug!(subject = %subject, "credential deleted");
        Ok(())
    }
}
