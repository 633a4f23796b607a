//! Read-modify-write client for the attendance and schools documents.

use serde_json::Value;

use crate::config::{AccessToken, Config};
use crate::contents::{ContentsApi, FileUpdate, GitHubContents, StoreError};
use crate::document::{AttendanceRecord, Document, DocumentId, RevisionToken};

/// Commit message recorded when attendance changes.
const ATTENDANCE_MESSAGE: &str = "Updated attendance percentage";

/// Commit message recorded when school data changes.
const SCHOOLS_MESSAGE: &str = "Updated school data";

/// Total attempts per upsert before a revision conflict is surfaced.
const MAX_UPSERT_ATTEMPTS: usize = 3;

/// Read-modify-write client for the two documents tracked in the remote
/// repository.
///
/// Generic over the transport so tests can run against
/// [`InMemoryContents`](crate::contents::InMemoryContents). Every
/// operation checks the credential before touching the transport.
pub struct DocumentStore<C> {
    contents: C,
    token: Option<AccessToken>,
}

impl DocumentStore<GitHubContents> {
    /// Store backed by the GitHub contents API.
    pub fn from_config(config: Config) -> Self {
        let contents = GitHubContents::new(&config);
        Self::new(contents, config.token)
    }
}

impl<C: ContentsApi> DocumentStore<C> {
    pub fn new(contents: C, token: Option<AccessToken>) -> Self {
        Self { contents, token }
    }

    fn credential(&self) -> Result<&AccessToken, StoreError> {
        self.token.as_ref().ok_or(StoreError::CredentialMissing)
    }

    /// Fetch a document along with the revision token needed to overwrite
    /// it.
    ///
    /// `Ok(None)` means the document does not exist yet, which is not an
    /// error: a first write creates it.
    pub async fn fetch(
        &self,
        id: DocumentId,
    ) -> Result<Option<(Document, RevisionToken)>, StoreError> {
        let token = self.credential()?;
        let path = id.path();

        let Some(file) = self.contents.get(path, token).await? else {
            return Ok(None);
        };

        let value: Value =
            serde_json::from_slice(&file.content).map_err(|e| StoreError::MalformedResponse {
                path: path.to_string(),
                reason: format!("invalid JSON: {}", e),
            })?;
        let Value::Object(document) = value else {
            return Err(StoreError::MalformedResponse {
                path: path.to_string(),
                reason: "document is not a JSON object".to_string(),
            });
        };

        Ok(Some((document, file.revision)))
    }

    /// Persist a full document, replacing the remote copy.
    ///
    /// `revision` must come from the most recent [`fetch`](Self::fetch) of
    /// the same document, or be `None` for a first-time create. The new
    /// revision token is not returned; re-fetch to learn it.
    pub async fn store(
        &self,
        id: DocumentId,
        document: &Document,
        revision: Option<&RevisionToken>,
        message: &str,
    ) -> Result<(), StoreError> {
        let token = self.credential()?;
        let path = id.path();

        let content = Value::Object(document.clone()).to_string().into_bytes();
        let update = FileUpdate {
            content: &content,
            message,
            revision,
        };

        self.contents.put(path, update, token).await
    }

    /// Record a school's final attendance percentage, replacing any prior
    /// entry under the same composite key.
    pub async fn upsert_attendance(
        &self,
        school_name: &str,
        city: &str,
        state: &str,
        percentage: f64,
    ) -> Result<(), StoreError> {
        let record = AttendanceRecord::new(school_name, city, state, percentage);
        let key = record.composite_key();

        self.read_modify_write(DocumentId::Attendance, ATTENDANCE_MESSAGE, |document| {
            document.insert(key.clone(), record.to_value());
        })
        .await
    }

    /// Merge caller-supplied school data into the schools document, key by
    /// key. Keys not named in `data` are preserved.
    pub async fn upsert_school_data(&self, data: &Document) -> Result<(), StoreError> {
        self.read_modify_write(DocumentId::Schools, SCHOOLS_MESSAGE, |document| {
            for (key, value) in data {
                document.insert(key.clone(), value.clone());
            }
        })
        .await
    }

    /// Fetch, apply `apply`, and store back with the fetched revision.
    ///
    /// An absent document is treated as empty and created by the write.
    /// A concurrent writer winning the revision race triggers a refetch
    /// and retry, bounded by [`MAX_UPSERT_ATTEMPTS`].
    async fn read_modify_write<F>(
        &self,
        id: DocumentId,
        message: &str,
        mut apply: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(&mut Document),
    {
        let mut attempt = 1;
        loop {
            let (mut document, revision) = match self.fetch(id).await? {
                Some((document, revision)) => (document, Some(revision)),
                None => (Document::new(), None),
            };
            apply(&mut document);

            match self.store(id, &document, revision.as_ref(), message).await {
                Ok(()) => return Ok(()),
                Err(StoreError::RevisionConflict { path }) if attempt < MAX_UPSERT_ATTEMPTS => {
                    tracing::warn!(
                        "revision conflict on {}, refetching (attempt {}/{})",
                        path,
                        attempt,
                        MAX_UPSERT_ATTEMPTS
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
