//! Contents API trait definition and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AccessToken;
use crate::document::RevisionToken;

/// Errors surfaced by the document store and its transports.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No access token is configured; detected before any transport call.
    #[error("access token is not configured")]
    CredentialMissing,

    /// Connection-level failure (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the remote store.
    #[error("remote rejected {path}: HTTP {status}")]
    RemoteRejection { path: String, status: u16 },

    /// The supplied revision token no longer matches the remote document.
    #[error("revision conflict on {path}")]
    RevisionConflict { path: String },

    /// Response was missing expected fields or undecodable.
    #[error("malformed response for {path}: {reason}")]
    MalformedResponse { path: String, reason: String },
}

/// A file read from the remote store: decoded content plus the revision
/// token needed to overwrite it.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub revision: RevisionToken,
}

/// A pending write to the remote store.
#[derive(Debug, Clone, Copy)]
pub struct FileUpdate<'a> {
    /// Raw bytes to store. Transports handle any wire encoding.
    pub content: &'a [u8],
    /// Audit label recorded by the store's own history mechanism.
    pub message: &'a str,
    /// Revision to overwrite, or `None` to create the file.
    pub revision: Option<&'a RevisionToken>,
}

/// Per-path file access with optimistic revision checks.
///
/// Implementations:
/// - `GitHubContents` - the GitHub contents API over HTTP
/// - `InMemoryContents` - for testing
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Read a file. Returns `None` when the path does not exist.
    async fn get(&self, path: &str, token: &AccessToken)
        -> Result<Option<RemoteFile>, StoreError>;

    /// Create or overwrite a file.
    ///
    /// Overwriting requires the revision from the most recent `get` of the
    /// same path; creating requires no revision. A mismatch fails with
    /// [`StoreError::RevisionConflict`].
    async fn put(
        &self,
        path: &str,
        update: FileUpdate<'_>,
        token: &AccessToken,
    ) -> Result<(), StoreError>;
}
