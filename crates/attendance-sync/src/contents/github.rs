//! GitHub contents API transport.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::traits::{ContentsApi, FileUpdate, RemoteFile, StoreError};
use crate::config::{AccessToken, Config};
use crate::document::RevisionToken;

const USER_AGENT: &str = concat!("attendance-sync/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";

/// HTTP client for the GitHub contents API.
///
/// Each call is a single GET or PUT against
/// `{api_base}/repos/{repo}/contents/{path}`; retry, if any, is layered
/// on by the caller.
pub struct GitHubContents {
    client: reqwest::Client,
    api_base: String,
    repo: String,
    branch: String,
}

/// Fetch response body. `content` is base64, wrapped with MIME newlines.
#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

/// Write request body.
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

impl GitHubContents {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        }
    }

    fn content_url(&self, path: &str) -> String {
        format!("{}/repos/{}/contents/{}", self.api_base, self.repo, path)
    }
}

#[async_trait]
impl ContentsApi for GitHubContents {
    async fn get(
        &self,
        path: &str,
        token: &AccessToken,
    ) -> Result<Option<RemoteFile>, StoreError> {
        let url = self.content_url(path);

        let response = self
            .client
            .get(&url)
            .query(&[("ref", self.branch.as_str())])
            .header(header::ACCEPT, GITHUB_JSON)
            .header(header::USER_AGENT, USER_AGENT)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!("GET {} failed with HTTP {}", url, status);
            return Err(StoreError::RemoteRejection {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ContentResponse =
            response
                .json()
                .await
                .map_err(|e| StoreError::MalformedResponse {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;

        let content = decode_content(&body.content).map_err(|e| StoreError::MalformedResponse {
            path: path.to_string(),
            reason: format!("invalid base64 content: {}", e),
        })?;

        Ok(Some(RemoteFile {
            content,
            revision: RevisionToken::new(body.sha),
        }))
    }

    async fn put(
        &self,
        path: &str,
        update: FileUpdate<'_>,
        token: &AccessToken,
    ) -> Result<(), StoreError> {
        let url = self.content_url(path);

        let body = UpdateRequest {
            message: update.message,
            content: BASE64.encode(update.content),
            sha: update.revision.map(|r| r.as_str()),
            branch: &self.branch,
        };

        let response = self
            .client
            .put(&url)
            .header(header::ACCEPT, GITHUB_JSON)
            .header(header::USER_AGENT, USER_AGENT)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        // 409 is a sha mismatch; 422 covers a missing sha for an existing
        // file (and vice versa).
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::warn!("PUT {} rejected as revision conflict (HTTP {})", url, status);
            return Err(StoreError::RevisionConflict {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            tracing::warn!("PUT {} failed with HTTP {}", url, status);
            return Err(StoreError::RemoteRejection {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

/// Decode contents-API base64, which arrives wrapped with MIME newlines.
fn decode_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    BASE64.decode(compact.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_strips_mime_newlines() {
        let wrapped = "eyJrZXki\nOiAidmFs\ndWUifQ==\n";
        let decoded = decode_content(wrapped).unwrap();
        assert_eq!(decoded, br#"{"key": "value"}"#);
    }

    #[test]
    fn test_decode_content_rejects_invalid_base64() {
        assert!(decode_content("not base64!!!").is_err());
    }

    #[test]
    fn test_content_url() {
        let contents = GitHubContents::new(&Config::new("example/repo"));
        assert_eq!(
            contents.content_url("attendance.json"),
            "https://api.github.com/repos/example/repo/contents/attendance.json"
        );
    }

    #[test]
    fn test_update_request_omits_sha_when_creating() {
        let body = UpdateRequest {
            message: "create",
            content: BASE64.encode(b"{}"),
            sha: None,
            branch: "main",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }
}
