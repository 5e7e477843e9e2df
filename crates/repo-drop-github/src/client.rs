use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use repo_drop::{
    Account, GitRef, GitRemote, RemoteError, RemoteRepository, RepositorySpec, TreeItem,
};

use crate::git::{
    CreateBlobRequest, CreateCommitRequest, CreateRefRequest, CreateTreeRequest, ObjectResponse,
    RefLookup, RefResponse, UpdateRefRequest,
};
use crate::repository::{
    AuthenticatedUser, CreateRepositoryRequest, ErrorResponse, RepositoryResponse,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "repo-drop";
const ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub REST client for repository and git database calls.
///
/// Owner and repository names are percent-encoded; branch names are encoded
/// per `/`-separated segment so `feature/x` keeps its slash.
pub struct GitHubClient {
    client: reqwest::Client,
    api_base_url: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url,
        }
    }

    fn api_base(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    fn repo_url(&self, account: &Account, repo: &str, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}{tail}",
            self.api_base(),
            urlencoding::encode(&account.username),
            urlencoding::encode(repo),
        )
    }

    fn branch_url(&self, account: &Account, repo: &str, branch: &str) -> String {
        let encoded: Vec<_> = branch.split('/').map(urlencoding::encode).collect();
        self.repo_url(account, repo, &format!("/git/refs/heads/{}", encoded.join("/")))
    }

    fn build_request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        debug!(%method, url, "github request");
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("Authorization", format!("Bearer {token}"))
    }

    /// Resolve the login that owns `token`.
    pub async fn authenticated_user(&self, token: &str) -> Result<AuthenticatedUser, RemoteError> {
        let url = format!("{}/user", self.api_base());
        let response = send(self.build_request(Method::GET, &url, token)).await?;
        parse(ensure_success(response).await?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    request
        .send()
        .await
        .map_err(|e| RemoteError::Network(e.to_string()))
}

/// Turn a non-2xx response into a [`RemoteError::Status`], preferring the
/// `message` GitHub puts in the body.
async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("GitHub API error: {status}"));

    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .json()
        .await
        .map_err(|e| RemoteError::Parse(e.to_string()))
}

/// 404 for a missing ref, 409 when the repository has no commits at all.
fn is_missing_ref(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::CONFLICT)
}

#[async_trait::async_trait]
impl GitRemote for GitHubClient {
    async fn get_repository(
        &self,
        account: &Account,
        repo: &str,
    ) -> Result<Option<RemoteRepository>, RemoteError> {
        let url = self.repo_url(account, repo, "");
        let response = send(self.build_request(Method::GET, &url, &account.token)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let repository: RepositoryResponse = parse(ensure_success(response).await?).await?;
        Ok(Some(repository.into()))
    }

    async fn create_repository(
        &self,
        account: &Account,
        spec: &RepositorySpec,
    ) -> Result<RemoteRepository, RemoteError> {
        let url = format!("{}/user/repos", self.api_base());
        let request = self
            .build_request(Method::POST, &url, &account.token)
            .json(&CreateRepositoryRequest::from(spec));

        let repository: RepositoryResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(repository.into())
    }

    async fn create_blob(
        &self,
        account: &Account,
        repo: &str,
        content_base64: &str,
    ) -> Result<String, RemoteError> {
        let url = self.repo_url(account, repo, "/git/blobs");
        let request = self
            .build_request(Method::POST, &url, &account.token)
            .json(&CreateBlobRequest::base64(content_base64));

        let blob: ObjectResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(blob.sha)
    }

    async fn get_branch_tip(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>, RemoteError> {
        let url = self.branch_url(account, repo, branch);
        let response = send(self.build_request(Method::GET, &url, &account.token)).await?;

        if is_missing_ref(response.status()) {
            return Ok(None);
        }

        let lookup: RefLookup = parse(ensure_success(response).await?).await?;
        Ok(lookup.tip(&format!("refs/heads/{branch}")))
    }

    async fn create_tree(
        &self,
        account: &Account,
        repo: &str,
        base_tree: Option<&str>,
        items: &[TreeItem],
    ) -> Result<String, RemoteError> {
        let url = self.repo_url(account, repo, "/git/trees");
        let request = self
            .build_request(Method::POST, &url, &account.token)
            .json(&CreateTreeRequest {
                base_tree,
                tree: items,
            });

        let tree: ObjectResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        account: &Account,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, RemoteError> {
        let url = self.repo_url(account, repo, "/git/commits");
        let request = self
            .build_request(Method::POST, &url, &account.token)
            .json(&CreateCommitRequest {
                message,
                tree,
                parents: (!parents.is_empty()).then_some(parents),
            });

        let commit: ObjectResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(commit.sha)
    }

    async fn update_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, RemoteError> {
        let url = self.branch_url(account, repo, branch);
        let request = self
            .build_request(Method::PATCH, &url, &account.token)
            .json(&UpdateRefRequest { sha, force });

        let reference: RefResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(reference.into())
    }

    async fn create_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef, RemoteError> {
        let url = self.repo_url(account, repo, "/git/refs");
        let request = self
            .build_request(Method::POST, &url, &account.token)
            .json(&CreateRefRequest {
                ref_name: format!("refs/heads/{branch}"),
                sha,
            });

        let reference: RefResponse = parse(ensure_success(send(request).await?).await?).await?;
        Ok(reference.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("octo cat", "token")
    }

    #[test]
    fn repo_urls_encode_owner_and_repo() {
        let client = GitHubClient::new(Some("http://localhost:1234/".into()));
        assert_eq!(
            client.repo_url(&account(), "my repo", "/git/blobs"),
            "http://localhost:1234/repos/octo%20cat/my%20repo/git/blobs"
        );
    }

    #[test]
    fn branch_urls_keep_slashes_between_segments() {
        let client = GitHubClient::new(None);
        assert_eq!(
            client.branch_url(&Account::new("octocat", "t"), "demo", "feature/new ui"),
            "https://api.github.com/repos/octocat/demo/git/refs/heads/feature/new%20ui"
        );
    }

    #[test]
    fn missing_ref_statuses() {
        assert!(is_missing_ref(StatusCode::NOT_FOUND));
        assert!(is_missing_ref(StatusCode::CONFLICT));
        assert!(!is_missing_ref(StatusCode::UNAUTHORIZED));
    }
}
