use repo_drop::{RemoteRepository, RepositorySpec};
use serde::{Deserialize, Serialize};

/// Response from GitHub's Repositories API.
/// `GET /repos/{owner}/{repo}` and `POST /user/repos`
#[derive(Debug, Deserialize)]
pub struct RepositoryResponse {
    pub name: String,
    pub full_name: String,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub html_url: Option<String>,
}

impl From<RepositoryResponse> for RemoteRepository {
    fn from(response: RepositoryResponse) -> Self {
        Self {
            name: response.name,
            full_name: response.full_name,
            default_branch: response.default_branch,
            private: response.private,
            html_url: response.html_url,
        }
    }
}

/// Body of `POST /user/repos`.
#[derive(Debug, Serialize)]
pub struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub private: bool,
    pub auto_init: bool,
}

impl<'a> From<&'a RepositorySpec> for CreateRepositoryRequest<'a> {
    fn from(spec: &'a RepositorySpec) -> Self {
        Self {
            name: &spec.name,
            description: &spec.description,
            private: spec.visibility.is_private(),
            auto_init: spec.auto_init,
        }
    }
}

/// The owner of a token, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
    pub name: Option<String>,
}

/// Error body GitHub sends with most non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}
