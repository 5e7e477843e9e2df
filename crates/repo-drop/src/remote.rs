use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Credentials for the hosting service.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub token: String,
}

impl Account {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        self == Self::Private
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// What to create when creating a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    /// Let the service create an initial commit with a default file.
    pub auto_init: bool,
}

impl RepositorySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            visibility: Visibility::default(),
            auto_init: false,
        }
    }
}

/// A repository as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    pub full_name: String,
    pub default_branch: Option<String>,
    pub private: bool,
    pub html_url: Option<String>,
}

/// One path to blob mapping in a new tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeItem {
    /// Regular, non-executable file mode.
    pub const FILE_MODE: &'static str = "100644";

    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: Self::FILE_MODE.to_owned(),
            kind: "blob".to_owned(),
            sha: sha.into(),
        }
    }
}

/// A branch reference after it was created or moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

/// Errors returned by a [`GitRemote`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    ///
    /// `message` is the service-supplied message when there was one,
    /// otherwise a description of the status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Low-level git database operations of a hosted repository service.
///
/// Every call is authenticated with the given account and addresses
/// repositories owned by `account.username`. Lookups return `Ok(None)` when
/// the thing looked up does not exist.
#[async_trait::async_trait]
pub trait GitRemote: Send + Sync {
    async fn get_repository(
        &self,
        account: &Account,
        repo: &str,
    ) -> Result<Option<RemoteRepository>, RemoteError>;

    async fn create_repository(
        &self,
        account: &Account,
        spec: &RepositorySpec,
    ) -> Result<RemoteRepository, RemoteError>;

    /// Store base64 content as a blob and return its SHA.
    async fn create_blob(
        &self,
        account: &Account,
        repo: &str,
        content_base64: &str,
    ) -> Result<String, RemoteError>;

    /// Commit SHA at the tip of `branch`, or `None` when the branch is missing.
    async fn get_branch_tip(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>, RemoteError>;

    async fn create_tree(
        &self,
        account: &Account,
        repo: &str,
        base_tree: Option<&str>,
        items: &[TreeItem],
    ) -> Result<String, RemoteError>;

    async fn create_commit(
        &self,
        account: &Account,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, RemoteError>;

    /// Move an existing branch. Non-forced updates must fast-forward.
    async fn update_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, RemoteError>;

    async fn create_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef, RemoteError>;
}

#[async_trait::async_trait]
impl<T: GitRemote + ?Sized> GitRemote for Arc<T> {
    async fn get_repository(
        &self,
        account: &Account,
        repo: &str,
    ) -> Result<Option<RemoteRepository>, RemoteError> {
        (**self).get_repository(account, repo).await
    }

    async fn create_repository(
        &self,
        account: &Account,
        spec: &RepositorySpec,
    ) -> Result<RemoteRepository, RemoteError> {
        (**self).create_repository(account, spec).await
    }

    async fn create_blob(
        &self,
        account: &Account,
        repo: &str,
        content_base64: &str,
    ) -> Result<String, RemoteError> {
        (**self).create_blob(account, repo, content_base64).await
    }

    async fn get_branch_tip(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>, RemoteError> {
        (**self).get_branch_tip(account, repo, branch).await
    }

    async fn create_tree(
        &self,
        account: &Account,
        repo: &str,
        base_tree: Option<&str>,
        items: &[TreeItem],
    ) -> Result<String, RemoteError> {
        (**self).create_tree(account, repo, base_tree, items).await
    }

    async fn create_commit(
        &self,
        account: &Account,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, RemoteError> {
        (**self)
            .create_commit(account, repo, message, tree, parents)
            .await
    }

    async fn update_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, RemoteError> {
        (**self).update_ref(account, repo, branch, sha, force).await
    }

    async fn create_ref(
        &self,
        account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef, RemoteError> {
        (**self).create_ref(account, repo, branch, sha).await
    }
}
