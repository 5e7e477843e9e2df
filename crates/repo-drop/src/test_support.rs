use std::collections::HashMap;
use std::sync::Mutex;

use crate::remote::{Account, GitRef, GitRemote, RemoteError, RemoteRepository, RepositorySpec, TreeItem};

/// A call made against a [`RecordingRemote`], in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    GetRepository { repo: String },
    CreateRepository { spec: RepositorySpec },
    CreateBlob { content: String },
    GetBranchTip { branch: String },
    CreateTree { base_tree: Option<String>, paths: Vec<String> },
    CreateCommit { message: String, tree: String, parents: Vec<String> },
    UpdateRef { branch: String, sha: String, force: bool },
    CreateRef { branch: String, sha: String },
}

#[derive(Default)]
struct State {
    calls: Vec<RemoteCall>,
    repositories: HashMap<String, Option<String>>,
    branches: HashMap<(String, String), String>,
    failing_blobs: HashMap<String, String>,
    reject_ref_updates: Option<String>,
    counter: usize,
}

impl State {
    fn next_sha(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}-{}", self.counter)
    }
}

/// In-memory remote for testing. Records every call and keeps just enough
/// state (repositories, branch tips) to drive a publish end to end.
#[derive(Default)]
pub struct RecordingRemote {
    state: Mutex<State>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with an optional default branch name.
    pub fn with_repository(self, repo: &str, default_branch: Option<&str>) -> Self {
        self.lock()
            .repositories
            .insert(repo.to_owned(), default_branch.map(str::to_owned));
        self
    }

    pub fn with_branch(self, repo: &str, branch: &str, sha: &str) -> Self {
        self.lock()
            .branches
            .insert((repo.to_owned(), branch.to_owned()), sha.to_owned());
        self
    }

    /// Fail blob creation for this exact base64 payload.
    pub fn failing_blob(self, content_base64: &str, message: &str) -> Self {
        self.lock()
            .failing_blobs
            .insert(content_base64.to_owned(), message.to_owned());
        self
    }

    pub fn rejecting_ref_updates(self, message: &str) -> Self {
        self.lock().reject_ref_updates = Some(message.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    pub fn branch_tip(&self, repo: &str, branch: &str) -> Option<String> {
        self.lock()
            .branches
            .get(&(repo.to_owned(), branch.to_owned()))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn repository(account: &Account, name: &str, default_branch: Option<String>, private: bool) -> RemoteRepository {
        RemoteRepository {
            name: name.to_owned(),
            full_name: format!("{}/{name}", account.username),
            default_branch,
            private,
            html_url: Some(format!("https://github.com/{}/{name}", account.username)),
        }
    }
}

#[async_trait::async_trait]
impl GitRemote for RecordingRemote {
    async fn get_repository(
        &self,
        account: &Account,
        repo: &str,
    ) -> Result<Option<RemoteRepository>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::GetRepository { repo: repo.to_owned() });
        Ok(state
            .repositories
            .get(repo)
            .map(|default_branch| Self::repository(account, repo, default_branch.clone(), true)))
    }

    async fn create_repository(
        &self,
        account: &Account,
        spec: &RepositorySpec,
    ) -> Result<RemoteRepository, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateRepository { spec: spec.clone() });
        if state.repositories.contains_key(&spec.name) {
            return Err(RemoteError::Status {
                status: 422,
                message: "name already exists on this account".into(),
            });
        }
        let default_branch = Some("main".to_owned());
        state.repositories.insert(spec.name.clone(), default_branch.clone());
        Ok(Self::repository(
            account,
            &spec.name,
            default_branch,
            spec.visibility.is_private(),
        ))
    }

    async fn create_blob(
        &self,
        _account: &Account,
        _repo: &str,
        content_base64: &str,
    ) -> Result<String, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateBlob {
            content: content_base64.to_owned(),
        });
        if let Some(message) = state.failing_blobs.get(content_base64) {
            return Err(RemoteError::Status {
                status: 422,
                message: message.clone(),
            });
        }
        Ok(state.next_sha("blob"))
    }

    async fn get_branch_tip(
        &self,
        _account: &Account,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::GetBranchTip {
            branch: branch.to_owned(),
        });
        Ok(state
            .branches
            .get(&(repo.to_owned(), branch.to_owned()))
            .cloned())
    }

    async fn create_tree(
        &self,
        _account: &Account,
        _repo: &str,
        base_tree: Option<&str>,
        items: &[TreeItem],
    ) -> Result<String, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateTree {
            base_tree: base_tree.map(str::to_owned),
            paths: items.iter().map(|i| i.path.clone()).collect(),
        });
        Ok(state.next_sha("tree"))
    }

    async fn create_commit(
        &self,
        _account: &Account,
        _repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateCommit {
            message: message.to_owned(),
            tree: tree.to_owned(),
            parents: parents.to_vec(),
        });
        Ok(state.next_sha("commit"))
    }

    async fn update_ref(
        &self,
        _account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::UpdateRef {
            branch: branch.to_owned(),
            sha: sha.to_owned(),
            force,
        });
        if let Some(message) = state.reject_ref_updates.clone() {
            return Err(RemoteError::Status { status: 422, message });
        }
        state
            .branches
            .insert((repo.to_owned(), branch.to_owned()), sha.to_owned());
        Ok(GitRef {
            name: format!("refs/heads/{branch}"),
            sha: sha.to_owned(),
        })
    }

    async fn create_ref(
        &self,
        _account: &Account,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef, RemoteError> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::CreateRef {
            branch: branch.to_owned(),
            sha: sha.to_owned(),
        });
        state
            .branches
            .insert((repo.to_owned(), branch.to_owned()), sha.to_owned());
        Ok(GitRef {
            name: format!("refs/heads/{branch}"),
            sha: sha.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("octocat", "token")
    }

    #[tokio::test]
    async fn unknown_repository_is_none() {
        let remote = RecordingRemote::new();
        assert!(remote.get_repository(&account(), "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn created_repository_can_be_looked_up() {
        let remote = RecordingRemote::new();
        remote
            .create_repository(&account(), &RepositorySpec::new("demo"))
            .await
            .unwrap();

        let repo = remote.get_repository(&account(), "demo").await.unwrap().unwrap();
        assert_eq!(repo.full_name, "octocat/demo");
        assert_eq!(repo.default_branch.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn creating_a_repository_twice_fails() {
        let remote = RecordingRemote::new().with_repository("demo", None);
        let err = remote
            .create_repository(&account(), &RepositorySpec::new("demo"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn created_ref_becomes_branch_tip() {
        let remote = RecordingRemote::new();
        remote.create_ref(&account(), "demo", "main", "abc").await.unwrap();
        assert_eq!(
            remote.get_branch_tip(&account(), "demo", "main").await.unwrap(),
            Some("abc".to_owned())
        );
    }
}
