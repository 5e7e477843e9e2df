use std::fmt;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::entry::FileEntry;
use crate::flatten::flatten;
use crate::remote::{Account, GitRemote, RemoteError, RemoteRepository, RepositorySpec, TreeItem};

/// Blob uploads in flight at once when nothing else is configured.
pub const DEFAULT_BLOB_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    pub blob_concurrency: usize,
    /// Emit a `debug!` event for every remote step.
    pub debug_logging: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            blob_concurrency: DEFAULT_BLOB_CONCURRENCY,
            debug_logging: false,
        }
    }
}

/// The remote step a publish failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckRepository,
    LookupBranch,
    CreateTree,
    CreateCommit,
    UpdateRef,
    CreateRef,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CheckRepository => "repository check",
            Self::LookupBranch => "branch lookup",
            Self::CreateTree => "tree creation",
            Self::CreateCommit => "commit creation",
            Self::UpdateRef => "branch update",
            Self::CreateRef => "branch creation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("failed to create blob for {path}: {source}")]
    Blob {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: RemoteError,
    },
}

impl PublishError {
    fn at(step: Step) -> impl FnOnce(RemoteError) -> Self {
        move |source| Self::Step { step, source }
    }
}

/// Everything needed to put one commit on a branch.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub repo_name: String,
    pub branch: String,
    pub message: String,
    /// Nested or already-flat entries; directories are flattened away.
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit_sha: String,
    pub tree_sha: String,
    /// Commit the new one was built on, if any.
    pub parent: Option<String>,
    pub branch: String,
    /// `true` when the branch did not exist and was created.
    pub created_branch: bool,
}

/// Publishes staged files to a hosted repository through a [`GitRemote`].
pub struct Publisher<R> {
    remote: R,
    options: PublishOptions,
}

impl<R: GitRemote> Publisher<R> {
    pub fn new(remote: R, options: PublishOptions) -> Self {
        Self { remote, options }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub async fn create_repository(
        &self,
        account: &Account,
        spec: &RepositorySpec,
    ) -> Result<RemoteRepository, RemoteError> {
        info!(repo = %spec.name, visibility = %spec.visibility, "creating repository");
        let created = self.remote.create_repository(account, spec).await?;
        info!(repo = %created.full_name, "repository created");
        Ok(created)
    }

    /// Commit `request.files` on top of `request.branch`.
    ///
    /// When the branch is missing it is created from a commit whose parent is
    /// the tip of the repository's default branch, or a root commit when that
    /// cannot be resolved. An existing branch is only fast-forwarded. Blobs
    /// already uploaded when a later step fails are left behind.
    pub async fn commit_files(
        &self,
        account: &Account,
        request: &CommitRequest,
    ) -> Result<CommitOutcome, PublishError> {
        let repo = request.repo_name.as_str();
        let branch = request.branch.as_str();

        let repository = self
            .remote
            .get_repository(account, repo)
            .await
            .map_err(PublishError::at(Step::CheckRepository))?
            .ok_or_else(|| PublishError::RepositoryNotFound(repo.to_owned()))?;
        self.step(format_args!("found repository {}", repository.full_name));

        let files = flatten(&request.files);
        info!(repo, branch, files = files.len(), "uploading blobs");
        let items = self.upload_blobs(account, repo, &files).await?;

        let tip = self
            .remote
            .get_branch_tip(account, repo, branch)
            .await
            .map_err(PublishError::at(Step::LookupBranch))?;

        let base = match &tip {
            Some(sha) => {
                self.step(format_args!("branch {branch} is at {sha}"));
                Some(sha.clone())
            }
            None => self.default_branch_tip(account, &repository).await,
        };

        let tree_sha = self
            .remote
            .create_tree(account, repo, base.as_deref(), &items)
            .await
            .map_err(PublishError::at(Step::CreateTree))?;
        self.step(format_args!("created tree {tree_sha}"));

        let parents: Vec<String> = base.iter().cloned().collect();
        let commit_sha = self
            .remote
            .create_commit(account, repo, &request.message, &tree_sha, &parents)
            .await
            .map_err(PublishError::at(Step::CreateCommit))?;
        self.step(format_args!("created commit {commit_sha}"));

        let created_branch = tip.is_none();
        if created_branch {
            self.remote
                .create_ref(account, repo, branch, &commit_sha)
                .await
                .map_err(PublishError::at(Step::CreateRef))?;
        } else {
            self.remote
                .update_ref(account, repo, branch, &commit_sha, false)
                .await
                .map_err(PublishError::at(Step::UpdateRef))?;
        }

        info!(repo, branch, commit = %commit_sha, created_branch, "commit published");

        Ok(CommitOutcome {
            commit_sha,
            tree_sha,
            parent: base,
            branch: branch.to_owned(),
            created_branch,
        })
    }

    async fn upload_blobs(
        &self,
        account: &Account,
        repo: &str,
        files: &[FileEntry],
    ) -> Result<Vec<TreeItem>, PublishError> {
        stream::iter(files)
            .map(|file| async move {
                let payload = file.content().map(|c| c.to_base64()).unwrap_or_default();
                let sha = self
                    .remote
                    .create_blob(account, repo, &payload)
                    .await
                    .map_err(|source| PublishError::Blob {
                        path: file.path.clone(),
                        source,
                    })?;
                self.step(format_args!("blob {sha} for {}", file.path));
                Ok::<_, PublishError>(TreeItem::blob(file.path.clone(), sha))
            })
            .buffered(self.options.blob_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Tip of the default branch, or `None` when it cannot be resolved.
    async fn default_branch_tip(&self, account: &Account, repository: &RemoteRepository) -> Option<String> {
        let Some(default_branch) = repository.default_branch.as_deref() else {
            self.step(format_args!("repository has no default branch, creating a root commit"));
            return None;
        };

        match self
            .remote
            .get_branch_tip(account, &repository.name, default_branch)
            .await
        {
            Ok(Some(sha)) => {
                self.step(format_args!("basing new branch on {default_branch} at {sha}"));
                Some(sha)
            }
            Ok(None) => {
                self.step(format_args!("default branch {default_branch} has no commits"));
                None
            }
            Err(e) => {
                self.step(format_args!("default branch lookup failed: {e}"));
                None
            }
        }
    }

    fn step(&self, detail: fmt::Arguments<'_>) {
        if self.options.debug_logging {
            debug!("{detail}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileContent;
    use crate::test_support::{RecordingRemote, RemoteCall};

    fn account() -> Account {
        Account::new("octocat", "token")
    }

    fn request(branch: &str, files: Vec<FileEntry>) -> CommitRequest {
        CommitRequest {
            repo_name: "demo".into(),
            branch: branch.into(),
            message: "Initial commit".into(),
            files,
        }
    }

    #[tokio::test]
    async fn missing_branch_is_created_from_default_branch_tip() {
        let remote = RecordingRemote::new()
            .with_repository("demo", Some("main"))
            .with_branch("demo", "main", "base-sha");
        let publisher = Publisher::new(remote, PublishOptions::default());

        let outcome = publisher
            .commit_files(&account(), &request("feature", vec![FileEntry::text("a.txt", "a")]))
            .await
            .unwrap();

        assert!(outcome.created_branch);
        assert_eq!(outcome.parent.as_deref(), Some("base-sha"));

        let calls = publisher.remote().calls();
        assert_eq!(
            calls,
            vec![
                RemoteCall::GetRepository { repo: "demo".into() },
                RemoteCall::CreateBlob { content: "YQ==".into() },
                RemoteCall::GetBranchTip { branch: "feature".into() },
                RemoteCall::GetBranchTip { branch: "main".into() },
                RemoteCall::CreateTree {
                    base_tree: Some("base-sha".into()),
                    paths: vec!["a.txt".into()],
                },
                RemoteCall::CreateCommit {
                    message: "Initial commit".into(),
                    tree: outcome.tree_sha.clone(),
                    parents: vec!["base-sha".into()],
                },
                RemoteCall::CreateRef {
                    branch: "feature".into(),
                    sha: outcome.commit_sha.clone(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_repository_gets_a_root_commit() {
        let remote = RecordingRemote::new().with_repository("demo", Some("main"));
        let publisher = Publisher::new(remote, PublishOptions::default());

        let outcome = publisher
            .commit_files(&account(), &request("main", vec![FileEntry::text("a.txt", "a")]))
            .await
            .unwrap();

        assert!(outcome.created_branch);
        assert!(outcome.parent.is_none());

        let calls = publisher.remote().calls();
        assert!(calls.contains(&RemoteCall::CreateTree {
            base_tree: None,
            paths: vec!["a.txt".into()],
        }));
        assert!(matches!(
            calls.last(),
            Some(RemoteCall::CreateRef { branch, .. }) if branch == "main"
        ));
        assert!(calls.iter().any(|c| matches!(c, RemoteCall::CreateCommit { parents, .. } if parents.is_empty())));
    }

    #[tokio::test]
    async fn existing_branch_is_fast_forwarded() {
        let remote = RecordingRemote::new()
            .with_repository("demo", Some("main"))
            .with_branch("demo", "main", "tip-sha");
        let publisher = Publisher::new(remote, PublishOptions::default());

        let outcome = publisher
            .commit_files(&account(), &request("main", vec![FileEntry::text("a.txt", "a")]))
            .await
            .unwrap();

        assert!(!outcome.created_branch);
        assert_eq!(
            publisher.remote().calls().last(),
            Some(&RemoteCall::UpdateRef {
                branch: "main".into(),
                sha: outcome.commit_sha.clone(),
                force: false,
            })
        );
        assert_eq!(publisher.remote().branch_tip("demo", "main"), Some(outcome.commit_sha));
    }

    #[tokio::test]
    async fn missing_repository_stops_before_any_blob() {
        let publisher = Publisher::new(RecordingRemote::new(), PublishOptions::default());

        let err = publisher
            .commit_files(&account(), &request("main", vec![FileEntry::text("a.txt", "a")]))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::RepositoryNotFound(ref name) if name == "demo"));
        assert_eq!(
            publisher.remote().calls(),
            vec![RemoteCall::GetRepository { repo: "demo".into() }]
        );
    }

    #[tokio::test]
    async fn blob_failure_names_the_file_and_aborts() {
        let remote = RecordingRemote::new()
            .with_repository("demo", Some("main"))
            .failing_blob("Yg==", "content too large");
        let publisher = Publisher::new(remote, PublishOptions::default());

        let err = publisher
            .commit_files(
                &account(),
                &request("main", vec![FileEntry::text("a.txt", "a"), FileEntry::text("b.txt", "b")]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to create blob for b.txt: content too large");
        assert!(
            !publisher
                .remote()
                .calls()
                .iter()
                .any(|c| matches!(c, RemoteCall::GetBranchTip { .. }))
        );
    }

    #[tokio::test]
    async fn nested_files_are_committed_by_full_path_in_order() {
        let remote = RecordingRemote::new().with_repository("demo", None);
        let publisher = Publisher::new(
            remote,
            PublishOptions {
                blob_concurrency: 2,
                debug_logging: true,
            },
        );

        let files = vec![
            FileEntry::directory(
                "src",
                vec![FileEntry::text("main.rs", "fn main() {}"), FileEntry::text("lib.rs", "")],
            ),
            FileEntry::text("README.md", "# demo"),
            FileEntry::file("logo.png", Some(FileContent::Binary("iVBORw0K".into())), 6),
            FileEntry::file("unreadable.txt", None, 10),
        ];

        publisher
            .commit_files(&account(), &request("main", files))
            .await
            .unwrap();

        let calls = publisher.remote().calls();
        let blobs: Vec<&str> = calls
            .iter()
            .filter_map(|c| match c {
                RemoteCall::CreateBlob { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert!(blobs.contains(&"iVBORw0K"));
        assert!(blobs.contains(&""));

        let tree_paths = calls.iter().find_map(|c| match c {
            RemoteCall::CreateTree { paths, .. } => Some(paths.clone()),
            _ => None,
        });
        assert_eq!(
            tree_paths,
            Some(vec![
                "src/main.rs".to_owned(),
                "src/lib.rs".to_owned(),
                "README.md".to_owned(),
                "logo.png".to_owned(),
                "unreadable.txt".to_owned(),
            ])
        );
    }

    #[tokio::test]
    async fn rejected_fast_forward_surfaces_as_update_step() {
        let remote = RecordingRemote::new()
            .with_repository("demo", Some("main"))
            .with_branch("demo", "main", "tip-sha")
            .rejecting_ref_updates("Update is not a fast forward");
        let publisher = Publisher::new(remote, PublishOptions::default());

        let err = publisher
            .commit_files(&account(), &request("main", vec![FileEntry::text("a.txt", "a")]))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Step { step: Step::UpdateRef, .. }));
        assert_eq!(err.to_string(), "branch update failed: Update is not a fast forward");
    }

    #[tokio::test]
    async fn create_repository_delegates_to_remote() {
        let publisher = Publisher::new(RecordingRemote::new(), PublishOptions::default());
        let mut spec = RepositorySpec::new("fresh");
        spec.description = "A new one".into();

        let created = publisher.create_repository(&account(), &spec).await.unwrap();

        assert_eq!(created.full_name, "octocat/fresh");
        assert!(created.private);
        assert_eq!(
            publisher.remote().calls(),
            vec![RemoteCall::CreateRepository { spec }]
        );
    }
}
