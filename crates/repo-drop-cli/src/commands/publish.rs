use anyhow::{Context, Result, bail};
use repo_drop::{
    Account, CommitOutcome, CommitRequest, GitRemote, IgnorePatterns, Publisher, RawFile,
    RepositorySpec, TreeBuilder, Visibility, file_paths, infer_repo_name, validate_repository_name,
};

use super::select_files;

/// Everything the publish command decided before touching the network.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    /// `None` infers the name from the inputs.
    pub repo: Option<String>,
    pub branch: String,
    pub message: String,
    pub description: String,
    pub visibility: Visibility,
    /// Create the repository first; off when committing to an existing one.
    pub create: bool,
    pub select: Vec<String>,
    pub ignore: IgnorePatterns,
}

pub async fn run<R: GitRemote>(
    publisher: &Publisher<R>,
    account: &Account,
    raw: Vec<RawFile>,
    plan: PublishPlan,
) -> Result<CommitOutcome> {
    let repo_name = match plan.repo {
        Some(name) => name,
        None => infer_repo_name(&raw)
            .context("could not infer a repository name from the inputs; pass --repo")?,
    };
    validate_repository_name(&repo_name)
        .with_context(|| format!("invalid repository name {repo_name:?}"))?;

    let tree = TreeBuilder::new().build(raw).await;
    let files = select_files(&tree, &plan.ignore, &plan.select);
    let count = file_paths(&files).len();
    if count == 0 {
        bail!("nothing to commit: every file was ignored or left out of the selection");
    }

    if plan.create {
        let spec = RepositorySpec {
            name: repo_name.clone(),
            description: plan.description,
            visibility: plan.visibility,
            auto_init: false,
        };
        publisher
            .create_repository(account, &spec)
            .await
            .with_context(|| format!("failed to create repository {repo_name}"))?;
    }

    let request = CommitRequest {
        repo_name: repo_name.clone(),
        branch: plan.branch,
        message: plan.message,
        files,
    };
    let outcome = publisher
        .commit_files(account, &request)
        .await
        .with_context(|| format!("failed to publish to {}/{repo_name}", account.username))?;

    let verb = if outcome.created_branch { "created" } else { "updated" };
    println!(
        "Committed {count} files to {}/{repo_name} ({verb} branch {}, commit {})",
        account.username, outcome.branch, outcome.commit_sha
    );

    Ok(outcome)
}
