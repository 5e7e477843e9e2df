use anyhow::{Context, Result};
use repo_drop::{Account, GitRemote, Publisher, RemoteRepository, RepositorySpec, validate_repository_name};

pub async fn run<R: GitRemote>(
    publisher: &Publisher<R>,
    account: &Account,
    spec: &RepositorySpec,
) -> Result<RemoteRepository> {
    validate_repository_name(&spec.name)
        .with_context(|| format!("invalid repository name {:?}", spec.name))?;

    let repository = publisher
        .create_repository(account, spec)
        .await
        .with_context(|| format!("failed to create repository {}", spec.name))?;

    match &repository.html_url {
        Some(url) => println!("Created {} ({}) at {url}", repository.full_name, spec.visibility),
        None => println!("Created {} ({})", repository.full_name, spec.visibility),
    }

    Ok(repository)
}
