/// Longest repository name the hosting service accepts.
pub const MAX_REPOSITORY_NAME_LEN: usize = 100;

/// Why a repository name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRepositoryName {
    #[error("repository name is required")]
    Empty,

    #[error("repository name is longer than 100 characters")]
    TooLong,

    #[error(
        "repository name can only contain alphanumeric characters, hyphens, underscores, and periods (found {0:?})"
    )]
    InvalidCharacter(char),
}

/// Check a name against the hosting service's repository naming rules:
/// ASCII letters, digits, `.`, `_` and `-`, at most 100 characters.
pub fn validate_repository_name(name: &str) -> Result<(), InvalidRepositoryName> {
    if name.is_empty() {
        return Err(InvalidRepositoryName::Empty);
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(InvalidRepositoryName::InvalidCharacter(bad));
    }

    if name.len() > MAX_REPOSITORY_NAME_LEN {
        return Err(InvalidRepositoryName::TooLong);
    }

    Ok(())
}
