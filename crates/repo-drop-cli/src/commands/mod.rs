pub mod create;
pub mod format;
pub mod publish;
pub mod stage;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use repo_drop::{FileEntry, IgnorePatterns, files_for_commit, filter_selected};

use crate::config::AppConfig;

/// Config defaults, then the ignore file, then `--ignore` flags.
pub fn ignore_patterns(
    config: &AppConfig,
    flags: &[String],
    ignore_file: Option<&Path>,
) -> Result<IgnorePatterns> {
    let mut patterns = config.default_ignore_patterns();

    if let Some(path) = ignore_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ignore file {}", path.display()))?;
        patterns.extend(IgnorePatterns::parse(&text));
    }

    patterns.extend(IgnorePatterns::new(flags));
    Ok(patterns)
}

/// Prune a staged tree down to what will be committed.
///
/// Ignored files always go. When `selection` is non-empty only files equal
/// to, or below, one of its paths are kept.
pub fn select_files(tree: &[FileEntry], patterns: &IgnorePatterns, selection: &[String]) -> Vec<FileEntry> {
    let wanted: Vec<&str> = selection
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();

    let kept: HashSet<String> = files_for_commit(tree, patterns)
        .into_iter()
        .filter(|path| {
            wanted.is_empty()
                || wanted.iter().any(|w| {
                    path.strip_prefix(w)
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
                })
        })
        .collect();

    filter_selected(tree, &kept)
}
