use std::str::FromStr;

use crate::entry::{FileEntry, Node, join_path};

/// A single compiled ignore pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `foo`: the path itself.
    Exact(String),
    /// `foo*`: any path starting with `foo`.
    Prefix(String),
    /// `*foo`: any path ending with `foo`.
    Suffix(String),
    /// `foo/`: `foo` and everything below it. Sibling names such as
    /// `foobar` are not matched.
    Directory(String),
}

impl Pattern {
    pub fn parse(raw: &str) -> Self {
        if let Some(prefix) = raw.strip_suffix('*') {
            Self::Prefix(prefix.to_owned())
        } else if let Some(suffix) = raw.strip_prefix('*') {
            Self::Suffix(suffix.to_owned())
        } else if let Some(dir) = raw.strip_suffix('/') {
            Self::Directory(dir.trim_end_matches('/').to_owned())
        } else {
            Self::Exact(raw.to_owned())
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
            Self::Directory(dir) => path
                .strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// An ordered set of ignore patterns.
///
/// A path is ignored when any pattern matches; order has no effect on the
/// outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_owned())
                .filter(|p| !p.is_empty())
                .map(|p| Pattern::parse(&p))
                .collect(),
        }
    }

    /// Parse ignore-file text: one pattern per line, blank lines and `#`
    /// comments discarded.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn extend(&mut self, other: IgnorePatterns) {
        self.patterns.extend(other.patterns);
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

impl FromStr for IgnorePatterns {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Keep only the paths no pattern matches, preserving order.
pub fn apply_ignore_patterns<I, S>(paths: I, patterns: &IgnorePatterns) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    paths
        .into_iter()
        .map(Into::into)
        .filter(|path| !patterns.is_ignored(path))
        .collect()
}

/// Full paths of the files that would be committed.
///
/// Patterns are checked against directories too, so an ignored directory
/// excludes everything beneath it without visiting it.
pub fn files_for_commit(tree: &[FileEntry], patterns: &IgnorePatterns) -> Vec<String> {
    fn walk(entries: &[FileEntry], base: &str, patterns: &IgnorePatterns, out: &mut Vec<String>) {
        for entry in entries {
            let full = join_path(base, entry.path.trim_end_matches('/'));
            if patterns.is_ignored(&full) {
                continue;
            }
            match &entry.node {
                Node::File { .. } => out.push(full),
                Node::Directory { children } => walk(children, &full, patterns, out),
            }
        }
    }

    let mut out = Vec::new();
    walk(tree, "", patterns, &mut out);
    out
}
