use futures::stream::{self, StreamExt};

use crate::archive::{self, ArchiveEntry, ArchiveError};
use crate::entry::{FileContent, FileEntry, Node, join_path};
use crate::hierarchy;
use crate::raw::{RawFile, strip_archive_extension};

/// Default number of inputs loaded at once.
pub const DEFAULT_LOAD_CONCURRENCY: usize = 16;

/// Converts raw input files into one normalized forest.
///
/// Inputs are read and decoded concurrently, then merged into the forest
/// one at a time in input order. Nothing here fails the whole batch: an
/// unreadable file is kept without content and a malformed archive
/// contributes nothing, both with a warning.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    concurrency: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_LOAD_CONCURRENCY,
        }
    }
}

/// A node waiting to be merged, keyed by its full path.
#[derive(Debug)]
struct Staged {
    path: String,
    node: Node,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn build(&self, files: Vec<RawFile>) -> Vec<FileEntry> {
        let loaded: Vec<Vec<Staged>> = stream::iter(files)
            .map(load)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut forest = Vec::new();
        for staged in loaded.into_iter().flatten() {
            hierarchy::insert(&mut forest, &staged.path, staged.node);
        }

        hierarchy::unwrap_single_root(forest)
    }
}

/// Build a normalized forest with the default settings.
pub async fn build_tree(files: Vec<RawFile>) -> Vec<FileEntry> {
    TreeBuilder::default().build(files).await
}

async fn load(raw: RawFile) -> Vec<Staged> {
    if raw.is_archive() {
        return load_archive(raw).await;
    }

    let path = raw.effective_path().to_owned();

    if looks_like_directory(&raw) {
        return vec![Staged {
            path,
            node: Node::Directory {
                children: Vec::new(),
            },
        }];
    }

    let content = match raw.read().await {
        Ok(bytes) => Some(FileContent::decode(bytes)),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "could not read file content");
            None
        }
    };

    vec![Staged {
        path,
        node: Node::File {
            content,
            size: raw.size,
        },
    }]
}

async fn load_archive(raw: RawFile) -> Vec<Staged> {
    let archive_path = raw.effective_path().to_owned();

    let entries = match read_archive(&raw).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(archive = %archive_path, error = %e, "dropping unreadable archive");
            return Vec::new();
        }
    };

    // Contents land next to the archive: at the top level for a standalone
    // upload, inside the archive's directory for one found in a dropped folder.
    let parent = archive_path
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or_default();

    tracing::debug!(archive = %archive_path, entries = entries.len(), "extracted archive");

    entries
        .into_iter()
        .map(|entry| match entry {
            ArchiveEntry::Directory { path } => Staged {
                path: join_path(parent, &path),
                node: Node::Directory {
                    children: Vec::new(),
                },
            },
            ArchiveEntry::File { path, bytes } => Staged {
                path: join_path(parent, &path),
                node: Node::File {
                    size: bytes.len() as u64,
                    content: Some(FileContent::decode(bytes)),
                },
            },
        })
        .collect()
}

async fn read_archive(raw: &RawFile) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let bytes = raw
        .read()
        .await
        .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

    tokio::task::spawn_blocking(move || archive::extract(&bytes))
        .await
        .map_err(|e| ArchiveError::Interrupted(e.to_string()))?
}

/// Heuristic for directory placeholders among raw inputs.
///
/// A relative path with a trailing `/` is always a directory. Otherwise an
/// input with no media type, zero size and no extension is treated as an
/// empty directory, unless it is a dotfile, which is always a file.
pub(crate) fn looks_like_directory(raw: &RawFile) -> bool {
    if raw
        .relative_path
        .as_deref()
        .is_some_and(|p| p.ends_with('/'))
    {
        return true;
    }

    let path = raw.effective_path();
    let untyped = raw.media_type.as_deref().is_none_or(str::is_empty);
    let probably_directory = untyped && raw.size == 0 && !has_extension(path);

    probably_directory && !is_dotfile(path)
}

/// `.gitignore`, `.env`: the final segment starts with a dot.
fn is_dotfile(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|name| name.len() > 1 && name.starts_with('.'))
}

/// True when the final segment has a dot after its first character.
fn has_extension(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rfind('.').is_some_and(|index| index > 0)
}

/// Propose a repository name from the raw inputs, before any tree is built.
///
/// A single archive yields its name without the extension; otherwise the
/// first segment of the first relative path found. `None` means the caller
/// has to ask.
pub fn infer_repo_name(files: &[RawFile]) -> Option<String> {
    if let [only] = files
        && let Some(stem) = strip_archive_extension(&only.name)
        && !stem.is_empty()
    {
        return Some(stem.to_owned());
    }

    files
        .iter()
        .filter_map(|f| f.relative_path.as_deref())
        .find_map(|p| p.split('/').find(|segment| !segment.is_empty()))
        .map(str::to_owned)
}
