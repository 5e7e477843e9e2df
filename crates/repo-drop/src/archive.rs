use std::io::{Cursor, Read};
use std::path::Component;

use zip::ZipArchive;

/// Resource-fork folder that macOS adds to archives it creates.
const MACOS_X_FOLDER: &str = "__MACOSX";

/// Errors that can occur while reading an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("invalid archive: {0}")]
    Invalid(String),

    #[error("failed to read archive entry {path}: {reason}")]
    Entry { path: String, reason: String },

    #[error("archive extraction was interrupted: {0}")]
    Interrupted(String),
}

/// One entry of an extracted archive, with its full archive-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    Directory { path: String },
    File { path: String, bytes: Vec<u8> },
}

impl ArchiveEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path } | Self::File { path, .. } => path,
        }
    }
}

/// Decompress every entry of a ZIP archive held in memory.
///
/// Entries are returned in archive order. Entries whose names escape the
/// archive root and macOS resource-fork entries are skipped.
pub fn extract(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Invalid(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

        let name = file.name().replace('\\', "/");

        let contained = file.enclosed_name().is_some_and(|path| {
            path.components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        });
        if !contained {
            tracing::warn!(entry = %name, "skipping archive entry outside the archive root");
            continue;
        }

        if name.split('/').any(|segment| segment == MACOS_X_FOLDER) {
            continue;
        }

        if file.is_dir() {
            entries.push(ArchiveEntry::Directory { path: name });
            continue;
        }

        let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut buf).map_err(|e| ArchiveError::Entry {
            path: name.clone(),
            reason: e.to_string(),
        })?;

        entries.push(ArchiveEntry::File { path: name, bytes: buf });
    }

    Ok(entries)
}
