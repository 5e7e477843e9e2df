use std::io;
use std::path::PathBuf;

/// Where the bytes of a [`RawFile`] come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Bytes already held in memory (uploads, tests).
    Memory(Vec<u8>),
    /// A file on disk, read lazily when the tree is built.
    Disk(PathBuf),
}

/// One item of raw input handed to the tree builder.
///
/// Mirrors what an upload surface provides: a file name, an optional
/// relative path (set for files that came from a dropped directory), the
/// declared size and media type, and a way to read the bytes.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub relative_path: Option<String>,
    pub size: u64,
    pub media_type: Option<String>,
    pub source: ByteSource,
}

impl RawFile {
    /// A plain file held in memory, with no relative-path metadata.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            relative_path: None,
            size: bytes.len() as u64,
            media_type: None,
            source: ByteSource::Memory(bytes),
        }
    }

    /// A file read from disk when the tree is built.
    pub fn from_disk(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            relative_path: None,
            size,
            media_type: None,
            source: ByteSource::Disk(path.into()),
        }
    }

    /// Placeholder for a directory with no files in it.
    ///
    /// The relative path is stored with a trailing `/`, which is how a
    /// directory drop marks folders.
    pub fn directory(relative_path: &str) -> Self {
        let trimmed = relative_path.trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or(trimmed).to_owned();
        Self {
            name,
            relative_path: Some(format!("{trimmed}/")),
            size: 0,
            media_type: None,
            source: ByteSource::Memory(Vec::new()),
        }
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The path used for placement: the relative path when present, else the name.
    pub fn effective_path(&self) -> &str {
        self.relative_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.name)
    }

    /// True when the file name carries the `.zip` extension (any case).
    pub fn is_archive(&self) -> bool {
        has_archive_extension(&self.name)
    }

    pub(crate) async fn read(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            ByteSource::Memory(bytes) => Ok(bytes.clone()),
            ByteSource::Disk(path) => tokio::fs::read(path).await,
        }
    }
}

pub(crate) const ARCHIVE_EXTENSION: &str = ".zip";

pub(crate) fn has_archive_extension(name: &str) -> bool {
    strip_archive_extension(name).is_some()
}

pub(crate) fn strip_archive_extension(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(ARCHIVE_EXTENSION.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = name.split_at(split);
    ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION).then_some(stem)
}
