use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Loaded content of a staged file.
///
/// Text is kept verbatim. Anything that is not valid UTF-8 is kept as the
/// base64 encoding of its raw bytes, so the two never get confused when the
/// content is later encoded for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum FileContent {
    Text(String),
    #[serde(rename = "base64")]
    Binary(String),
}

impl FileContent {
    /// Strict UTF-8 decode, falling back to base64 for anything else.
    pub fn decode(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Binary(
                base64::engine::general_purpose::STANDARD.encode(e.into_bytes()),
            ),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Base64 payload suitable for a blob upload.
    ///
    /// Binary content is already base64 and is passed through untouched.
    pub fn to_base64(&self) -> String {
        match self {
            Self::Text(text) => base64::engine::general_purpose::STANDARD.encode(text),
            Self::Binary(encoded) => encoded.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Discriminant of a [`FileEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// Payload of a [`FileEntry`]: files carry content, directories carry children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<FileContent>,
        size: u64,
    },
    Directory {
        #[serde(default)]
        children: Vec<FileEntry>,
    },
}

/// A node in the staged tree.
///
/// `path` is the name relative to the parent directory. After
/// [`flatten`](crate::flatten) it holds the full slash-joined path instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(flatten)]
    pub node: Node,
}

impl FileEntry {
    pub fn file(path: impl Into<String>, content: Option<FileContent>, size: u64) -> Self {
        Self {
            path: path.into(),
            node: Node::File { content, size },
        }
    }

    /// A text file whose size is the byte length of `text`.
    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let size = text.len() as u64;
        Self::file(path, Some(FileContent::Text(text)), size)
    }

    pub fn directory(path: impl Into<String>, children: Vec<FileEntry>) -> Self {
        Self {
            path: path.into(),
            node: Node::Directory { children },
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self.node {
            Node::File { .. } => EntryKind::File,
            Node::Directory { .. } => EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind() == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == EntryKind::Directory
    }

    pub fn content(&self) -> Option<&FileContent> {
        match &self.node {
            Node::File { content, .. } => content.as_ref(),
            Node::Directory { .. } => None,
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self.node {
            Node::File { size, .. } => Some(size),
            Node::Directory { .. } => None,
        }
    }

    /// `None` for directories, matching the "file nodes only" rule.
    pub fn is_binary(&self) -> Option<bool> {
        match &self.node {
            Node::File { content, .. } => Some(content.as_ref().is_some_and(FileContent::is_binary)),
            Node::Directory { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&[FileEntry]> {
        match &self.node {
            Node::Directory { children } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<FileEntry>> {
        match &mut self.node {
            Node::Directory { children } => Some(children),
            Node::File { .. } => None,
        }
    }

    /// Look up a descendant by its slash-joined path below this forest level.
    pub fn find<'a>(forest: &'a [FileEntry], full_path: &str) -> Option<&'a FileEntry> {
        let mut level = forest;
        let mut segments = full_path.split('/').filter(|s| !s.is_empty()).peekable();

        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            let entry = level
                .iter()
                .find(|e| e.path == segment && (last || e.is_directory()))?;
            if last {
                return Some(entry);
            }
            level = entry.children()?;
        }

        None
    }
}

/// Join a parent path and a segment with `/`, ignoring an empty parent.
pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_owned()
    } else {
        format!("{parent}/{segment}")
    }
}
