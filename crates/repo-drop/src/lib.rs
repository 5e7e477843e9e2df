pub mod archive;
pub mod builder;
pub mod entry;
pub mod flatten;
mod hierarchy;
pub mod ignore;
pub mod publish;
pub mod raw;
pub mod remote;
pub mod select;
pub mod validate;

pub use builder::{TreeBuilder, build_tree, infer_repo_name};
pub use entry::{EntryKind, FileContent, FileEntry, Node};
pub use flatten::flatten;
pub use ignore::{IgnorePatterns, apply_ignore_patterns, files_for_commit};
pub use publish::{CommitOutcome, CommitRequest, PublishError, PublishOptions, Publisher, Step};
pub use raw::{ByteSource, RawFile};
pub use remote::{
    Account, GitRef, GitRemote, RemoteError, RemoteRepository, RepositorySpec, TreeItem, Visibility,
};
pub use select::{file_paths, filter_selected};
pub use validate::{InvalidRepositoryName, validate_repository_name};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
