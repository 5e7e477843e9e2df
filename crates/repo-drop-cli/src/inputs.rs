use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use repo_drop::RawFile;
use tracing::debug;
use walkdir::WalkDir;

/// Media type given to every file read from disk.
///
/// Local files are known to be files, so they must never go through the
/// empty-extensionless directory guess meant for browser-style drops.
const DISK_FILE_MEDIA_TYPE: &str = "application/octet-stream";

/// Turn command-line paths into raw inputs for the tree builder.
///
/// A file becomes a flat input (a `.zip` is expanded later by the builder).
/// A directory is walked and every file keeps `<dir-name>/<relative path>`,
/// the same shape a dropped folder has. Empty directories are kept as
/// placeholders.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<RawFile>> {
    let mut raw = Vec::new();

    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot read input {}", path.display()))?;

        if metadata.is_dir() {
            collect_directory(path, &mut raw)?;
        } else {
            raw.push(disk_file(path, file_name(path)?, metadata.len()));
        }
    }

    debug!(inputs = paths.len(), files = raw.len(), "collected inputs");
    Ok(raw)
}

fn collect_directory(root: &Path, raw: &mut Vec<RawFile>) -> Result<()> {
    let root_name = file_name(root)?;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;

        let mut segments = vec![root_name.clone()];
        segments.extend(relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()));
        let relative_path = segments.join("/");

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if is_empty_dir(entry.path())? {
                raw.push(RawFile::directory(&format!("{relative_path}/")));
            }
        } else if file_type.is_file() {
            let size = entry
                .metadata()
                .with_context(|| format!("cannot stat {}", entry.path().display()))?
                .len();
            let name = entry.file_name().to_string_lossy().into_owned();
            raw.push(disk_file(entry.path(), name, size).with_relative_path(relative_path));
        }
    }

    Ok(())
}

fn disk_file(path: &Path, name: String, size: u64) -> RawFile {
    RawFile::from_disk(name, path, size).with_media_type(DISK_FILE_MEDIA_TYPE)
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(path)
        .with_context(|| format!("cannot list {}", path.display()))?;
    Ok(entries.next().is_none())
}

fn file_name(path: &Path) -> Result<String> {
    let canonical;
    let path = if path.file_name().is_none() {
        canonical = path
            .canonicalize()
            .with_context(|| format!("cannot resolve {}", path.display()))?;
        canonical.as_path()
    } else {
        path
    };

    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("{} has no name", path.display()),
    }
}
