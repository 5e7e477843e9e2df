use std::collections::HashSet;

use crate::entry::{FileEntry, Node, join_path};

/// Full slash-joined paths of every file in the tree, in tree order.
pub fn file_paths(tree: &[FileEntry]) -> Vec<String> {
    fn walk(entries: &[FileEntry], base: &str, out: &mut Vec<String>) {
        for entry in entries {
            let full = join_path(base, entry.path.trim_end_matches('/'));
            match &entry.node {
                Node::File { .. } => out.push(full),
                Node::Directory { children } => walk(children, &full, out),
            }
        }
    }

    let mut out = Vec::new();
    walk(tree, "", &mut out);
    out
}

/// Prune the tree down to the selected files.
///
/// A file survives when its full path is in `selected`. A directory
/// survives only when at least one descendant file does; selecting a
/// directory path by itself selects nothing. Filtering an already filtered
/// tree with the same selection returns it unchanged.
pub fn filter_selected(tree: &[FileEntry], selected: &HashSet<String>) -> Vec<FileEntry> {
    filter_level(tree, "", selected)
}

fn filter_level(entries: &[FileEntry], base: &str, selected: &HashSet<String>) -> Vec<FileEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let full = join_path(base, entry.path.trim_end_matches('/'));
            match &entry.node {
                Node::File { .. } => selected.contains(&full).then(|| entry.clone()),
                Node::Directory { children } => {
                    let kept = filter_level(children, &full, selected);
                    (!kept.is_empty()).then(|| FileEntry::directory(entry.path.clone(), kept))
                }
            }
        })
        .collect()
}
