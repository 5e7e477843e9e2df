use crate::entry::{FileEntry, Node, join_path};

/// Flatten a tree into its files, each keyed by its full path.
///
/// Directories are dropped. Already-flat input comes back with the same
/// paths.
pub fn flatten(tree: &[FileEntry]) -> Vec<FileEntry> {
    let mut out = Vec::new();
    for entry in tree {
        walk(entry, "", &mut out);
    }
    out
}

fn walk(entry: &FileEntry, base: &str, out: &mut Vec<FileEntry>) {
    let full = join_path(base, entry.path.trim_end_matches('/'));

    match &entry.node {
        Node::File { .. } => out.push(FileEntry {
            path: full,
            node: entry.node.clone(),
        }),
        Node::Directory { children } => {
            for child in children {
                walk(child, &full, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rekeys_files_to_full_paths() {
        let tree = vec![
            FileEntry::text("README.md", "hi"),
            FileEntry::directory(
                "src",
                vec![FileEntry::directory("bin", vec![FileEntry::text("cli.rs", "")])],
            ),
            FileEntry::directory("empty", Vec::new()),
        ];

        let flat = flatten(&tree);
        let paths: Vec<&str> = flat.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src/bin/cli.rs"]);
        assert!(flat.iter().all(FileEntry::is_file));
    }

    #[test]
    fn keeps_content_and_size() {
        let flat = flatten(&[FileEntry::directory("a", vec![FileEntry::text("b.txt", "abc")])]);
        assert_eq!(flat[0], FileEntry::text("a/b.txt", "abc"));
    }

    #[test]
    fn trailing_slash_on_directory_names_is_dropped() {
        let flat = flatten(&[FileEntry::directory("a/", vec![FileEntry::text("b.txt", "")])]);
        assert_eq!(flat[0].path, "a/b.txt");
    }

    #[test]
    fn flattening_flat_input_is_a_no_op() {
        let tree = vec![
            FileEntry::text("x.txt", "x"),
            FileEntry::directory("d", vec![FileEntry::text("y.txt", "y")]),
        ];

        let once = flatten(&tree);
        let twice = flatten(&once);
        assert_eq!(once, twice);
    }
}
