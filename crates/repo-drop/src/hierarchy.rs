use crate::entry::{FileEntry, Node};

/// Insert a node at a slash-separated path, creating intermediate
/// directories as needed.
///
/// Directories are keyed by name within their parent: an existing directory
/// is reused rather than duplicated, and a directory leaf merges into any
/// directory already present under that name. A file replaces an earlier
/// file of the same name at the same level. Empty segments (leading, doubled
/// or trailing separators) are skipped, so `"a/"` only ensures that `a`
/// exists.
pub(crate) fn insert(forest: &mut Vec<FileEntry>, path: &str, node: Node) {
    let mut segments: Vec<&str> = path.split('/').collect();
    let leaf = segments.pop().unwrap_or_default();

    let mut level = forest;
    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        level = directory_children(level, segment);
    }

    if leaf.is_empty() {
        return;
    }

    match node {
        Node::Directory { children } => {
            let existing = directory_children(level, leaf);
            for child in children {
                insert_entry(existing, child);
            }
        }
        file @ Node::File { .. } => {
            let entry = FileEntry {
                path: leaf.to_owned(),
                node: file,
            };
            match level.iter_mut().find(|e| e.is_file() && e.path == leaf) {
                Some(slot) => *slot = entry,
                None => level.push(entry),
            }
        }
    }
}

fn insert_entry(level: &mut Vec<FileEntry>, entry: FileEntry) {
    let FileEntry { path, node } = entry;
    insert(level, &path, node);
}

/// Find or create the directory `name` in `level`, returning its children.
fn directory_children<'a>(level: &'a mut Vec<FileEntry>, name: &str) -> &'a mut Vec<FileEntry> {
    let index = match level
        .iter()
        .position(|e| e.is_directory() && e.path == name)
    {
        Some(index) => index,
        None => {
            level.push(FileEntry::directory(name, Vec::new()));
            level.len() - 1
        }
    };

    match &mut level[index].node {
        Node::Directory { children } => children,
        Node::File { .. } => unreachable!("position() matched a directory"),
    }
}

/// Promote the children of a single top-level directory.
///
/// Applied once at the top level only; nested single-child directories are
/// left alone.
pub(crate) fn unwrap_single_root(forest: Vec<FileEntry>) -> Vec<FileEntry> {
    if forest.len() != 1 || !forest[0].is_directory() {
        return forest;
    }

    match forest.into_iter().next().map(|e| e.node) {
        Some(Node::Directory { children }) => children,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileContent;

    fn file(text: &str) -> Node {
        Node::File {
            content: Some(FileContent::Text(text.into())),
            size: text.len() as u64,
        }
    }

    fn empty_dir() -> Node {
        Node::Directory {
            children: Vec::new(),
        }
    }

    #[test]
    fn top_level_file_is_pushed_as_is() {
        let mut forest = Vec::new();
        insert(&mut forest, "README.md", file("hi"));

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].path, "README.md");
        assert!(forest[0].is_file());
    }

    #[test]
    fn nested_path_creates_directories_with_leaf_names() {
        let mut forest = Vec::new();
        insert(&mut forest, "dir/sub/file.txt", file("x"));

        assert_eq!(forest[0].path, "dir");
        let sub = &forest[0].children().unwrap()[0];
        assert_eq!(sub.path, "sub");
        let leaf = &sub.children().unwrap()[0];
        assert_eq!(leaf.path, "file.txt");
        assert!(leaf.is_file());
    }

    #[test]
    fn shared_directories_are_not_duplicated() {
        let mut forest = Vec::new();
        insert(&mut forest, "src/a.rs", file("a"));
        insert(&mut forest, "src/b.rs", file("b"));
        insert(&mut forest, "src/nested/c.rs", file("c"));

        assert_eq!(forest.len(), 1);
        let names: Vec<&str> = forest[0]
            .children()
            .unwrap()
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(names, vec!["a.rs", "b.rs", "nested"]);
    }

    #[test]
    fn declared_directory_merges_with_files_beneath_it() {
        let mut forest = Vec::new();
        insert(&mut forest, "a/", empty_dir());
        insert(&mut forest, "a/b.txt", file("b"));
        insert(&mut forest, "a", empty_dir());

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children().unwrap().len(), 1);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let mut forest = Vec::new();
        insert(&mut forest, "a//b.txt", file("b"));

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children().unwrap()[0].path, "b.txt");
    }

    #[test]
    fn later_file_replaces_earlier_file_of_same_name() {
        let mut forest = Vec::new();
        insert(&mut forest, "dir/a.txt", file("old"));
        insert(&mut forest, "dir/a.txt", file("new"));

        let children = forest[0].children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].content(),
            Some(&FileContent::Text("new".into()))
        );
    }

    #[test]
    fn file_and_directory_may_share_a_name() {
        let mut forest = Vec::new();
        insert(&mut forest, "build", file(""));
        insert(&mut forest, "build/out.txt", file("x"));

        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn unwrap_promotes_single_directory_children() {
        let forest = vec![FileEntry::directory(
            "project",
            vec![
                FileEntry::text("a.txt", "a"),
                FileEntry::directory("inner", vec![FileEntry::text("b.txt", "b")]),
            ],
        )];

        let unwrapped = unwrap_single_root(forest);
        assert_eq!(unwrapped.len(), 2);
        assert_eq!(unwrapped[0].path, "a.txt");
        assert_eq!(unwrapped[1].path, "inner");
    }

    #[test]
    fn unwrap_does_not_recurse() {
        let forest = vec![FileEntry::directory(
            "outer",
            vec![FileEntry::directory("inner", vec![FileEntry::text("x", "x")])],
        )];

        let unwrapped = unwrap_single_root(forest);
        assert_eq!(unwrapped.len(), 1);
        assert_eq!(unwrapped[0].path, "inner");
        assert!(unwrapped[0].is_directory());
    }

    #[test]
    fn unwrap_leaves_single_file_and_multiple_roots_alone() {
        let single_file = vec![FileEntry::text("a.txt", "a")];
        assert_eq!(unwrap_single_root(single_file.clone()), single_file);

        let two_dirs = vec![
            FileEntry::directory("a", Vec::new()),
            FileEntry::directory("b", Vec::new()),
        ];
        assert_eq!(unwrap_single_root(two_dirs.clone()), two_dirs);
    }
}
