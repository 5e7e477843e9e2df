use repo_drop::{FileEntry, Node};

const INDENT: &str = "  ";

pub fn print_tree(tree: &[FileEntry]) {
    for line in render_tree(tree) {
        println!("{line}");
    }
}

/// One line per entry, children indented under their directory.
pub fn render_tree(tree: &[FileEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    render_level(tree, 0, &mut lines);
    lines
}

fn render_level(entries: &[FileEntry], depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);

    for entry in entries {
        let name = entry.path.trim_end_matches('/');
        match &entry.node {
            Node::Directory { children } => {
                lines.push(format!("{indent}{name}/"));
                render_level(children, depth + 1, lines);
            }
            Node::File { content, size } => {
                let note = match content {
                    None => " (unreadable)",
                    Some(c) if c.is_binary() => " (binary)",
                    Some(_) => "",
                };
                lines.push(format!("{indent}{name}  {}{note}", human_size(*size)));
            }
        }
    }
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    format!("{value:.1} {unit}")
}
