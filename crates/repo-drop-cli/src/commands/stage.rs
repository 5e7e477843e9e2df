use anyhow::Result;
use repo_drop::{IgnorePatterns, RawFile, TreeBuilder, file_paths};

use super::{format, select_files};

pub async fn run(raw: Vec<RawFile>, patterns: &IgnorePatterns, json: bool) -> Result<()> {
    let tree = TreeBuilder::new().build(raw).await;
    let total = file_paths(&tree).len();
    let staged = select_files(&tree, patterns, &[]);

    if json {
        println!("{}", serde_json::to_string_pretty(&staged)?);
        return Ok(());
    }

    format::print_tree(&staged);

    let kept = file_paths(&staged).len();
    let ignored = total - kept;
    if ignored > 0 {
        println!("\n{kept} files staged ({ignored} ignored)");
    } else {
        println!("\n{kept} files staged");
    }

    Ok(())
}
