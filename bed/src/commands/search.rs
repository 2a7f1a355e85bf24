use crate::cli::SearchArgs;
use anyhow::{bail, Result};

/// Parse a tag-path expression: a comma-separated list of tag numbers
/// (`0` = wildcard), optionally prefixed with `/` for an absolute path.
pub fn parse_tag_path(expr: &str) -> Result<(Vec<u32>, bool)> {
    let relative = !expr.starts_with('/');
    let body = expr.trim_start_matches('/');
    if body.is_empty() {
        bail!("empty tag-path expression");
    }
    let path = body
        .split(',')
        .map(|s| s.trim().parse::<u32>().map_err(|_| anyhow::anyhow!("bad tag number {s:?} in {expr:?}")))
        .collect::<Result<Vec<u32>>>()?;
    Ok((path, relative))
}

/// `search`: print the byte offset of the first match, or nothing (exit
/// code 1) if no match is found.
pub fn search(args: &SearchArgs) -> Result<()> {
    let input = super::read_whole_file(&args.input)?;
    let (path, relative) = parse_tag_path(&args.expr)?;
    match xfsx::search::search(&input, &path, relative)? {
        Some(offset) => println!("{offset}"),
        None => anyhow::bail!("no match for {:?}", args.expr),
    }
    Ok(())
}
