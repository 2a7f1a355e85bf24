//! Tag-path search: locate a sub-tree by absolute or relative tag path
//! without materializing the tree or reading primitive contents.

use crate::error::Result;
use crate::tlv::Cursor;

/// `0` matches any single tag at that position in the path.
pub const WILDCARD: u32 = 0;

/// Scan `input` for the first TLV whose ancestor-chain tail matches
/// `path`. For a relative path, only the trailing tags need to match; for
/// an absolute path, the current depth must equal `path.len()` and every
/// tag from the root must match.
///
/// Returns the byte offset of the matching TLV's identifier, or `None` if
/// no match is found before the input is exhausted. The current tag
/// counts as the path's last element, so a one-element path matches the
/// TLV itself, not just its parent chain.
pub fn search(input: &[u8], path: &[u32], relative: bool) -> Result<Option<usize>> {
    let mut cursor = Cursor::new(input);
    'outer: while cursor.advance()? {
        if crate::tlv::is_eoc(cursor.header().unwrap()) {
            continue;
        }
        let depth = cursor.depth();
        let current_tag = cursor.header().unwrap().tag;

        if !relative && depth + 1 != path.len() {
            continue;
        }
        if relative && path.len() > depth + 1 {
            continue;
        }

        // Build the full chain root..=current, then compare its tail
        // (length == path.len()) against path with wildcard semantics.
        let mut chain: Vec<u32> = cursor.ancestor_tags().map(|(_, t)| t).collect();
        chain.push(current_tag);
        let tail = &chain[chain.len() - path.len()..];
        for (want, got) in path.iter().zip(tail.iter()) {
            if *want != WILDCARD && want != got {
                continue 'outer;
            }
        }
        return Ok(Some(cursor.offset()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::write_tl;
    use crate::tag::TagClass;

    fn nested_app_tags(tags: &[u32]) -> Vec<u8> {
        // Build tags[0] { tags[1] { ... { tags[last] primitive } } }
        fn build(tags: &[u32]) -> Vec<u8> {
            if tags.len() == 1 {
                let mut out = write_tl(TagClass::Application, tags[0], false, 1, 0).unwrap();
                out.push(0xAB);
                out
            } else {
                let child = build(&tags[1..]);
                let mut out =
                    write_tl(TagClass::Application, tags[0], true, child.len() as u32, 0).unwrap();
                out.extend(child);
                out
            }
        }
        build(tags)
    }

    #[test]
    fn absolute_and_relative_paths_agree() {
        let bytes = nested_app_tags(&[64, 63, 15]);
        let abs = search(&bytes, &[64, 63, 15], false).unwrap();
        let rel = search(&bytes, &[15], true).unwrap();
        assert!(abs.is_some());
        assert_eq!(abs, rel);
    }

    #[test]
    fn wildcard_matches_any_single_tag() {
        // Root tagged 1 (mirroring TAP's TRANSFER_BATCH), child tagged 15.
        let bytes = nested_app_tags(&[1, 15]);
        let by_exact = search(&bytes, &[1, 15], false).unwrap();
        let by_wild = search(&bytes, &[0, 15], false).unwrap();
        assert!(by_exact.is_some());
        assert_eq!(by_exact, by_wild);
    }

    #[test]
    fn no_match_returns_none() {
        let bytes = nested_app_tags(&[64, 63, 15]);
        assert_eq!(search(&bytes, &[64, 63, 1], false).unwrap(), None);
    }

    #[test]
    fn absolute_path_matches_the_node_at_that_exact_depth() {
        let bytes = nested_app_tags(&[64, 63, 62]);
        // path.len() == 3 requires depth == 2: the innermost (primitive) node.
        let found = search(&bytes, &[64, 63, 62], false).unwrap().unwrap();
        assert!(found > 0, "leaf is nested, not at offset 0");
        // path.len() == 1 at depth == 0 must hit the outermost node instead.
        let root = search(&bytes, &[64], false).unwrap();
        assert_eq!(root, Some(0));
    }
}
