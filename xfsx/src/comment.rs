//! A generic "splice out the bits between delimiters" scanner, ported
//! from `xfsx/comment.{hh,cc}` (gsauthof/libxfsx). The original is a C++
//! class template parametrized over a delimiter style; here that becomes
//! a trait plus marker types, used by the edit pipeline to find comments
//! when preserving them across a round-trip.

/// A pair of delimiter strings, e.g. `<!--` / `-->`.
pub trait Style {
    const OPEN: &'static str;
    const CLOSE: &'static str;
}

pub mod style {
    use super::Style;

    /// XML comments: `<!-- ... -->`.
    pub struct Xml;
    impl Style for Xml {
        const OPEN: &'static str = "<!--";
        const CLOSE: &'static str = "-->";
    }

    /// Dash-delimited comments: `-- ... --`.
    pub struct Dash;
    impl Style for Dash {
        const OPEN: &'static str = "--";
        const CLOSE: &'static str = "--";
    }

    /// C-style block comments: `/* ... */`.
    pub struct C;
    impl Style for C {
        const OPEN: &'static str = "/*";
        const CLOSE: &'static str = "*/";
    }
}

/// Splits `text` into the fragments that lie *outside* every
/// `S::OPEN ... S::CLOSE` span, in order.
///
/// An unterminated trailing open delimiter discards everything from that
/// open delimiter onward (matching the original's iterator, which stops
/// advancing once `search` can no longer find a close delimiter).
pub fn split_outside<S: Style>(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = text;
    loop {
        match rest.find(S::OPEN) {
            None => {
                // An empty remainder here means we're exactly at the end
                // of the text (possibly right after a comment's closing
                // delimiter) — nothing to yield, matching the original's
                // iterator comparing equal to its own end sentinel.
                if !rest.is_empty() {
                    out.push(rest);
                }
                break;
            }
            Some(open_at) => {
                out.push(&rest[..open_at]);
                let after_open = &rest[open_at + S::OPEN.len()..];
                match after_open.find(S::CLOSE) {
                    None => break,
                    Some(close_at) => {
                        rest = &after_open[close_at + S::CLOSE.len()..];
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_comment_fragments() {
        let text = "<!-- ignore -->Hello<!----><!-- --> <!-- -->foo bar<!-- -->";
        let fragments = split_outside::<style::Xml>(text);
        assert_eq!(fragments, vec!["", "Hello", "", " ", "foo bar"]);
    }

    #[test]
    fn no_comments_is_one_fragment() {
        assert_eq!(split_outside::<style::Xml>("plain text"), vec!["plain text"]);
    }

    #[test]
    fn c_style_delimiters() {
        let fragments = split_outside::<style::C>("a/*x*/b/*y*/c");
        assert_eq!(fragments, vec!["a", "b", "c"]);
    }
}
