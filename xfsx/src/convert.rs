//! Length-form conversion directly over BER bytes — definite to
//! indefinite, indefinite to definite, and re-encoding with minimal TL
//! headers. Purely structural — no grammar is needed, since nothing here
//! depends on element names or content types.

use crate::error::Result;
use crate::header;
use crate::length::INDEFINITE;
use crate::tlv;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Mode {
    Definite,
    Indefinite,
    /// Re-encode every TL header with a minimal-width length field,
    /// leaving each constructed value's definite/indefinite choice as it
    /// was in the input.
    Minimal,
}

/// Force every constructed value's length to definite form.
pub fn to_definite(input: &[u8]) -> Result<Vec<u8>> {
    rewrite_all(input, Mode::Definite)
}

/// Force every constructed value's length to indefinite form.
pub fn to_indefinite(input: &[u8]) -> Result<Vec<u8>> {
    rewrite_all(input, Mode::Indefinite)
}

/// Re-encode every TL header with a minimal-width length field, without
/// changing any value's definite/indefinite choice.
pub fn to_minimal(input: &[u8]) -> Result<Vec<u8>> {
    rewrite_all(input, Mode::Minimal)
}

fn rewrite_all(input: &[u8], mode: Mode) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let (consumed, bytes) = rewrite_one(input, pos, mode)?;
        out.extend(bytes);
        pos += consumed;
    }
    Ok(out)
}

/// Rewrite the TLV starting at `input[start..]`, returning the number of
/// input bytes it spanned and its rewritten encoding.
fn rewrite_one(input: &[u8], start: usize, mode: Mode) -> Result<(usize, Vec<u8>)> {
    let header = header::read_tl(&input[start..], false)?;
    let tl_size = header.tl_size as usize;
    let content_start = start + tl_size;

    if !header.constructed {
        let len = header.length as usize;
        let value = &input[content_start..content_start + len];
        let mut out = header::write_tl(header.class, header.tag, false, header.length, 0)?;
        out.extend_from_slice(value);
        return Ok((tl_size + len, out));
    }

    let mut body = Vec::new();
    let mut pos = content_start;
    let was_indefinite = header.length == INDEFINITE;

    if was_indefinite {
        loop {
            let h = header::read_tl(&input[pos..], false)?;
            if tlv::is_eoc(&h) {
                pos += h.tl_size as usize;
                break;
            }
            let (consumed, child) = rewrite_one(input, pos, mode)?;
            body.extend(child);
            pos += consumed;
        }
    } else {
        let end = content_start + header.length as usize;
        while pos < end {
            let (consumed, child) = rewrite_one(input, pos, mode)?;
            body.extend(child);
            pos += consumed;
        }
    }

    let make_indefinite = match mode {
        Mode::Definite => false,
        Mode::Indefinite => true,
        Mode::Minimal => was_indefinite,
    };

    let mut out = if make_indefinite {
        let mut out = header::write_tl(header.class, header.tag, true, INDEFINITE, 0)?;
        out.extend(body);
        out.extend([0x00, 0x00]);
        out
    } else {
        let mut out = header::write_tl(header.class, header.tag, true, body.len() as u32, 0)?;
        out.extend(body);
        out
    };
    out.shrink_to_fit();
    Ok((pos - start, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::write_tl;
    use crate::tag::TagClass;

    fn definite_sequence() -> Vec<u8> {
        let mut inner = write_tl(TagClass::Context, 1, false, 1, 0).unwrap();
        inner.push(0x2a);
        let mut out = write_tl(TagClass::Universal, 16, true, inner.len() as u32, 0).unwrap();
        out.extend(inner);
        out
    }

    #[test]
    fn definite_to_indefinite_round_trips_back_to_definite() {
        let original = definite_sequence();
        let indef = to_indefinite(&original).unwrap();
        assert_eq!(header::read_tl(&indef, false).unwrap().length, INDEFINITE);
        let back = to_definite(&indef).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn conversion_is_idempotent() {
        let original = definite_sequence();
        let once = to_indefinite(&original).unwrap();
        let twice = to_indefinite(&once).unwrap();
        assert_eq!(once, twice);

        let once = to_definite(&once).unwrap();
        let twice = to_definite(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn minimal_shrinks_a_padded_length_field() {
        let mut inner = write_tl(TagClass::Context, 1, false, 1, 0).unwrap();
        inner.push(0x2a);
        // Force a 3-byte long-form length field where 1 byte would do.
        let mut out = write_tl(TagClass::Universal, 16, true, inner.len() as u32, 3).unwrap();
        out.extend(inner);
        assert_eq!(out[1], 0x83);

        let minimal = to_minimal(&out).unwrap();
        let header = header::read_tl(&minimal, false).unwrap();
        assert_eq!(header.tl_size, 2); // 1 identifier + 1 short-form length byte
    }
}
