//! TL (tag + length) headers: the part of a TLV read before its value.

use crate::error::{ErrorKind, Result};
use crate::length::{self, INDEFINITE};
use crate::tag::{self, TagClass};

/// Upper bound on `tl_size`: identifier (1 + 5 long-form digits) plus
/// length (1 + 4 long-form bytes, since our length is `u32`-backed).
/// Larger headers are rejected as malformed.
pub const MAX_TL_SIZE: u8 = 1 + 5 + 1 + 4;

/// A decoded TL header: everything about a TLV except its value bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub class: TagClass,
    pub tag: u32,
    pub constructed: bool,
    /// `INDEFINITE` for an indefinite-length constructed value.
    pub length: u32,
    /// Bytes consumed by the identifier + length fields.
    pub tl_size: u8,
}

impl Header {
    /// Is this header's length indefinite?
    pub fn is_indefinite(&self) -> bool {
        self.length == INDEFINITE
    }
}

/// Decode one TL header starting at `window[0]`.
///
/// `window` is the full remaining input; the header's length field is
/// checked against `window.len() - tl_size` so an over-long value can
/// never be claimed. `strict` rejects non-minimal tag/length encodings.
pub fn read_tl(window: &[u8], strict: bool) -> Result<Header> {
    let (class, constructed, t, id_size) = tag::read_identifier(window)?;
    if strict && tag::is_non_minimal_tag(window) {
        return Err(ErrorKind::Malformed.into());
    }
    let len_window = window
        .get(id_size as usize..)
        .ok_or(ErrorKind::UnexpectedEof)?;
    let (len, len_size, non_minimal) = length::read_length(len_window)?;
    if strict && non_minimal {
        return Err(ErrorKind::Malformed.into());
    }
    let tl_size = id_size + len_size;
    if tl_size > MAX_TL_SIZE {
        return Err(ErrorKind::Malformed.into());
    }
    let remaining_after_tl = window.len() - tl_size as usize;
    if len != INDEFINITE && len as usize > remaining_after_tl {
        return Err(ErrorKind::LengthOverflow.into());
    }
    Ok(Header {
        class,
        tag: t,
        constructed,
        length: len,
        tl_size,
    })
}

/// Encode a TL header. `forced_len_width = 0` means minimal.
pub fn write_tl(
    class: TagClass,
    tag_num: u32,
    constructed: bool,
    length: u32,
    forced_len_width: u8,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(8);
    tag::write_identifier(&mut out, class, constructed, tag_num)?;
    length::write_length(&mut out, length, forced_len_width)?;
    Ok(out)
}

/// Number of bytes `write_tl` would emit, without allocating.
pub fn tl_len(tag_num: u32, length: u32, forced_len_width: u8) -> Result<usize> {
    Ok(tag::identifier_len(tag_num)? + length::length_len(length, forced_len_width)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definite_round_trip() {
        let tl = write_tl(TagClass::Application, 12, true, 7, 0).unwrap();
        let mut full = tl.clone();
        full.extend_from_slice(&[0u8; 7]);
        let header = read_tl(&full, false).unwrap();
        assert_eq!(header.class, TagClass::Application);
        assert_eq!(header.tag, 12);
        assert!(header.constructed);
        assert_eq!(header.length, 7);
        assert_eq!(header.tl_size as usize, tl.len());
    }

    #[test]
    fn indefinite_header() {
        let tl = write_tl(TagClass::Universal, 16, true, INDEFINITE, 0).unwrap();
        assert_eq!(tl, vec![0x30, 0x80]);
        let header = read_tl(&tl, false).unwrap();
        assert!(header.is_indefinite());
    }

    #[test]
    fn length_exceeding_remainder_fails() {
        let mut tl = write_tl(TagClass::Context, 1, false, 5, 0).unwrap();
        tl.extend_from_slice(&[0u8; 4]); // one byte short of the claimed 5
        assert_eq!(
            read_tl(&tl, false).unwrap_err().kind(),
            ErrorKind::LengthOverflow
        );
    }
}
