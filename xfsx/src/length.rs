//! BER length octets: short form, long form and the indefinite sentinel.

use crate::error::{ErrorKind, Result};

/// Sentinel stored in [`crate::tlv::Tlv::length`] for an indefinite-length
/// constructed value.
pub const INDEFINITE: u32 = u32::MAX;

/// Largest length value representable (31 bits; the top bit is reserved
/// for the `INDEFINITE` sentinel). A length that would exceed this is
/// reported as a length overflow.
pub const MAX_LENGTH: u32 = (1 << 31) - 1;

/// Parse a BER length field, starting at `window[0]`.
///
/// Returns `(length, bytes_consumed, was_non_minimal)`. `length ==
/// INDEFINITE` when the single byte `0x80` is read. Does not validate the
/// decoded length against how much data actually follows — that check
/// needs the identifier size too, so [`crate::header::read_tl`] performs
/// it once both field sizes are known.
pub fn read_length(window: &[u8]) -> Result<(u32, u8, bool)> {
    let first = *window.first().ok_or(ErrorKind::UnexpectedEof)?;
    if first & 0x80 == 0 {
        return Ok((first as u32, 1, false));
    }
    let k = first & 0x7f;
    if k == 0 {
        return Ok((INDEFINITE, 1, false));
    }
    if k > 4 {
        return Err(ErrorKind::LengthOverflow.into());
    }
    let bytes = window
        .get(1..1 + k as usize)
        .ok_or(ErrorKind::UnexpectedEof)?;
    let mut len: u32 = 0;
    for &b in bytes {
        len = (len << 8) | b as u32;
    }
    if len > MAX_LENGTH {
        return Err(ErrorKind::LengthOverflow.into());
    }
    let non_minimal = (k > 1 && bytes[0] == 0) || (k == 1 && len < 0x80);
    Ok((len, 1 + k, non_minimal))
}

/// Number of bytes `write_length` would emit for `length` using the
/// minimal encoding, or `forced_width` bytes of long form when non-zero.
pub fn length_len(length: u32, forced_width: u8) -> Result<usize> {
    if length == INDEFINITE {
        return Ok(1);
    }
    if forced_width == 0 {
        if length < 0x80 {
            return Ok(1);
        }
        return Ok(1 + min_be_width(length));
    }
    if (forced_width as u32) < min_be_width(length) as u32 {
        return Err(ErrorKind::OutOfRange.into());
    }
    Ok(1 + forced_width as usize)
}

/// Encode a BER length field into `out`.
///
/// `forced_width = 0` means minimal encoding. A positive `forced_width`
/// pads the long-form length field to that many bytes, which the caller
/// uses to pre-reserve space before a body's length is known and patch it
/// in afterwards. `length == INDEFINITE` always emits the single byte
/// `0x80` regardless of `forced_width`, which only applies to definite
/// lengths.
pub fn write_length(out: &mut Vec<u8>, length: u32, forced_width: u8) -> Result<()> {
    if length == INDEFINITE {
        out.push(0x80);
        return Ok(());
    }
    if forced_width == 0 {
        if length < 0x80 {
            out.push(length as u8);
            return Ok(());
        }
        let width = min_be_width(length);
        out.push(0x80 | width);
        push_be(out, length, width as usize);
        return Ok(());
    }
    let width = min_be_width(length);
    if forced_width < width {
        return Err(ErrorKind::OutOfRange.into());
    }
    out.push(0x80 | forced_width);
    push_be(out, length, forced_width as usize);
    Ok(())
}

fn min_be_width(v: u32) -> u8 {
    let bits = 32 - v.leading_zeros();
    (bits as u8).div_ceil(8).max(1)
}

fn push_be(out: &mut Vec<u8>, v: u32, width: usize) {
    for i in (0..width).rev() {
        out.push((v >> (i * 8)) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form() {
        let (len, size, non_minimal) = read_length(&[0x05]).unwrap();
        assert_eq!((len, size, non_minimal), (5, 1, false));
    }

    #[test]
    fn indefinite() {
        let (len, size, _) = read_length(&[0x80]).unwrap();
        assert_eq!((len, size), (INDEFINITE, 1));
    }

    #[test]
    fn long_form_round_trip() {
        let mut out = Vec::new();
        write_length(&mut out, 300, 0).unwrap();
        let (len, size, non_minimal) = read_length(&out).unwrap();
        assert_eq!(len, 300);
        assert_eq!(size as usize, out.len());
        assert!(!non_minimal);
    }

    #[test]
    fn forced_width_pads_long_form() {
        let mut out = Vec::new();
        write_length(&mut out, 1, 3).unwrap();
        assert_eq!(out, vec![0x83, 0x00, 0x00, 0x01]);
    }
}
