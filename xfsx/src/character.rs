//! Filename-field validation, ported from `xfsx/character.cc`
//! (gsauthof/libxfsx): persisted-filename fields reject slashes and
//! control characters with [`ErrorKind::RangeError`].

use crate::error::{ErrorKind, Result};

/// Reject `s` if it contains a `/` or a byte outside the printable ASCII
/// range `0x20..=0x7e` (this also catches `\n`, `\r` and NUL).
pub fn verify_filename_part(s: &str) -> Result<()> {
    let ok = s
        .bytes()
        .all(|c| (0x20..=0x7e).contains(&c) && c != b'/');
    if ok {
        Ok(())
    } else {
        Err(ErrorKind::RangeError.into())
    }
}
