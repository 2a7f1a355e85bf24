//! Subcommand implementations. Each one is a thin adapter: parse `bed`'s
//! CLI-level arguments into `xfsx` types, call into the library, write the
//! result. None of these carry BER/XML semantics of their own.

mod aci;
mod edit;
mod pretty;
mod search;
mod validate;
mod write_ber;

pub use aci::{compute_aci, write_aci};
pub use edit::edit;
pub use pretty::pretty_write_xml;
pub use search::search;
pub use validate::validate;
pub use write_ber::{write_ber, write_def, write_id, write_indef};

use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `output`, or to stdout when `output` is `None`.
pub(crate) fn emit(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
        }
        None => {
            std::io::stdout().write_all(bytes)?;
        }
    }
    Ok(())
}

/// Map a file read-only via `xfsx`'s scratchpad `MappedReader`, returning
/// its backing bytes for a one-shot, whole-file parse.
pub(crate) fn read_whole_file(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
