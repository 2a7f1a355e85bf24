//! Memory-mapped read-only backing: `advance` is pointer arithmetic and
//! nothing is ever evicted, since the whole file is already resident.

use super::Reader;
use crate::error::{ErrorKind, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// A [`Reader`] backed by a read-only `mmap` of an entire file.
pub struct MappedReader {
    map: Mmap,
    pos: u64,
}

impl MappedReader {
    /// Map `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is only ever read; concurrent external
        // truncation of the backing file is the caller's problem, same
        // contract every mmap-based reader in the ecosystem carries.
        let map = unsafe { Mmap::map(&file)? };
        Ok(MappedReader { map, pos: 0 })
    }
}

impl Reader for MappedReader {
    fn window(&self) -> (u64, u64) {
        (self.pos, self.map.len() as u64)
    }

    fn slice(&self) -> &[u8] {
        &self.map[self.pos as usize..]
    }

    fn next(&mut self, n: usize) -> Result<()> {
        if self.pos as usize + n > self.map.len() {
            return Err(ErrorKind::UnexpectedEof.into());
        }
        Ok(())
    }

    fn advance(&mut self, k: usize) -> Result<()> {
        let new_pos = self.pos as usize + k;
        if new_pos > self.map.len() {
            return Err(ErrorKind::UnexpectedEof.into());
        }
        self.pos = new_pos as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }
}
