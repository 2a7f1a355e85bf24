//! Streamed backing: chunked reads/writes against a file (or any
//! `Read`/`Write` sink), evicting bytes before the prelude as the cursor
//! advances past them.

use super::{Reader, Writer};
use crate::error::{ErrorKind, Result};
use std::io::{Read, Write as IoWrite};

const DEFAULT_CHUNK: usize = 64 * 1024;

/// A [`Reader`] that pulls fixed-size chunks from any [`Read`] sink,
/// evicting consumed bytes from the front of its buffer.
pub struct StreamedReader<R> {
    sink: R,
    buf: Vec<u8>,
    /// Absolute position of `buf[0]`.
    base: u64,
    /// Offset into `buf` of the cursor.
    cursor: usize,
    chunk: usize,
    eof: bool,
}

impl<R: Read> StreamedReader<R> {
    pub fn new(sink: R) -> Self {
        Self::with_chunk_size(sink, DEFAULT_CHUNK)
    }

    pub fn with_chunk_size(sink: R, chunk: usize) -> Self {
        StreamedReader {
            sink,
            buf: Vec::new(),
            base: 0,
            cursor: 0,
            chunk,
            eof: false,
        }
    }

    fn fill_more(&mut self) -> Result<usize> {
        if self.eof {
            return Ok(0);
        }
        let start = self.buf.len();
        self.buf.resize(start + self.chunk, 0);
        let mut total = 0;
        loop {
            match self.sink.read(&mut self.buf[start + total..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    total += n;
                    if total == self.chunk {
                        break;
                    }
                }
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e.into());
                }
            }
        }
        self.buf.truncate(start + total);
        Ok(total)
    }

    fn evict_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.buf.drain(0..self.cursor);
            self.base += self.cursor as u64;
            self.cursor = 0;
        }
    }
}

impl<R: Read> Reader for StreamedReader<R> {
    fn window(&self) -> (u64, u64) {
        (self.base + self.cursor as u64, self.base + self.buf.len() as u64)
    }

    fn slice(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    fn next(&mut self, n: usize) -> Result<()> {
        while self.buf.len() - self.cursor < n {
            if self.fill_more()? == 0 {
                return Err(ErrorKind::UnexpectedEof.into());
            }
        }
        Ok(())
    }

    fn advance(&mut self, k: usize) -> Result<()> {
        self.next(k)?;
        self.cursor += k;
        self.evict_before_cursor();
        Ok(())
    }

    fn position(&self) -> u64 {
        self.base + self.cursor as u64
    }
}

/// A [`Writer`] that buffers writes and flushes full chunks to any
/// [`std::io::Write`] sink once the buffer exceeds `increment`.
pub struct StreamedWriter<W> {
    sink: W,
    buf: Vec<u8>,
    increment: usize,
    flushed: u64,
}

impl<W: IoWrite> StreamedWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_increment(sink, DEFAULT_CHUNK)
    }

    pub fn with_increment(sink: W, increment: usize) -> Self {
        StreamedWriter {
            sink,
            buf: Vec::new(),
            increment,
            flushed: 0,
        }
    }
}

impl<W: IoWrite> Writer for StreamedWriter<W> {
    fn obtain_chunk(&mut self, n: usize) -> Result<&mut [u8]> {
        if n == 0 {
            return Err(ErrorKind::InvalidArgument.into());
        }
        if self.buf.len() + n > self.increment {
            self.flush()?;
        }
        let start = self.buf.len();
        self.buf.resize(start + n, 0);
        Ok(&mut self.buf[start..])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buf.len() + bytes.len() > self.increment {
            self.flush()?;
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.sink.write_all(&self.buf)?;
        self.flushed += self.buf.len() as u64;
        self.buf.clear();
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.flushed + self.buf.len() as u64
    }
}

impl<W: IoWrite> Drop for StreamedWriter<W> {
    fn drop(&mut self) {
        // A drop without an explicit flush still flushes, but any I/O
        // error here is necessarily swallowed.
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_in_chunks_and_evicts() {
        let data = b"abcdefghij".to_vec();
        let mut r = StreamedReader::with_chunk_size(Cursor::new(data), 4);
        r.next(3).unwrap();
        assert_eq!(&r.slice()[..3], b"abc");
        r.advance(3).unwrap();
        assert_eq!(r.position(), 3);
        r.next(5).unwrap();
        assert_eq!(&r.slice()[..5], b"defgh");
    }

    #[test]
    fn next_past_eof_fails() {
        let mut r = StreamedReader::new(Cursor::new(b"ab".to_vec()));
        assert!(r.next(3).is_err());
    }

    #[test]
    fn writer_flushes_once_increment_exceeded() {
        let mut out = Vec::new();
        {
            let mut w = StreamedWriter::with_increment(&mut out, 4);
            w.write(b"ab").unwrap();
            w.write(b"cd").unwrap();
            w.write(b"ef").unwrap(); // exceeds increment, triggers a flush first
            w.flush().unwrap();
        }
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn drop_without_explicit_flush_still_flushes() {
        let mut out = Vec::new();
        {
            let mut w = StreamedWriter::new(&mut out);
            w.write(b"xyz").unwrap();
        }
        assert_eq!(out, b"xyz");
    }
}
