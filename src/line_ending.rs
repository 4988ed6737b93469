//! Streaming line-ending normalization in front of the tokenizer.
//!
//! Every `CR LF` pair becomes a single `LF`. All other bytes pass through
//! unchanged and in order, including a lone `CR` that is not followed by
//! `LF`. A `CR` ending one read is held back until the next read decides
//! whether it starts a pair, so a pair split across reads still collapses.
//! A `CR` still held at end of stream is dropped.

use std::io::{self, Read};

use memchr::memchr;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// `Read`-Adapter, der `\r\n` zu `\n` normalisiert.
pub struct LineEndingNormalizer<R> {
    inner: R,
    /// Letztes gelesenes Byte war ein CR am Pufferende.
    pending_cr: bool,
    /// Ein Byte, das nach einem aufgeloesten CR noch ausgeliefert werden muss
    /// (nur bei Lese-Puffern der Laenge 1).
    carry: Option<u8>,
}

impl<R: Read> LineEndingNormalizer<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pending_cr: false, carry: None }
    }

    /// Gibt den inneren Reader zurueck. Ein zurueckgehaltenes CR geht verloren.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Degenerate case: a one-byte buffer holding a CR needs one byte of
    /// lookahead from the source.
    fn resolve_cr_one_byte(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut peek = [0u8; 1];
        if self.inner.read(&mut peek)? == 0 {
            return Ok(0);
        }
        if peek[0] == LF {
            buf[0] = LF;
        } else {
            buf[0] = CR;
            self.carry = Some(peek[0]);
        }
        Ok(1)
    }
}

impl<R: Read> Read for LineEndingNormalizer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let prefix = if self.pending_cr { Some(CR) } else { self.carry.take() };
            self.pending_cr = false;

            let mut filled = 0;
            if let Some(b) = prefix {
                buf[0] = b;
                filled = 1;
                if buf.len() == 1 {
                    return if b == CR { self.resolve_cr_one_byte(buf) } else { Ok(1) };
                }
            }

            let n = self.inner.read(&mut buf[filled..])?;
            let eof = n == 0;
            let out = collapse_crlf(&mut buf[..filled + n], eof, &mut self.pending_cr);
            // 0 darf nur am Stream-Ende zurueckgegeben werden
            if out > 0 || eof {
                return Ok(out);
            }
        }
    }
}

/// Compacts `buf` in place and returns the new length.
///
/// A trailing CR is either held in `pending_cr` or, at end of stream, dropped.
fn collapse_crlf(buf: &mut [u8], eof: bool, pending_cr: &mut bool) -> usize {
    let len = buf.len();
    let Some(first_cr) = memchr(CR, buf) else {
        return len;
    };

    let mut read = first_cr;
    let mut write = first_cr;
    while read < len {
        let b = buf[read];
        if b == CR {
            if read + 1 == len {
                if !eof {
                    *pending_cr = true;
                }
                read += 1;
                continue;
            }
            if buf[read + 1] == LF {
                buf[write] = LF;
                write += 1;
                read += 2;
                continue;
            }
        }
        buf[write] = b;
        write += 1;
        read += 1;
    }
    write
}
