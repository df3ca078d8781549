use std::io::{self, Read};

/// A reader that can rewind to a marked position within a bounded window.
///
/// Bytes read after [`mark`](Self::mark) are recorded until more than the
/// mark's limit have been consumed; past that point the mark is invalid and
/// [`reset`](Self::reset) fails. Dropping a parser's borrow of this reader
/// never closes the underlying reader: that only happens in
/// [`close`](Self::close).
#[derive(Debug)]
pub struct MarkableReader<R> {
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
    limit: usize,
    marked: bool,
    overflowed: bool,
}

impl<R: Read> MarkableReader<R> {
    /// Wrap `inner`; nothing is recorded until the first `mark`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pos: 0,
            limit: 0,
            marked: false,
            overflowed: false,
        }
    }

    /// Mark the current position, allowing up to `limit` bytes of look-ahead.
    pub fn mark(&mut self, limit: usize) {
        self.buffer.drain(..self.pos);
        self.pos = 0;
        self.limit = limit;
        self.marked = true;
        self.overflowed = self.buffer.len() > limit;
        if self.overflowed {
            self.buffer.clear();
        }
    }

    /// Rewind to the mark.
    pub fn reset(&mut self) -> io::Result<()> {
        if !self.marked {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "reset called without a mark",
            ));
        }
        if self.overflowed {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cannot reset: more than {} bytes read since mark",
                    self.limit
                ),
            ));
        }
        self.pos = 0;
        Ok(())
    }

    /// Bytes consumed since the mark, while the mark is valid.
    pub fn consumed_since_mark(&self) -> Option<usize> {
        (self.marked && !self.overflowed).then_some(self.pos)
    }

    /// Release the underlying reader.
    pub fn close(self) {
        drop(self.inner);
    }
}

impl<R: Read> Read for MarkableReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let n = out.len().min(self.buffer.len() - self.pos);
            out[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }

        let n = self.inner.read(out)?;
        if self.marked && !self.overflowed {
            if self.buffer.len() + n > self.limit {
                self.overflowed = true;
                self.buffer = Vec::new();
                self.pos = 0;
            } else {
                self.buffer.extend_from_slice(&out[..n]);
                self.pos += n;
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::MarkableReader;

    #[test]
    fn reset_replays_bytes_read_since_mark() {
        let mut reader = MarkableReader::new(Cursor::new(b"hello world".to_vec()));
        reader.mark(100);
        let mut first = [0_u8; 5];
        reader.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"hello");
        assert_eq!(reader.consumed_since_mark(), Some(5));

        reader.reset().unwrap();
        let mut all = String::new();
        reader.read_to_string(&mut all).unwrap();
        assert_eq!(all, "hello world");

        reader.reset().unwrap();
        let mut again = String::new();
        reader.read_to_string(&mut again).unwrap();
        assert_eq!(again, "hello world");
    }

    #[test]
    fn reset_fails_after_limit_is_exceeded() {
        let mut reader = MarkableReader::new(Cursor::new(vec![7_u8; 64]));
        reader.mark(16);
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).unwrap();
        assert_eq!(sink.len(), 64);
        assert!(reader.reset().is_err());
        assert_eq!(reader.consumed_since_mark(), None);
    }

    #[test]
    fn reset_without_mark_fails() {
        let mut reader = MarkableReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(reader.reset().is_err());
    }
}
