/// Forward-only reader over a byte slice.
///
/// Every read either consumes exactly the requested bytes or returns `None`
/// and leaves the position unchanged.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_bytes(4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map(i32::from_be_bytes)
    }

    /// Reads an `i32` length followed by that many bytes.
    pub fn read_len_prefixed(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let len = self.read_i32()?;
        let bytes = usize::try_from(len).ok().and_then(|len| self.read_bytes(len));
        if bytes.is_none() {
            self.pos = start;
        }
        bytes
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

/// Appends `bytes` preceded by their length as a big-endian `i32`.
pub fn put_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend(&(bytes.len() as i32).to_be_bytes());
    buf.extend_from_slice(bytes);
}
