use std::cmp::Ordering;

use crate::codec::header::Header;
use crate::error::DecodeError;

/// Cursor over a sequence of RLP items.
#[derive(Debug, Copy, Clone)]
pub struct Rlp<'a> {
    buf: &'a [u8],
}

impl<'a> Rlp<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn next_item(&mut self) -> Result<(Header, &'a [u8]), DecodeError> {
        let header = Header::decode(self.buf)?;
        let end = header.header_len
            .checked_add(header.payload_len)
            .ok_or(DecodeError::SizeOverflow)?;
        if end > self.buf.len() {
            return Err(DecodeError::InputTooShort { needed: end, remaining: self.buf.len() });
        }
        let payload = &self.buf[header.header_len..end];
        self.buf = &self.buf[end..];
        Ok((header, payload))
    }

    /// Reads a byte string item.
    pub fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let (header, payload) = self.next_item()?;
        if header.list {
            return Err(DecodeError::ExpectedString);
        }
        Ok(payload)
    }

    /// Reads a list item and returns a cursor over its elements.
    pub fn list(&mut self) -> Result<Rlp<'a>, DecodeError> {
        let (header, payload) = self.next_item()?;
        if !header.list {
            return Err(DecodeError::ExpectedList);
        }
        Ok(Rlp::new(payload))
    }

    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.bytes()?;
        <[u8; N]>::try_from(bytes).map_err(|_| DecodeError::InvalidLength { expected: N, found: bytes.len() })
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        self.uint(2).map(|v| v as u16)
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        self.uint(8)
    }

    fn uint(&mut self, width: usize) -> Result<u64, DecodeError> {
        let bytes = self.bytes()?;
        if bytes.len() > width {
            return Err(DecodeError::IntegerOverflow { width });
        }
        if bytes.first() == Some(&0) {
            return Err(DecodeError::NonCanonicalInteger);
        }
        Ok(bytes.iter().fold(0u64, |v, b| (v << 8) | *b as u64))
    }

    pub fn item_count(&self) -> Result<usize, DecodeError> {
        let mut rlp = *self;
        let mut count = 0;
        while !rlp.is_empty() {
            rlp.next_item()?;
            count += 1;
        }
        Ok(count)
    }

    pub fn expect_items(&self, expected: usize) -> Result<(), DecodeError> {
        let found = self.item_count()?;
        match found.cmp(&expected) {
            Ordering::Less => Err(DecodeError::TooFewElements { expected, found }),
            Ordering::Greater => Err(DecodeError::TooManyElements { expected, found }),
            Ordering::Equal => Ok(()),
        }
    }

    /// Fails if anything is left after the decoded value.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.buf.len()))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::codec::reader::Rlp;
    use crate::error::DecodeError;

    #[test]
    fn test_read_items() -> anyhow::Result<()> {
        // ["cat", 0x0400, ""]
        let input = [0xc8, 0x83, b'c', b'a', b't', 0x82, 0x04, 0x00, 0x80];
        let mut rlp = Rlp::new(&input);
        let mut list = rlp.list()?;
        rlp.finish()?;
        assert_eq!(list.item_count()?, 3);
        assert_eq!(list.bytes()?, b"cat");
        assert_eq!(list.u16()?, 0x0400);
        assert_eq!(list.bytes()?, b"");
        assert!(list.is_empty());
        Ok(())
    }

    #[test]
    fn test_integers() -> anyhow::Result<()> {
        assert_eq!(Rlp::new(&[0x80]).u16()?, 0);
        assert_eq!(Rlp::new(&[0x05]).u16()?, 5);
        assert_eq!(Rlp::new(&[0x81, 0x80]).u16()?, 0x80);
        assert_eq!(Rlp::new(&[0x00]).u16(), Err(DecodeError::NonCanonicalInteger));
        assert_eq!(Rlp::new(&[0x82, 0x00, 0x01]).u16(), Err(DecodeError::NonCanonicalInteger));
        assert_eq!(Rlp::new(&[0x83, 0x01, 0x00, 0x00]).u16(), Err(DecodeError::IntegerOverflow { width: 2 }));
        assert_eq!(Rlp::new(&[0x83, 0x01, 0x00, 0x00]).u64()?, 0x010000);
        Ok(())
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(Rlp::new(&[0xc0]).bytes(), Err(DecodeError::ExpectedString));
        assert_eq!(Rlp::new(&[0x80]).list().err(), Some(DecodeError::ExpectedList));
        assert_eq!(Rlp::new(&[0x82, 0x01, 0x02]).fixed::<4>(), Err(DecodeError::InvalidLength { expected: 4, found: 2 }));
        assert_eq!(Rlp::new(&[0x83, 0x01]).bytes(), Err(DecodeError::InputTooShort { needed: 4, remaining: 2 }));
    }

    #[test]
    fn test_arity() -> anyhow::Result<()> {
        let input = [0xc2, 0x01, 0x02];
        let list = Rlp::new(&input).list()?;
        assert_eq!(list.expect_items(3), Err(DecodeError::TooFewElements { expected: 3, found: 2 }));
        assert_eq!(list.expect_items(1), Err(DecodeError::TooManyElements { expected: 1, found: 2 }));
        list.expect_items(2)?;
        Ok(())
    }
}
