use std::mem::size_of;

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;

pub(crate) const STRING_OFFSET: u8 = 0x80;
pub(crate) const LIST_OFFSET: u8 = 0xc0;
/// Payloads up to this length carry their size in the prefix byte.
pub(crate) const SHORT_PAYLOAD_MAX: usize = 55;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Header {
    pub(crate) list: bool,
    pub(crate) payload_len: usize,
    /// zero for a single byte below 0x80, which is its own encoding
    pub(crate) header_len: usize,
}

impl Header {
    pub(crate) fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let prefix = *buf.first().ok_or(DecodeError::InputTooShort { needed: 1, remaining: 0 })?;
        match prefix {
            0x00..=0x7f => Ok(Self { list: false, payload_len: 1, header_len: 0 }),
            0x80..=0xb7 => {
                let payload_len = (prefix - STRING_OFFSET) as usize;
                if payload_len == 1 {
                    let byte = *buf.get(1).ok_or(DecodeError::InputTooShort { needed: 2, remaining: buf.len() })?;
                    if byte < STRING_OFFSET {
                        return Err(DecodeError::NonCanonicalSize);
                    }
                }
                Ok(Self { list: false, payload_len, header_len: 1 })
            }
            0xb8..=0xbf => Self::decode_long(buf, false, (prefix - 0xb7) as usize),
            0xc0..=0xf7 => Ok(Self { list: true, payload_len: (prefix - LIST_OFFSET) as usize, header_len: 1 }),
            0xf8..=0xff => Self::decode_long(buf, true, (prefix - 0xf7) as usize),
        }
    }

    fn decode_long(buf: &[u8], list: bool, len_of_len: usize) -> Result<Self, DecodeError> {
        let header_len = 1 + len_of_len;
        if buf.len() < header_len {
            return Err(DecodeError::InputTooShort { needed: header_len, remaining: buf.len() });
        }
        let len_bytes = &buf[1..header_len];
        if len_bytes[0] == 0 {
            return Err(DecodeError::NonCanonicalSize);
        }
        if len_of_len > size_of::<usize>() {
            return Err(DecodeError::SizeOverflow);
        }
        let payload_len = len_bytes.iter().fold(0usize, |len, b| (len << 8) | *b as usize);
        if payload_len <= SHORT_PAYLOAD_MAX {
            return Err(DecodeError::NonCanonicalSize);
        }
        Ok(Self { list, payload_len, header_len })
    }

    pub(crate) fn encode(list: bool, payload_len: usize, out: &mut BytesMut) {
        let offset = if list { LIST_OFFSET } else { STRING_OFFSET };
        if payload_len <= SHORT_PAYLOAD_MAX {
            out.put_u8(offset + payload_len as u8);
        } else {
            let be = payload_len.to_be_bytes();
            let len_bytes = &be[leading_zeros(&be)..];
            out.put_u8(offset + SHORT_PAYLOAD_MAX as u8 + len_bytes.len() as u8);
            out.put_slice(len_bytes);
        }
    }
}

pub(crate) fn leading_zeros(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| **b == 0).count()
}
