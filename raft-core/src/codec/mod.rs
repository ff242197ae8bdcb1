//! Recursive Length Prefix encoding.
//!
//! Every value is either a byte string or a list of values, each carrying its
//! own length prefix. The encoding of a given value is unique, so encoded
//! bytes can be compared directly or used as storage keys.

use bytes::{BufMut, BytesMut};

use crate::codec::header::{leading_zeros, Header, STRING_OFFSET};
pub use crate::codec::reader::Rlp;
use crate::error::DecodeError;

mod header;
mod reader;

pub trait Encodable {
    fn rlp_append(&self, out: &mut BytesMut);
}

pub trait Decodable: Sized {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError>;
}

pub fn encode_bytes<T>(value: &T) -> Vec<u8> where T: Encodable + ?Sized {
    let mut out = BytesMut::new();
    value.rlp_append(&mut out);
    out.to_vec()
}

/// Decodes exactly one value, rejecting any trailing input.
pub fn decode_bytes<T>(bytes: &[u8]) -> Result<T, DecodeError> where T: Decodable {
    let mut rlp = Rlp::new(bytes);
    let value = T::rlp_decode(&mut rlp)?;
    rlp.finish()?;
    Ok(value)
}

pub fn put_string(out: &mut BytesMut, bytes: &[u8]) {
    match bytes {
        [byte] if *byte < STRING_OFFSET => out.put_u8(*byte),
        _ => {
            Header::encode(false, bytes.len(), out);
            out.put_slice(bytes);
        }
    }
}

pub fn put_uint(out: &mut BytesMut, value: u64) {
    let be = value.to_be_bytes();
    put_string(out, &be[leading_zeros(&be)..]);
}

/// Writes a list whose payload is produced by `f`.
pub fn put_list<F>(out: &mut BytesMut, f: F) where F: FnOnce(&mut BytesMut) {
    let mut payload = BytesMut::new();
    f(&mut payload);
    Header::encode(true, payload.len(), out);
    out.put_slice(&payload);
}

impl Encodable for u16 {
    fn rlp_append(&self, out: &mut BytesMut) {
        put_uint(out, *self as u64);
    }
}

impl Encodable for u64 {
    fn rlp_append(&self, out: &mut BytesMut) {
        put_uint(out, *self);
    }
}

impl Encodable for [u8] {
    fn rlp_append(&self, out: &mut BytesMut) {
        put_string(out, self);
    }
}

impl Decodable for u16 {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError> {
        rlp.u16()
    }
}

impl Decodable for u64 {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError> {
        rlp.u64()
    }
}

impl Decodable for Vec<u8> {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError> {
        rlp.bytes().map(|b| b.to_vec())
    }
}
