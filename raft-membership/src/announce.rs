use anyhow::{anyhow, Context};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use raft_core::{Address, DecodeError};
use raft_core::ext::read_u32;

pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// An address announcement read off the raft transport.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Inbound {
    Accepted(Address),
    /// The frame was intact but its body is not a valid address. The stream
    /// stays usable; the sender should be told its message was rejected.
    Rejected { error: DecodeError, len: usize },
}

/// Frames encoded addresses with a big endian u32 length prefix.
#[derive(Debug, Default)]
pub struct AnnouncementCodec;

impl<'a> Encoder<&'a Address> for AnnouncementCodec {
    type Error = anyhow::Error;

    fn encode(&mut self, item: &'a Address, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = item.to_bytes();
        let len = u32::try_from(body.len()).context("announcement too large")?;
        dst.reserve(4 + body.len());
        dst.put_u32(len);
        dst.put_slice(&body);
        Ok(())
    }
}

impl Decoder for AnnouncementCodec {
    type Item = Inbound;
    type Error = anyhow::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let buf_len = src.len();
        if buf_len < 4 {
            return Ok(None);
        }
        let body_len = read_u32(src, 0) as usize;
        if body_len > MAX_FRAME_LEN {
            return Err(anyhow!("announcement frame of {} bytes exceeds limit {}", body_len, MAX_FRAME_LEN));
        }
        if body_len > buf_len - 4 {
            src.reserve(4 + body_len - buf_len);
            return Ok(None);
        }
        src.advance(4);
        let body = src.split_to(body_len);
        let inbound = match Address::from_bytes(&body) {
            Ok(address) => Inbound::Accepted(address),
            Err(error) => {
                warn!("reject announcement of {} bytes: {}", body_len, error);
                Inbound::Rejected { error, len: body_len }
            }
        };
        Ok(Some(inbound))
    }
}
