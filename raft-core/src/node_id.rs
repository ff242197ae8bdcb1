use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use bytes::BytesMut;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{put_string, Decodable, Encodable, Rlp};
use crate::error::DecodeError;

pub const NODE_ID_LEN: usize = 64;

/// Identity of a node on the p2p network: the 512 bit uncompressed public
/// key of the node, without the leading format byte.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId([u8; NODE_ID_LEN]);

impl NodeId {
    pub fn new(bytes: [u8; NODE_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NODE_ID_LEN] {
        &self.0
    }

    /// First 8 hex digits, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl From<[u8; NODE_ID_LEN]> for NodeId {
    fn from(bytes: [u8; NODE_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for NodeId {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; NODE_ID_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| DecodeError::InvalidLength { expected: NODE_ID_LEN, found: bytes.len() })
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl FromStr for NodeId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != NODE_ID_LEN * 2 {
            return Err(anyhow!("node id must be {} hex digits, got {}", NODE_ID_LEN * 2, digits.len()));
        }
        let mut bytes = [0u8; NODE_ID_LEN];
        hex::decode_to_slice(digits, &mut bytes).context(format!("invalid node id {}", s))?;
        Ok(Self(bytes))
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for NodeId {
    fn rlp_append(&self, out: &mut BytesMut) {
        put_string(out, &self.0);
    }
}

impl Decodable for NodeId {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError> {
        rlp.fixed::<NODE_ID_LEN>().map(Self)
    }
}
