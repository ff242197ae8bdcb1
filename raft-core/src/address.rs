use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::BytesMut;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{decode_bytes, encode_bytes, put_list, put_string, Decodable, Encodable, Rlp};
use crate::discovered_node::DiscoveredNode;
use crate::error::DecodeError;
use crate::node_id::NodeId;

/// Number of fields in the wire form of an [`Address`].
pub const ADDRESS_FIELDS: usize = 5;

/// Identity of a cluster member on both the raft transport and the p2p
/// network.
///
/// The binary form is an RLP list of `(raft_id, node_id, ip, p2p_port,
/// raft_port)` in exactly that order. It is what members exchange when
/// announcing themselves and what gets persisted as cluster configuration,
/// so the field order must not change.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    raft_id: u16,
    node_id: NodeId,
    #[serde(with = "ip_text")]
    ip: Option<IpAddr>,
    p2p_port: u16,
    raft_port: u16,
}

impl Address {
    /// `raft_id` 0 is reserved for unassigned members and must not be passed.
    pub fn new(raft_id: u16, raft_port: u16, node: &DiscoveredNode) -> Self {
        debug_assert_ne!(raft_id, 0, "raft id 0 is reserved");
        Self {
            raft_id,
            node_id: node.id,
            ip: node.ip,
            p2p_port: node.tcp,
            raft_port,
        }
    }

    pub fn raft_id(&self) -> u16 {
        self.raft_id
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn p2p_port(&self) -> u16 {
        self.p2p_port
    }

    pub fn raft_port(&self) -> u16 {
        self.raft_port
    }

    pub fn is_assigned(&self) -> bool {
        self.raft_id != 0
    }

    pub fn consensus_endpoint(&self) -> Option<SocketAddr> {
        self.ip.map(|ip| SocketAddr::new(ip, self.raft_port))
    }

    pub fn p2p_endpoint(&self) -> Option<SocketAddr> {
        self.ip.map(|ip| SocketAddr::new(ip, self.p2p_port))
    }

    /// Url of the raft http transport of this member.
    pub fn raft_url(&self) -> Option<String> {
        self.consensus_endpoint().map(|addr| format!("http://{}", addr))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode_bytes(bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Address({},{}@", self.raft_id, self.node_id.short())?;
        match &self.ip {
            None => write!(f, "-")?,
            Some(IpAddr::V4(ip)) => write!(f, "{}", ip)?,
            Some(IpAddr::V6(ip)) => write!(f, "[{}]", ip)?,
        }
        write!(f, ":{}/{})", self.p2p_port, self.raft_port)
    }
}

/// Text form of the ip in JSON, an unknown ip is the empty string.
mod ip_text {
    use std::net::IpAddr;

    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ip: &Option<IpAddr>, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        match ip {
            None => serializer.serialize_str(""),
            Some(ip) => serializer.collect_str(ip),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<IpAddr>, D::Error> where D: Deserializer<'de> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if !text.is_empty() => text.parse::<IpAddr>().map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

fn put_ip(out: &mut BytesMut, ip: Option<&IpAddr>) {
    match ip {
        None => put_string(out, &[]),
        Some(IpAddr::V4(ip)) => put_string(out, &ip.octets()),
        Some(IpAddr::V6(ip)) => put_string(out, &ip.octets()),
    }
}

fn read_ip(rlp: &mut Rlp<'_>) -> Result<Option<IpAddr>, DecodeError> {
    let bytes = rlp.bytes()?;
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        Ok(Some(IpAddr::V4(Ipv4Addr::from(octets))))
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        Ok(Some(IpAddr::V6(Ipv6Addr::from(octets))))
    } else if bytes.is_empty() {
        Ok(None)
    } else {
        Err(DecodeError::InvalidIpLength(bytes.len()))
    }
}

impl Encodable for Address {
    fn rlp_append(&self, out: &mut BytesMut) {
        put_list(out, |fields| {
            self.raft_id.rlp_append(fields);
            self.node_id.rlp_append(fields);
            put_ip(fields, self.ip.as_ref());
            self.p2p_port.rlp_append(fields);
            self.raft_port.rlp_append(fields);
        });
    }
}

impl Decodable for Address {
    fn rlp_decode(rlp: &mut Rlp<'_>) -> Result<Self, DecodeError> {
        let mut fields = rlp.list()?;
        fields.expect_items(ADDRESS_FIELDS)?;
        let raft_id = fields.u16().map_err(|e| e.in_field("raft_id"))?;
        let node_id = NodeId::rlp_decode(&mut fields).map_err(|e| e.in_field("node_id"))?;
        let ip = read_ip(&mut fields).map_err(|e| e.in_field("ip"))?;
        let p2p_port = fields.u16().map_err(|e| e.in_field("p2p_port"))?;
        let raft_port = fields.u16().map_err(|e| e.in_field("raft_port"))?;
        Ok(Self {
            raft_id,
            node_id,
            ip,
            p2p_port,
            raft_port,
        })
    }
}
