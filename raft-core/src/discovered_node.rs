use std::net::IpAddr;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use url::{Host, Url};

use crate::node_id::NodeId;

pub const ENODE_SCHEME: &str = "enode";

/// Node record handed out by p2p discovery.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DiscoveredNode {
    pub id: NodeId,
    pub ip: Option<IpAddr>,
    pub udp: u16,
    pub tcp: u16,
}

impl DiscoveredNode {
    pub fn new(id: NodeId, ip: Option<IpAddr>, udp: u16, tcp: u16) -> Self {
        Self { id, ip, udp, tcp }
    }
}

/// Parses `enode://<hex node id>@<ip>:<tcp port>[?discport=<udp port>]`.
impl FromStr for DiscoveredNode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).context(format!("invalid enode url {}", s))?;
        if url.scheme() != ENODE_SCHEME {
            return Err(anyhow!("unexpected scheme {} in enode url {}", url.scheme(), s));
        }
        let id = url.username().parse::<NodeId>().context(format!("invalid node id in enode url {}", s))?;
        let ip = match url.host().ok_or(anyhow!("no host found in enode url {}", s))? {
            Host::Ipv4(ip) => IpAddr::V4(ip),
            Host::Ipv6(ip) => IpAddr::V6(ip),
            Host::Domain(domain) => domain.parse::<IpAddr>().context(format!("host of enode url {} is not an ip", s))?,
        };
        let tcp = url.port().ok_or(anyhow!("no port found in enode url {}", s))?;
        let udp = match url.query_pairs().find(|(key, _)| key == "discport") {
            Some((_, port)) => port.parse::<u16>().context(format!("invalid discport in enode url {}", s))?,
            None => tcp,
        };
        Ok(Self { id, ip: Some(ip), udp, tcp })
    }
}

#[cfg(test)]
mod test {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::discovered_node::DiscoveredNode;
    use crate::node_id::NodeId;

    const ID: &str = "1dd9d65c4552b5eb43d5ad55a2ee3f56c6cbc1c64a5c8d659f51fcd51bace24351232b8d7821617d2b29b54b81cdefb9b3e9c37d7fd5f63270bcc9e1a6f6a439";

    #[test]
    fn test_parse_enode() -> anyhow::Result<()> {
        let node: DiscoveredNode = format!("enode://{}@10.3.58.6:30303?discport=30301", ID).parse()?;
        assert_eq!(node.id, ID.parse::<NodeId>()?);
        assert_eq!(node.ip, Some(IpAddr::V4(Ipv4Addr::new(10, 3, 58, 6))));
        assert_eq!(node.tcp, 30303);
        assert_eq!(node.udp, 30301);

        let node: DiscoveredNode = format!("enode://{}@[::1]:30304", ID).parse()?;
        assert_eq!(node.ip, Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(node.udp, 30304);
        Ok(())
    }

    #[test]
    fn test_reject_bad_enode() {
        assert!(format!("http://{}@10.3.58.6:30303", ID).parse::<DiscoveredNode>().is_err());
        assert!(format!("enode://{}@10.3.58.6", ID).parse::<DiscoveredNode>().is_err());
        assert!("enode://abcd@10.3.58.6:30303".parse::<DiscoveredNode>().is_err());
        assert!(format!("enode://{}@10.0.0.1:30303", "+1".repeat(64)).parse::<DiscoveredNode>().is_err());
        assert!(format!("enode://{}@example.org:30303", ID).parse::<DiscoveredNode>().is_err());
    }
}
