use std::str::FromStr;

use ahash::{HashSet, HashSetExt};
use anyhow::{anyhow, Context};
use config::{File, FileFormat, Source};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};

use raft_core::{Address, DiscoveredNode};

use crate::MEMBERSHIP_CONFIG;
use crate::peer_table::PeerTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MembershipConfig {
    pub raft_id: u16,
    pub raft_port: u16,
    /// enode url of the local p2p node
    pub node: String,
    pub log_level: String,
    #[serde(default)]
    pub bootstrap: Vec<BootstrapMember>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BootstrapMember {
    pub raft_id: u16,
    pub enode: String,
    pub raft_port: u16,
}

impl BootstrapMember {
    pub fn address(&self) -> anyhow::Result<(Address, DiscoveredNode)> {
        if self.raft_id == 0 {
            return Err(anyhow!("bootstrap member {} has no raft id", self.enode));
        }
        let node: DiscoveredNode = self.enode.parse()?;
        Ok((Address::new(self.raft_id, self.raft_port, &node), node))
    }
}

impl MembershipConfig {
    pub fn builder() -> MembershipConfigBuilder {
        MembershipConfigBuilder::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.raft_id == 0 {
            return Err(anyhow!("raft-id must be assigned, 0 is reserved"));
        }
        let local = self.local_address()?;
        self.log_level()?;
        let mut seen = HashSet::new();
        for member in &self.bootstrap {
            let (address, _) = member.address().context(format!("invalid bootstrap member {}", member.raft_id))?;
            if address.raft_id() == local.raft_id() && address != local {
                return Err(anyhow!("bootstrap member {} conflicts with local {}", address, local));
            }
            if !seen.insert(member.raft_id) {
                return Err(anyhow!("duplicate bootstrap raft id {}", member.raft_id));
            }
        }
        Ok(())
    }

    pub fn local_node(&self) -> anyhow::Result<DiscoveredNode> {
        if self.node.is_empty() {
            return Err(anyhow!("local node enode url is not configured"));
        }
        self.node.parse()
    }

    pub fn local_address(&self) -> anyhow::Result<Address> {
        let node = self.local_node()?;
        Ok(Address::new(self.raft_id, self.raft_port, &node))
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level).context(format!("invalid log-level {}", self.log_level))
    }

    /// Initial peer table: the local member plus every other bootstrap member.
    /// A bootstrap entry for the local raft id matches the local address once
    /// validated.
    pub fn bootstrap_peers(&self) -> anyhow::Result<PeerTable> {
        let mut peers = PeerTable::new();
        let local = self.local_node()?;
        peers.add_member(Address::new(self.raft_id, self.raft_port, &local), &local);
        for member in self.bootstrap.iter().filter(|m| m.raft_id != self.raft_id) {
            let (address, node) = member.address()?;
            peers.add_member(address, &node);
        }
        Ok(peers)
    }
}

/// Layers caller supplied sources over the embedded `membership.toml`.
#[derive(Debug)]
pub struct MembershipConfigBuilder {
    builder: config::ConfigBuilder<DefaultState>,
}

impl Default for MembershipConfigBuilder {
    fn default() -> Self {
        let builder = config::Config::builder()
            .add_source(File::from_str(MEMBERSHIP_CONFIG, FileFormat::Toml));
        Self { builder }
    }
}

impl MembershipConfigBuilder {
    pub fn add_source<T>(self, source: T) -> Self where T: Source + Send + Sync + 'static {
        Self { builder: self.builder.add_source(source) }
    }

    pub fn add_toml(self, toml: &str) -> Self {
        self.add_source(File::from_str(toml, FileFormat::Toml))
    }

    pub fn build(self) -> anyhow::Result<MembershipConfig> {
        let config = self.builder
            .build()?
            .try_deserialize::<MembershipConfig>()
            .context("deserialize membership config")?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use tracing::Level;

    use crate::config::{BootstrapMember, MembershipConfig};

    const NODE_1: &str = "enode://1dd9d65c4552b5eb43d5ad55a2ee3f56c6cbc1c64a5c8d659f51fcd51bace24351232b8d7821617d2b29b54b81cdefb9b3e9c37d7fd5f63270bcc9e1a6f6a439@127.0.0.1:21000";
    const NODE_2: &str = "enode://0ba6b9f606a43a95edc6247cdb1c1e105145817be7bcafd6b2c0ba15d58145f0dc1a194f70ba73cd6f4cdd6864edc7687f311254c7555cc32e4d45aeb1b80416@127.0.0.1:21001?discport=0";
    const NODE_3: &str = "enode://579f786d4e2830bbcc02815a27e8a9bacccc9605df4dc6f20bcc1a6eb391e7225fff7cb83e5b4ecd1f3a94d8b733803f2f66b7e871961e7b029e22c155c3a778@127.0.0.1:21002";

    fn node_toml(raft_id: u16, node: &str) -> String {
        let raft_port = 50400 + raft_id;
        format!(
            r#"
raft-id = {raft_id}
raft-port = {raft_port}
node = "{node}"
log-level = "debug"

[[bootstrap]]
raft-id = 1
enode = "{NODE_1}"
raft-port = 50401

[[bootstrap]]
raft-id = 2
enode = "{NODE_2}"
raft-port = 50402
"#
        )
    }

    #[test]
    fn test_build_with_defaults() -> anyhow::Result<()> {
        let config = MembershipConfig::builder().add_toml(&format!("raft-id = 2\nnode = \"{NODE_2}\"")).build()?;
        assert_eq!(config.raft_id, 2);
        assert_eq!(config.raft_port, 50400);
        assert_eq!(config.log_level()?, Level::INFO);
        assert!(config.bootstrap.is_empty());

        let local = config.local_address()?;
        assert_eq!(local.raft_id(), 2);
        assert_eq!(local.p2p_port(), 21001);
        assert_eq!(local.raft_port(), 50400);

        let config = MembershipConfig::builder().add_toml(&node_toml(2, NODE_2)).build()?;
        assert_eq!(config.log_level()?, Level::DEBUG);
        assert_eq!(config.bootstrap.len(), 2);
        assert_eq!(config.bootstrap[0], BootstrapMember {
            raft_id: 1,
            enode: NODE_1.to_string(),
            raft_port: 50401,
        });
        Ok(())
    }

    #[test]
    fn test_bootstrap_peers() -> anyhow::Result<()> {
        let config = MembershipConfig::builder().add_toml(&node_toml(2, NODE_2)).build()?;
        let peers = config.bootstrap_peers()?;
        assert_eq!(peers.raft_ids(), vec![1, 2]);
        assert_eq!(peers.consensus_endpoint(2), Some("127.0.0.1:50402".parse::<SocketAddr>()?));
        assert_eq!(peers.consensus_endpoint(1), Some("127.0.0.1:50401".parse::<SocketAddr>()?));

        // a member missing from the bootstrap list still lists itself
        let config = MembershipConfig::builder().add_toml(&node_toml(3, NODE_3)).build()?;
        assert_eq!(config.bootstrap_peers()?.raft_ids(), vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_reject_invalid() {
        assert!(MembershipConfig::builder().build().is_err());
        assert!(MembershipConfig::builder().add_toml(&node_toml(0, NODE_2)).build().is_err());
        assert!(MembershipConfig::builder().add_toml(&node_toml(3, "enode://nope@127.0.0.1:1")).build().is_err());

        let duplicated = format!("{}\n[[bootstrap]]\nraft-id = 1\nenode = \"{}\"\nraft-port = 50409\n", node_toml(2, NODE_2), NODE_1);
        assert!(MembershipConfig::builder().add_toml(&duplicated).build().is_err());

        let bad_level = MembershipConfig::builder()
            .add_toml(&node_toml(2, NODE_2))
            .add_toml("log-level = \"loud\"")
            .build();
        assert!(bad_level.is_err());
    }

    #[test]
    fn test_local_bootstrap_entry() -> anyhow::Result<()> {
        let matching = MembershipConfig::builder().add_toml(&node_toml(1, NODE_1)).build()?;
        assert_eq!(matching.bootstrap_peers()?.raft_ids(), vec![1, 2]);
        assert_eq!(matching.bootstrap_peers()?.consensus_endpoint(1), Some("127.0.0.1:50401".parse::<SocketAddr>()?));

        let other_node = MembershipConfig::builder().add_toml(&node_toml(1, NODE_2)).build();
        assert!(other_node.is_err());

        let other_port = MembershipConfig::builder()
            .add_toml(&node_toml(1, NODE_1))
            .add_toml("raft-port = 50999")
            .build();
        assert!(other_port.is_err());
        Ok(())
    }

    #[test]
    fn test_toml_round_trip() -> anyhow::Result<()> {
        let config = MembershipConfig::builder().add_toml(&node_toml(1, NODE_1)).build()?;
        let toml = toml::to_string(&config)?;
        let reloaded = MembershipConfig::builder().add_toml(&toml).build()?;
        assert_eq!(reloaded.bootstrap, config.bootstrap);
        assert_eq!(reloaded.local_address()?, config.local_address()?);
        Ok(())
    }
}
