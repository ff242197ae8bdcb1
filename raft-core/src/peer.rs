use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::BuildHasher;

use crate::address::Address;
use crate::discovered_node::DiscoveredNode;
use crate::node_id::NodeId;

/// Lookup of live p2p nodes, owned by the p2p subsystem.
pub trait NodeRegistry {
    type Node;

    fn node(&self, id: &NodeId) -> Option<&Self::Node>;
}

impl<N, S> NodeRegistry for HashMap<NodeId, N, S> where S: BuildHasher {
    type Node = N;

    fn node(&self, id: &NodeId) -> Option<&Self::Node> {
        self.get(id)
    }
}

/// A member we are connected to via both the raft transport and the p2p
/// network. The p2p node is only referenced by id, its lifecycle belongs to
/// the p2p subsystem.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Peer {
    address: Address,
    p2p_node: NodeId,
}

impl Peer {
    pub fn new(address: Address, p2p_node: NodeId) -> Self {
        Self { address, p2p_node }
    }

    pub fn from_discovered(address: Address, node: &DiscoveredNode) -> Self {
        Self::new(address, node.id)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn raft_id(&self) -> u16 {
        self.address.raft_id()
    }

    pub fn node_id(&self) -> &NodeId {
        &self.p2p_node
    }

    pub fn p2p_node<'r, R>(&self, registry: &'r R) -> Option<&'r R::Node> where R: NodeRegistry {
        registry.node(&self.p2p_node)
    }

    pub fn into_address(self) -> Address {
        self.address
    }
}

impl Display for Peer {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Peer({})", self.address)
    }
}
