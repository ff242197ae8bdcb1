use std::net::SocketAddr;

use ahash::{HashMap, HashMapExt};
use itertools::Itertools;
use tracing::{debug, info};

use raft_core::{Address, DiscoveredNode, Peer};

/// Connected members keyed by raft id, at most one peer per id.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: HashMap<u16, Peer>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self { peers: HashMap::new() }
    }

    /// Returns the peer previously registered under the same raft id.
    pub fn insert(&mut self, peer: Peer) -> Option<Peer> {
        match self.peers.get(&peer.raft_id()) {
            None => info!("{} joined", peer),
            Some(old) if old != &peer => info!("{} replaced {}", peer, old),
            Some(_) => debug!("{} registered again", peer),
        }
        self.peers.insert(peer.raft_id(), peer)
    }

    pub fn add_member(&mut self, address: Address, node: &DiscoveredNode) -> Option<Peer> {
        self.insert(Peer::from_discovered(address, node))
    }

    pub fn remove(&mut self, raft_id: u16) -> Option<Peer> {
        let removed = self.peers.remove(&raft_id);
        if let Some(peer) = &removed {
            info!("{} removed", peer);
        }
        removed
    }

    pub fn get(&self, raft_id: u16) -> Option<&Peer> {
        self.peers.get(&raft_id)
    }

    pub fn contains(&self, raft_id: u16) -> bool {
        self.peers.contains_key(&raft_id)
    }

    /// Where the raft transport should dial the member with `raft_id`.
    pub fn consensus_endpoint(&self, raft_id: u16) -> Option<SocketAddr> {
        self.get(raft_id).and_then(|peer| peer.address().consensus_endpoint())
    }

    pub fn raft_ids(&self) -> Vec<u16> {
        self.peers.keys().copied().sorted().collect()
    }

    pub fn addresses(&self) -> Vec<&Address> {
        self.peers
            .values()
            .map(Peer::address)
            .sorted_by_key(|a| a.raft_id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
