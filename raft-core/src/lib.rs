pub mod address;
pub mod codec;
pub mod discovered_node;
pub mod error;
pub mod ext;
pub mod node_id;
pub mod peer;

pub use address::Address;
pub use discovered_node::DiscoveredNode;
pub use error::DecodeError;
pub use node_id::NodeId;
pub use peer::{NodeRegistry, Peer};
