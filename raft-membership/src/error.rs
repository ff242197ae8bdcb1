use thiserror::Error;

use raft_core::DecodeError;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("stored address of raft id {raft_id} is corrupted")]
    Corrupted {
        raft_id: u16,
        #[source]
        source: DecodeError,
    },
    #[error("address stored under raft id {key} belongs to raft id {stored}")]
    Mismatch { key: u16, stored: u16 },
    #[error("malformed address key {0:?}")]
    MalformedKey(Vec<u8>),
    #[error("cannot store an address without an assigned raft id")]
    Unassigned,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
