pub const MEMBERSHIP_CONFIG: &'static str = include_str!("../membership.toml");

pub mod address_book;
pub mod announce;
pub mod config;
pub mod error;
pub mod peer_table;
pub mod store;
