//! Shared wire types for the livesync client and any server speaking its protocol.

pub mod models;
pub mod protocol;
pub mod error;

pub use models::*;
pub use protocol::*;
pub use error::*;
