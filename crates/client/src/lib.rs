//! livesync client - realtime synchronization core
//!
//! This crate keeps a live channel to the sync server and folds what
//! arrives on it (messages, notifications, conversation summaries and
//! presence) into local state, and sends the user's actions back.
//!
//! Start with [`SyncSession`].

pub mod config;
pub mod credentials;
pub mod router;
pub mod session;
pub mod stores;
pub mod ws;

pub use config::SyncConfig;
pub use credentials::{CredentialSupplier, FileCredentials, StaticCredentials, StoredSession};
pub use session::{SyncSession, SyncUpdate};
pub use stores::{StoreChange, SyncStore};
pub use ws::{ConnectionState, ReconnectConfig, TransportKind};
