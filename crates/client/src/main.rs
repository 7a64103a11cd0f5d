//! livesync - headless sync client
//!
//! Connects with the session stored by the host application and logs
//! every update until interrupted.

use anyhow::Context;
use livesync_client::{FileCredentials, StoreChange, SyncConfig, SyncSession, SyncUpdate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("livesync_client=debug,livesync=debug")),
        )
        .init();

    let config = SyncConfig::from_env().context("invalid configuration")?;
    let credentials =
        FileCredentials::default_location().context("no config directory on this platform")?;
    tracing::info!("Reading session from {}", credentials.path().display());

    let mut session = SyncSession::new(config, credentials);
    session.connect();
    if session.local_user().is_none() {
        anyhow::bail!("not signed in: no session found");
    }

    loop {
        tokio::select! {
            update = session.next_update() => match update {
                Some(SyncUpdate::Connection(state)) => tracing::info!("connection: {:?}", state),
                Some(SyncUpdate::Store(changes)) => log_changes(&session, &changes),
                None => {
                    tracing::warn!("Channel stopped: {:?}", session.state());
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    session.close();
    Ok(())
}

fn log_changes(session: &SyncSession, changes: &[StoreChange]) {
    let store = session.store();
    for change in changes {
        match change {
            StoreChange::Messages => {
                tracing::info!("messages: {}", store.messages().len())
            }
            StoreChange::Notifications => tracing::info!(
                "notifications: {} ({} unread)",
                store.notifications().len(),
                store.unread_notification_count()
            ),
            StoreChange::Conversations => {
                tracing::info!("conversations: {}", store.conversations().len())
            }
            StoreChange::Presence => {
                tracing::info!("online: {:?}", store.online_users())
            }
        }
    }
}
