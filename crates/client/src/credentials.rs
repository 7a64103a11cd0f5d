//! Credential suppliers.
//!
//! The sync core never authenticates on its own. It asks a
//! [`CredentialSupplier`] for the local user id and a bearer token every time
//! it (re)connects, so a token refreshed by the host application is picked
//! up on the next attempt.
//!
//! [`FileCredentials`] reads the session the host persisted at sign-in from
//! a JSON file in the platform-appropriate config directory:
//!   - Linux: `~/.config/livesync/session.json`
//!   - macOS: `~/Library/Application Support/livesync/session.json`
//!   - Windows: `%APPDATA%\livesync\session.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "livesync";
const SESSION_FILE: &str = "session.json";

pub trait CredentialSupplier: Send + Sync {
    /// Stable identifier of the signed-in user
    fn user_id(&self) -> Option<String>;

    /// A bearer token valid for the realtime endpoint
    fn bearer_token(&self) -> Option<String>;

    /// User id and token taken from one read, so the pair always belongs
    /// to the same sign-in. `None` unless both are present.
    fn credentials(&self) -> Option<(String, String)> {
        Some((self.user_id()?, self.bearer_token()?))
    }
}

/// Credentials held in memory, e.g. handed over by an embedding application.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    user_id: Option<String>,
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            token: Some(token.into()),
        }
    }

    /// No signed-in user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A user id without a usable token
    pub fn without_token(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            token: None,
        }
    }
}

impl CredentialSupplier for StaticCredentials {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Persisted session data
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user_id: String,
    pub token: String,
}

/// Reads `session.json` on every call; never caches.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside the platform config directory.
    pub fn default_location() -> Option<Self> {
        let dir = dirs::config_dir()?.join(APP_DIR);
        Some(Self::new(dir.join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session.
    ///
    /// Returns `None` if the file doesn't exist or can't be parsed.
    pub fn load(&self) -> Option<StoredSession> {
        let json = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&json).ok()
    }

    /// Persist a session (called by the host after sign-in).
    pub fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(session)?;
        std::fs::write(&self.path, json)
    }

    /// Remove the stored session (sign-out). A missing file is not an error.
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

impl CredentialSupplier for FileCredentials {
    fn user_id(&self) -> Option<String> {
        self.load().and_then(|s| non_blank(s.user_id))
    }

    fn bearer_token(&self) -> Option<String> {
        self.load().and_then(|s| non_blank(s.token))
    }

    fn credentials(&self) -> Option<(String, String)> {
        let session = self.load()?;
        Some((non_blank(session.user_id)?, non_blank(session.token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_credentials() -> FileCredentials {
        let path = std::env::temp_dir()
            .join(format!("livesync-test-{}", uuid::Uuid::new_v4()))
            .join(SESSION_FILE);
        FileCredentials::new(path)
    }

    #[test]
    fn missing_file_yields_nothing() {
        let creds = temp_credentials();
        assert!(creds.user_id().is_none());
        assert!(creds.bearer_token().is_none());
    }

    #[test]
    fn save_then_read_back() {
        let creds = temp_credentials();
        creds
            .save(&StoredSession {
                user_id: "u1".to_string(),
                token: "t1".to_string(),
            })
            .unwrap();

        assert_eq!(creds.user_id().as_deref(), Some("u1"));
        assert_eq!(creds.bearer_token().as_deref(), Some("t1"));

        creds.clear().unwrap();
        assert!(creds.user_id().is_none());
        // already gone
        creds.clear().unwrap();
    }

    #[test]
    fn token_is_reread_on_every_call() {
        let creds = temp_credentials();
        creds
            .save(&StoredSession {
                user_id: "u1".to_string(),
                token: "old".to_string(),
            })
            .unwrap();
        assert_eq!(creds.bearer_token().as_deref(), Some("old"));

        creds
            .save(&StoredSession {
                user_id: "u1".to_string(),
                token: "rotated".to_string(),
            })
            .unwrap();
        assert_eq!(creds.bearer_token().as_deref(), Some("rotated"));
        creds.clear().unwrap();
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let creds = temp_credentials();
        creds
            .save(&StoredSession {
                user_id: "u1".to_string(),
                token: "  ".to_string(),
            })
            .unwrap();
        assert!(creds.bearer_token().is_none());
        creds.clear().unwrap();
    }

    #[test]
    fn pair_comes_from_a_single_read() {
        let creds = temp_credentials();
        assert!(creds.credentials().is_none());

        creds
            .save(&StoredSession {
                user_id: "u1".to_string(),
                token: "t1".to_string(),
            })
            .unwrap();
        assert_eq!(
            creds.credentials(),
            Some(("u1".to_string(), "t1".to_string()))
        );

        creds
            .save(&StoredSession {
                user_id: "u2".to_string(),
                token: " ".to_string(),
            })
            .unwrap();
        assert!(creds.credentials().is_none());
        creds.clear().unwrap();
    }

    #[test]
    fn static_credentials() {
        assert!(StaticCredentials::anonymous().user_id().is_none());
        assert!(StaticCredentials::without_token("u1").bearer_token().is_none());
        assert_eq!(StaticCredentials::new("u1", "t").user_id().as_deref(), Some("u1"));
        assert!(StaticCredentials::without_token("u1").credentials().is_none());
    }
}
