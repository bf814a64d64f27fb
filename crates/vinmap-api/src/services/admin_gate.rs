//! Shared-password admin gate with short-lived session tokens.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use vinmap_core::{Error, Result};

const TOKEN_BYTES: usize = 32;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct AdminToken {
    pub token: String,
    pub expires_in: Duration,
}

/// Verifies the admin password and tracks live session tokens.
#[derive(Clone)]
pub struct AdminGate {
    inner: Arc<AdminGateInner>,
}

struct AdminGateInner {
    password_hash: Option<String>,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Instant>>,
}

/// Lowercase hex SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl AdminGate {
    /// Create a gate. With no hash configured every login is refused.
    pub fn new(password_hash: Option<String>, ttl: Duration) -> Self {
        let password_hash = password_hash
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty());
        Self {
            inner: Arc::new(AdminGateInner {
                password_hash,
                ttl,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.password_hash.is_some()
    }

    /// Check the password and issue a session token.
    pub async fn login(&self, password: &str) -> Result<AdminToken> {
        let Some(expected) = self.inner.password_hash.as_deref() else {
            warn!(
                subsystem = "api",
                component = "admin_gate",
                op = "login",
                "Admin login refused, no password hash configured"
            );
            return Err(Error::Unauthorized("Admin login is disabled".to_string()));
        };

        if hash_password(password) != expected {
            warn!(
                subsystem = "api",
                component = "admin_gate",
                op = "login",
                "Admin login rejected"
            );
            return Err(Error::Unauthorized("Invalid password".to_string()));
        }

        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = Instant::now();
        let mut sessions = self.inner.sessions.write().await;
        sessions.retain(|_, expires| *expires > now);
        sessions.insert(token.clone(), now + self.inner.ttl);

        info!(
            subsystem = "api",
            component = "admin_gate",
            op = "login",
            active_sessions = sessions.len(),
            "Admin session issued"
        );
        Ok(AdminToken {
            token,
            expires_in: self.inner.ttl,
        })
    }

    /// Accept a live token; expired or unknown tokens are unauthorized.
    pub async fn verify(&self, token: &str) -> Result<()> {
        let now = Instant::now();
        let expires = self.inner.sessions.read().await.get(token).copied();
        match expires {
            Some(at) if at > now => Ok(()),
            Some(_) => {
                self.inner.sessions.write().await.remove(token);
                debug!(
                    subsystem = "api",
                    component = "admin_gate",
                    "Admin session expired"
                );
                Err(Error::Unauthorized("Admin session expired".to_string()))
            }
            None => Err(Error::Unauthorized("Invalid admin session".to_string())),
        }
    }

    /// Revoke a token. Returns whether it was live.
    pub async fn logout(&self, token: &str) -> bool {
        self.inner.sessions.write().await.remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(ttl: Duration) -> AdminGate {
        AdminGate::new(Some(hash_password("cellar")), ttl)
    }

    #[test]
    fn test_hash_password_is_lowercase_hex() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_configured_hash_is_normalized() {
        let upper = hash_password("cellar").to_ascii_uppercase();
        assert!(AdminGate::new(Some(format!(" {} ", upper)), Duration::from_secs(60)).is_configured());
        assert!(!AdminGate::new(Some("  ".to_string()), Duration::from_secs(60)).is_configured());
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let gate = gate(Duration::from_secs(60));
        let session = gate.login("cellar").await.unwrap();

        assert_eq!(session.token.len(), TOKEN_BYTES * 2);
        assert_eq!(session.expires_in, Duration::from_secs(60));
        gate.verify(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let gate = gate(Duration::from_secs(60));
        assert!(matches!(
            gate.login("corkscrew").await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_gate_refuses_everything() {
        let gate = AdminGate::new(None, Duration::from_secs(60));
        assert!(gate.login("").await.is_err());
        assert!(gate.login("cellar").await.is_err());
    }

    #[tokio::test]
    async fn test_tokens_are_distinct() {
        let gate = gate(Duration::from_secs(60));
        let a = gate.login("cellar").await.unwrap();
        let b = gate.login("cellar").await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let gate = gate(Duration::from_millis(10));
        let session = gate.login("cellar").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(matches!(
            gate.verify(&session.token).await,
            Err(Error::Unauthorized(ref m)) if m == "Admin session expired"
        ));
        // Expired entries are dropped on first sight.
        assert!(!gate.logout(&session.token).await);
    }

    #[tokio::test]
    async fn test_logout_revokes() {
        let gate = gate(Duration::from_secs(60));
        let session = gate.login("cellar").await.unwrap();

        assert!(gate.logout(&session.token).await);
        assert!(gate.verify(&session.token).await.is_err());
        assert!(!gate.logout(&session.token).await);
    }
}
