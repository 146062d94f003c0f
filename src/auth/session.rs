use std::io::ErrorKind;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::claims::{decode_identity_token, IdentityClaims};
use super::store::{StoredSession, TokenStore};
use crate::error::{ClientError, ClientResult};
use crate::http::CancelToken;
use crate::rbac::{PermissionResolver, PermissionSet};

/// Tokens issued by the identity provider after sign-in
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    pub id_token: String,
}

/// Where a role's permission strings come from at login
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn role_permissions(
        &self,
        role: &str,
        access_token: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Vec<String>>;
}

/// An authenticated session. Created on login, immutable for its lifetime,
/// discarded on logout.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
    id_token: String,
    claims: IdentityClaims,
    permissions: PermissionSet,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new<I, S>(tokens: Tokens, permissions: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if tokens.access_token.trim().is_empty() {
            return Err(ClientError::Token("access token is empty".to_string()));
        }
        let claims = decode_identity_token(&tokens.id_token)?;

        Ok(Self {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            claims,
            permissions: PermissionSet::from_strings(permissions),
            started_at: Utc::now(),
        })
    }

    fn from_stored(stored: StoredSession) -> ClientResult<Self> {
        let mut session = Self::new(
            Tokens {
                access_token: stored.access_token,
                id_token: stored.id_token,
            },
            stored.permissions,
        )?;
        session.started_at = stored.stored_at;
        Ok(session)
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            access_token: self.access_token.clone(),
            id_token: self.id_token.clone(),
            permissions: self.permissions.to_strings(),
            stored_at: self.started_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn role(&self) -> &str {
        &self.claims.role
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(&self.permissions)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_expired(&self) -> bool {
        self.claims.is_expired(Utc::now())
    }
}

/// Owns the session lifecycle against a token store: init-on-login,
/// restore-on-start, clear-on-logout.
#[derive(Debug)]
pub struct SessionManager<S: TokenStore> {
    store: S,
}

impl<S: TokenStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a session from provider tokens. The identity token is decoded
    /// first so a bad token fails before any request is made; the role's
    /// permission list is then fetched once and persisted with the tokens.
    pub async fn login<P>(&self, tokens: Tokens, source: &P, cancel: &CancelToken) -> ClientResult<Session>
    where
        P: PermissionSource + ?Sized,
    {
        let claims = decode_identity_token(&tokens.id_token)?;
        let permissions = source
            .role_permissions(&claims.role, &tokens.access_token, cancel)
            .await?;

        let session = Session::new(tokens, permissions)?;
        if !session.permissions().rejected().is_empty() {
            tracing::warn!(
                "role '{}' carries {} unrecognised permission(s); they grant nothing",
                session.role(),
                session.permissions().rejected().len()
            );
        }

        self.store.save(&session.to_stored())?;
        tracing::info!(
            "session started for '{}' with role '{}' ({} permissions)",
            session.username(),
            session.role(),
            session.permissions().len()
        );
        Ok(session)
    }

    /// Reload the persisted session. A corrupt session file, or a stored
    /// session whose tokens no longer decode, is cleared rather than returned.
    pub fn restore(&self) -> ClientResult<Option<Session>> {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(ClientError::Storage(e)) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!("discarding unreadable stored session: {}", e);
                self.store.clear()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match Session::from_stored(stored) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("discarding unreadable stored session: {}", e);
                self.store.clear()?;
                Ok(None)
            }
        }
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.store.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_tokens;
    use crate::auth::store::MemoryTokenStore;
    use crate::rbac::Resource;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticRoles {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionSource for StaticRoles {
        async fn role_permissions(
            &self,
            role: &str,
            access_token: &str,
            _cancel: &CancelToken,
        ) -> ClientResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(access_token, "access-1");
            match role {
                "Default" => Ok(vec!["workspaces.view".to_string()]),
                "Admin" => Ok(vec!["workspaces.fullaccess".to_string(), "roles.fulaccess".to_string()]),
                other => Err(ClientError::NotFound(format!("role {other}"))),
            }
        }
    }

    fn tokens(role: Option<&str>) -> Tokens {
        let mut claims = json!({ "cognito:username": "ada", "sub": "u-1", "email": "ada@example.com" });
        if let Some(role) = role {
            claims["custom:role"] = json!(role);
        }
        Tokens {
            access_token: "access-1".to_string(),
            id_token: test_tokens::sign(&claims),
        }
    }

    #[tokio::test]
    async fn test_login_fetches_permissions_and_persists() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        let roles = StaticRoles { calls: AtomicUsize::new(0) };

        let session = manager
            .login(tokens(None), &roles, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(session.role(), "Default");
        assert!(session.resolver().can_view(Resource::Workspaces));
        assert!(!session.resolver().can_manage(Resource::Workspaces));
        assert_eq!(roles.calls.load(Ordering::SeqCst), 1);

        let restored = manager.restore().unwrap().unwrap();
        assert_eq!(restored.username(), "ada");
        assert_eq!(restored.permissions(), session.permissions());
        // Restoring does not go back to the role source
        assert_eq!(roles.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_permission_strings_are_dropped() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        let roles = StaticRoles { calls: AtomicUsize::new(0) };
        let session = manager
            .login(tokens(Some("Admin")), &roles, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(session.permissions().rejected(), &["roles.fulaccess".to_string()]);
        assert!(!session.resolver().can_view(Resource::Roles));

        let stored = manager.store().load().unwrap().unwrap();
        assert_eq!(stored.permissions, vec!["workspaces.fullaccess".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        let roles = StaticRoles { calls: AtomicUsize::new(0) };

        let result = manager
            .login(tokens(Some("Ghost")), &roles, &CancelToken::new())
            .await;
        assert!(matches!(result, Err(ClientError::NotFound(_))));

        let bad = Tokens {
            access_token: "access-1".to_string(),
            id_token: "garbage".to_string(),
        };
        assert!(matches!(
            manager.login(bad, &roles, &CancelToken::new()).await,
            Err(ClientError::Token(_))
        ));
        assert_eq!(roles.calls.load(Ordering::SeqCst), 1);
        assert!(manager.restore().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_and_bad_store_is_discarded() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        let roles = StaticRoles { calls: AtomicUsize::new(0) };
        manager.login(tokens(None), &roles, &CancelToken::new()).await.unwrap();
        manager.logout().unwrap();
        assert!(manager.restore().unwrap().is_none());

        manager
            .store()
            .save(&StoredSession {
                access_token: "a".to_string(),
                id_token: "broken".to_string(),
                permissions: vec![],
                stored_at: Utc::now(),
            })
            .unwrap();
        assert!(manager.restore().unwrap().is_none());
        assert!(manager.store().load().unwrap().is_none());
    }
}
