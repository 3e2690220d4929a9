//! Session issuance, verification and role derivation.
//!
//! A browser carries up to two independent cookies: a user session and an
//! admin session. [`SessionAuthority::authorize`] folds both into a single
//! [`Principal`]. The caller is admin when either
//!
//! - the admin token verifies with the admin role and has not been revoked, or
//! - the user token verifies and its email equals the configured admin email
//!   (case-insensitive).
//!
//! Every verification failure degrades to "not authenticated".

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{Cache, SessionClaims, TokenService};

const REVOKED_ADMIN_PREFIX: &str = "revoked:admin:";

/// Identity carried by a valid user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// The resolved caller of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub user: Option<SessionUser>,
    pub is_admin: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}

/// Issues and verifies session tokens and derives the caller's role.
pub struct SessionAuthority {
    tokens: Arc<dyn TokenService>,
    revocations: Arc<dyn Cache>,
    admin_email: String,
}

impl SessionAuthority {
    pub fn new(tokens: Arc<dyn TokenService>, revocations: Arc<dyn Cache>, admin_email: &str) -> Self {
        Self {
            tokens,
            revocations,
            admin_email: admin_email.trim().to_lowercase(),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().to_lowercase() == self.admin_email
    }

    pub fn issue_user_session(&self, user: &User) -> Result<String, DomainError> {
        self.tokens
            .issue_user_session(user.id, &user.email)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    pub fn issue_admin_session(&self) -> Result<String, DomainError> {
        self.tokens
            .issue_admin_session()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Resolve both raw cookie values into one principal.
    pub async fn authorize(&self, user_token: Option<&str>, admin_token: Option<&str>) -> Principal {
        let user = user_token.and_then(|t| self.verify_user(t));

        let admin_by_session = match admin_token {
            Some(token) => self.verify_admin(token).await,
            None => false,
        };
        let admin_by_email = user
            .as_ref()
            .is_some_and(|u| self.is_admin_email(&u.email));

        Principal {
            is_admin: admin_by_session || admin_by_email,
            user,
        }
    }

    /// Whether the admin cookie alone establishes an admin session.
    pub async fn has_admin_session(&self, admin_token: Option<&str>) -> bool {
        match admin_token {
            Some(token) => self.verify_admin(token).await,
            None => false,
        }
    }

    /// Revoke a presented admin token until it would have expired anyway.
    ///
    /// Tokens that do not verify as admin sessions are ignored.
    pub async fn revoke_admin(&self, admin_token: &str) {
        let Ok(SessionClaims::Admin { token_id, exp }) = self.tokens.verify(admin_token) else {
            return;
        };
        let remaining = (exp - Utc::now().timestamp()).max(1);
        let key = format!("{REVOKED_ADMIN_PREFIX}{token_id}");
        let ttl = Duration::from_secs(u64::try_from(remaining).unwrap_or(1));

        if let Err(e) = self.revocations.set(&key, "1", Some(ttl)).await {
            tracing::warn!(error = %e, "Failed to record admin token revocation");
        } else {
            tracing::debug!(token_id = %token_id, "Admin session revoked");
        }
    }

    fn verify_user(&self, token: &str) -> Option<SessionUser> {
        match self.tokens.verify(token) {
            Ok(SessionClaims::User { user_id, email, .. }) => Some(SessionUser { id: user_id, email }),
            Ok(SessionClaims::Admin { .. }) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid user session");
                None
            }
        }
    }

    async fn verify_admin(&self, token: &str) -> bool {
        match self.tokens.verify(token) {
            Ok(SessionClaims::Admin { token_id, .. }) => {
                let key = format!("{REVOKED_ADMIN_PREFIX}{token_id}");
                !self.revocations.exists(&key).await
            }
            Ok(SessionClaims::User { .. }) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid admin session");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::ports::{AuthError, Cache, CacheError, SessionClaims, TokenService};

    /// Token service that encodes claims as plain strings.
    pub struct PlainTokens;

    impl TokenService for PlainTokens {
        fn issue_user_session(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
            Ok(format!("user|{user_id}|{email}"))
        }

        fn issue_admin_session(&self) -> Result<String, AuthError> {
            Ok(format!("admin|{}", Uuid::new_v4()))
        }

        fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
            let exp = chrono::Utc::now().timestamp() + 3600;
            let parts: Vec<&str> = token.split('|').collect();
            match parts.as_slice() {
                ["user", id, email] => Ok(SessionClaims::User {
                    user_id: id.parse().map_err(|_| AuthError::InvalidToken("id".into()))?,
                    email: (*email).to_string(),
                    exp,
                }),
                ["admin", jti] => Ok(SessionClaims::Admin {
                    token_id: (*jti).to_string(),
                    exp,
                }),
                ["expired"] => Err(AuthError::TokenExpired),
                _ => Err(AuthError::InvalidToken("malformed".into())),
            }
        }
    }

    /// Minimal cache without expiry.
    #[derive(Default)]
    pub struct MapCache(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        async fn set_tagged(
            &self,
            key: &str,
            value: &str,
            ttl: Option<Duration>,
            _tags: &[&str],
        ) -> Result<(), CacheError> {
            self.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }

        async fn invalidate_tag(&self, _tag: &str) -> Result<(), CacheError> {
            self.0.lock().unwrap().clear();
            Ok(())
        }

        async fn exists(&self, key: &str) -> bool {
            self.0.lock().unwrap().contains_key(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{MapCache, PlainTokens};
    use super::*;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(
            Arc::new(PlainTokens),
            Arc::new(MapCache::default()),
            "Owner@ThriftX.com",
        )
    }

    fn user_token(email: &str) -> String {
        PlainTokens.issue_user_session(Uuid::new_v4(), email).unwrap()
    }

    #[tokio::test]
    async fn test_no_cookies_is_anonymous() {
        let principal = authority().authorize(None, None).await;
        assert_eq!(principal, Principal::anonymous());
    }

    #[tokio::test]
    async fn test_user_session_resolves_identity() {
        let principal = authority()
            .authorize(Some(&user_token("shopper@mail.com")), None)
            .await;
        assert_eq!(principal.user.unwrap().email, "shopper@mail.com");
        assert!(!principal.is_admin);
    }

    #[tokio::test]
    async fn test_admin_email_user_session_is_admin() {
        let principal = authority()
            .authorize(Some(&user_token("owner@thriftx.com")), None)
            .await;
        assert!(principal.is_admin);
    }

    #[tokio::test]
    async fn test_admin_session_alone_is_admin() {
        let auth = authority();
        let admin = auth.issue_admin_session().unwrap();
        let principal = auth.authorize(None, Some(&admin)).await;
        assert!(principal.is_admin);
        assert!(principal.user.is_none());
    }

    #[tokio::test]
    async fn test_admin_session_with_other_user_is_admin() {
        let auth = authority();
        let admin = auth.issue_admin_session().unwrap();
        let principal = auth
            .authorize(Some(&user_token("shopper@mail.com")), Some(&admin))
            .await;
        assert!(principal.is_admin);
    }

    #[tokio::test]
    async fn test_invalid_tokens_degrade_to_anonymous() {
        let principal = authority()
            .authorize(Some("garbage"), Some("expired"))
            .await;
        assert_eq!(principal, Principal::anonymous());
    }

    #[tokio::test]
    async fn test_user_token_in_admin_cookie_is_not_admin() {
        let auth = authority();
        let token = user_token("shopper@mail.com");
        assert!(!auth.has_admin_session(Some(&token)).await);
    }

    #[tokio::test]
    async fn test_revoked_admin_token_is_rejected() {
        let auth = authority();
        let admin = auth.issue_admin_session().unwrap();
        auth.revoke_admin(&admin).await;

        let principal = auth
            .authorize(Some(&user_token("shopper@mail.com")), Some(&admin))
            .await;
        assert!(!principal.is_admin);
        assert!(principal.user.is_some());
    }

    #[test]
    fn test_require_admin() {
        assert!(matches!(
            Principal::anonymous().require_admin(),
            Err(DomainError::Unauthorized)
        ));
        let admin = Principal {
            user: None,
            is_admin: true,
        };
        assert!(admin.require_admin().is_ok());
    }
}
