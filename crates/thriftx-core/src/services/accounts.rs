//! Signup and login for site accounts and the configured admin.

use std::sync::Arc;

use crate::domain::{EmailAddress, User, mask_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

use super::session::SessionAuthority;

const MIN_PASSWORD_LEN: usize = 8;

/// Environment-configured admin login (there is no admin table).
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Tokens produced by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub user_token: String,
    /// Present only when the account's email is the configured admin email.
    /// When absent, any admin cookie on the client must be cleared.
    pub admin_token: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    sessions: Arc<SessionAuthority>,
    admin: AdminCredentials,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        sessions: Arc<SessionAuthority>,
        admin: AdminCredentials,
    ) -> Self {
        Self {
            users,
            passwords,
            sessions,
            admin,
        }
    }

    /// Register a new account. Emails are unique case-insensitively.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation("Email and password required"));
        }
        let email = EmailAddress::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(email.as_str()).await?.is_some() {
            return Err(DomainError::Conflict("Email already in use".to_string()));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let masked = email.masked();
        let user = self
            .users
            .insert(User::new(email, password_hash))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => DomainError::Conflict("Email already in use".to_string()),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, user_email = %masked, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a user session, plus an admin session when
    /// the account is the configured admin. A previously held admin token is
    /// revoked once the credentials check out.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        stale_admin_token: Option<&str>,
    ) -> Result<LoginSession, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation("Email and password required"));
        }
        let normalized = email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(user_email = %mask_email(&normalized), "Password mismatch");
            return Err(DomainError::Unauthorized);
        }

        if let Some(token) = stale_admin_token {
            self.sessions.revoke_admin(token).await;
        }

        let user_token = self.sessions.issue_user_session(&user)?;
        let admin_token = if self.sessions.is_admin_email(&user.email) {
            Some(self.sessions.issue_admin_session()?)
        } else {
            None
        };

        tracing::info!(
            user_id = %user.id,
            admin = admin_token.is_some(),
            "User logged in"
        );

        Ok(LoginSession {
            user,
            user_token,
            admin_token,
        })
    }

    /// Check the configured admin username/password and issue an admin session.
    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
        stale_admin_token: Option<&str>,
    ) -> Result<String, DomainError> {
        if username != self.admin.username || password != self.admin.password {
            tracing::warn!("Rejected admin login attempt");
            return Err(DomainError::Unauthorized);
        }

        if let Some(token) = stale_admin_token {
            self.sessions.revoke_admin(token).await;
        }

        tracing::info!("Admin logged in");
        self.sessions.issue_admin_session()
    }

    /// End the session, revoking the admin token if one is presented.
    pub async fn logout(&self, admin_token: Option<&str>) {
        if let Some(token) = admin_token {
            self.sessions.revoke_admin(token).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::ports::{AuthError, BaseRepository};
    use crate::services::session::test_support::{MapCache, PlainTokens};

    #[derive(Default)]
    struct Users(Mutex<HashMap<Uuid, User>>);

    #[async_trait]
    impl BaseRepository<User, Uuid> for Users {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, user: User) -> Result<User, RepoError> {
            self.0.lock().unwrap().insert(user.id, user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User, RepoError> {
            self.insert(user).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.0.lock().unwrap().remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl UserRepository for Users {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            let users = self.0.lock().unwrap();
            Ok(users.values().find(|u| u.email == email).cloned())
        }
    }

    /// Stores passwords reversed; good enough to tell right from wrong.
    struct ReversedPasswords;

    impl PasswordService for ReversedPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(password.chars().rev().collect())
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(password.chars().rev().collect::<String>() == hash)
        }
    }

    fn accounts() -> (AccountService, Arc<SessionAuthority>) {
        let sessions = Arc::new(SessionAuthority::new(
            Arc::new(PlainTokens),
            Arc::new(MapCache::default()),
            "owner@thriftx.com",
        ));
        let service = AccountService::new(
            Arc::new(Users::default()),
            Arc::new(ReversedPasswords),
            sessions.clone(),
            AdminCredentials {
                username: "admin".to_string(),
                password: "secret".to_string(),
            },
        );
        (service, sessions)
    }

    #[tokio::test]
    async fn test_signup_normalizes_and_rejects_duplicates() {
        let (accounts, _) = accounts();
        let user = accounts.signup(" New@Mail.com ", "password1").await.unwrap();
        assert_eq!(user.email, "new@mail.com");

        let again = accounts.signup("NEW@mail.com", "password2").await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_signup_validates_input() {
        let (accounts, _) = accounts();
        for (email, password) in [("", "password1"), ("a@b.com", ""), ("nope", "password1"), ("a@b.com", "short")] {
            assert!(
                matches!(
                    accounts.signup(email, password).await,
                    Err(DomainError::Validation(_))
                ),
                "{email:?} / {password:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_email_is_unauthorized() {
        let (accounts, _) = accounts();
        accounts.signup("a@b.com", "password1").await.unwrap();

        let wrong = accounts.login("a@b.com", "password2", None).await;
        assert!(matches!(wrong, Err(DomainError::Unauthorized)));

        let unknown = accounts.login("x@b.com", "password1", None).await;
        assert!(matches!(unknown, Err(DomainError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_admin_email_login_issues_admin_token() {
        let (accounts, sessions) = accounts();
        accounts.signup("Owner@ThriftX.com", "password1").await.unwrap();

        let session = accounts.login("owner@thriftx.com", "password1", None).await.unwrap();
        let admin = session.admin_token.expect("admin token");
        assert!(sessions.has_admin_session(Some(&admin)).await);
    }

    #[tokio::test]
    async fn test_regular_login_revokes_presented_admin_token() {
        let (accounts, sessions) = accounts();
        let stale = accounts.admin_login("admin", "secret", None).await.unwrap();
        accounts.signup("shopper@mail.com", "password1").await.unwrap();

        let session = accounts
            .login("shopper@mail.com", "password1", Some(&stale))
            .await
            .unwrap();

        assert!(session.admin_token.is_none());
        assert!(!sessions.has_admin_session(Some(&stale)).await);
        let principal = sessions
            .authorize(Some(&session.user_token), Some(&stale))
            .await;
        assert!(!principal.is_admin);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_presented_admin_token() {
        let (accounts, sessions) = accounts();
        let admin = accounts.admin_login("admin", "secret", None).await.unwrap();
        accounts.signup("shopper@mail.com", "password1").await.unwrap();

        let wrong = accounts
            .login("shopper@mail.com", "password2", Some(&admin))
            .await;
        assert!(matches!(wrong, Err(DomainError::Unauthorized)));
        let bad_admin = accounts.admin_login("admin", "wrong", Some(&admin)).await;
        assert!(matches!(bad_admin, Err(DomainError::Unauthorized)));

        assert!(sessions.has_admin_session(Some(&admin)).await);
    }

    #[tokio::test]
    async fn test_signup_accepts_plus_addresses() {
        let (accounts, _) = accounts();
        let user = accounts.signup("Jo+Shop@Gmail.com", "password1").await.unwrap();
        assert_eq!(user.email, "jo+shop@gmail.com");
        accounts.signup("a@thriftx.store", "password1").await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_login_checks_both_fields() {
        let (accounts, _) = accounts();
        assert!(matches!(
            accounts.admin_login("admin", "wrong", None).await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            accounts.admin_login("root", "secret", None).await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_admin_token() {
        let (accounts, sessions) = accounts();
        let token = accounts.admin_login("admin", "secret", None).await.unwrap();
        accounts.logout(Some(&token)).await;
        assert!(!sessions.has_admin_session(Some(&token)).await);
    }
}
