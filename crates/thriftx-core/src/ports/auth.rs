//! Authentication and authorization ports.

use std::time::Duration;

use uuid::Uuid;

/// Lifetime of a regular user session.
pub const USER_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetime of an admin session.
pub const ADMIN_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decoded contents of a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionClaims {
    /// A signed-in site account.
    User {
        user_id: Uuid,
        email: String,
        exp: i64,
    },
    /// The admin role. Carries no identity, only a unique token id for revocation.
    Admin { token_id: String, exp: i64 },
}

impl SessionClaims {
    pub fn expires_at(&self) -> i64 {
        match self {
            Self::User { exp, .. } | Self::Admin { exp, .. } => *exp,
        }
    }
}

/// Signs and verifies session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a user session token, valid for [`USER_SESSION_TTL`].
    fn issue_user_session(&self, user_id: Uuid, email: &str) -> Result<String, AuthError>;

    /// Issue an admin session token, valid for [`ADMIN_SESSION_TTL`].
    fn issue_admin_session(&self) -> Result<String, AuthError>;

    /// Verify signature and expiry and decode the claims.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
