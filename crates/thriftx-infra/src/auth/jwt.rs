//! JWT session token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use thriftx_core::ports::{
    ADMIN_SESSION_TTL, AuthError, SessionClaims, TokenService, USER_SESSION_TTL,
};

const DEFAULT_SECRET: &str = "dev-secret-change";
const ADMIN_ROLE: &str = "admin";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            issuer: "thriftx".to_string(),
        }
    }
}

impl JwtConfig {
    /// Load configuration from `JWT_SECRET` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "thriftx".to_string()),
        }
    }
}

/// Wire format of both session kinds. User sessions set `sub` and `email`,
/// admin sessions set `role` and `jti`.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    exp: i64,
    iat: i64,
    iss: String,
}

/// JWT-based (HS256) session token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);
        // An expiry in the past must never verify.
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn sign(&self, mut claims: Claims, ttl: std::time::Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = TimeDelta::from_std(ttl).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        claims.iat = now.timestamp();
        claims.exp = (now + ttl).timestamp();

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn blank_claims(&self) -> Claims {
        Claims {
            sub: None,
            email: None,
            role: None,
            jti: None,
            exp: 0,
            iat: 0,
            iss: self.config.issuer.clone(),
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue_user_session(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: Some(user_id.to_string()),
            email: Some(email.to_string()),
            ..self.blank_claims()
        };
        self.sign(claims, USER_SESSION_TTL)
    }

    fn issue_admin_session(&self) -> Result<String, AuthError> {
        let claims = Claims {
            role: Some(ADMIN_ROLE.to_string()),
            jti: Some(Uuid::new_v4().to_string()),
            ..self.blank_claims()
        };
        self.sign(claims, ADMIN_SESSION_TTL)
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;
        let claims = token_data.claims;
        // The library accepts `exp == now`; a session ends at its expiry second.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        if claims.role.as_deref() == Some(ADMIN_ROLE) {
            let token_id = claims
                .jti
                .ok_or_else(|| AuthError::InvalidToken("admin token without id".to_string()))?;
            return Ok(SessionClaims::Admin {
                token_id,
                exp: claims.exp,
            });
        }

        match (claims.sub, claims.email) {
            (Some(sub), Some(email)) => {
                let user_id =
                    Uuid::parse_str(&sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
                Ok(SessionClaims::User {
                    user_id,
                    email,
                    exp: claims.exp,
                })
            }
            _ => Err(AuthError::InvalidToken(
                "token carries neither a user nor a role".to_string(),
            )),
        }
    }
}
