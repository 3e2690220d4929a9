//! Email address value type shared by accounts, newsletter and contact flows.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
static NEWSLETTER_RE: OnceLock<Regex> = OnceLock::new();

/// Something, `@`, something, a dot, something; no whitespace.
fn address_regex() -> &'static Regex {
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// ASCII word runs joined by single `.` or `-`, ending in a 2-3 character label.
fn newsletter_regex() -> &'static Regex {
    NEWSLETTER_RE.get_or_init(|| {
        let pattern =
            r"^[[:word:]]+([.-]?[[:word:]]+)*@[[:word:]]+([.-]?[[:word:]]+)*(\.[[:word:]]{2,3})+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("newsletter email regex failed to compile: {error}"))
    })
}

/// A trimmed and lowercased email address.
///
/// [`EmailAddress::parse`] accepts anything shaped like `local@domain.tld`
/// and gates signup and the contact form. Newsletter signups go through the
/// stricter [`EmailAddress::parse_strict`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Self::parse_with(raw, address_regex())
    }

    pub fn parse_strict(raw: &str) -> Result<Self, DomainError> {
        Self::parse_with(raw, newsletter_regex())
    }

    fn parse_with(raw: &str, shape: &Regex) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("Email is required"));
        }
        if !shape.is_match(&normalized) {
            return Err(DomainError::validation(
                "Please enter a valid email address",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Masked form for logs, e.g. `j***@example.com`.
    pub fn masked(&self) -> String {
        mask_email(&self.0)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mask an email address to avoid PII in logs.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match (chars.next(), chars.next()) {
                (Some(first), Some(_)) => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}
