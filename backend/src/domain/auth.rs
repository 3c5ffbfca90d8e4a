//! Authentication primitives: login credentials and password digests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! The identity provider proper is an external collaborator; this module only
//! covers the minimal credential material the backend stores itself.

use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::{Email, UserValidationError};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login or signup payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email failed validation.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`]; only enforced at signup.
    PasswordTooShort {
        /// Minimum permitted length.
        min: usize,
    },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` satisfies [`Email`] validation.
/// - `password` is non-empty and retains caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin@school.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "admin@school.com");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let email = Email::new(email).map_err(CredentialValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for account lookup.
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Enforce the signup password policy.
pub fn validate_new_password(password: &str) -> Result<(), CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    if password.len() < PASSWORD_MIN {
        return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

/// Salted SHA-256 password digest as persisted alongside an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    digest: String,
}

impl PasswordDigest {
    /// Digest a password under a fresh random salt.
    pub fn derive(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self::with_salt(salt, password)
    }

    /// Digest a password under a known salt.
    pub fn with_salt(salt: impl Into<String>, password: &str) -> Self {
        let salt = salt.into();
        let digest = hex::encode(
            Sha256::new_with_prefix(salt.as_bytes())
                .chain_update(password)
                .finalize(),
        );
        Self { salt, digest }
    }

    /// Reconstruct a digest from its stored columns.
    pub const fn from_stored(salt: String, digest: String) -> Self {
        Self { salt, digest }
    }

    /// Whether `password` digests to this value under the stored salt.
    pub fn verify(&self, password: &str) -> bool {
        Self::with_salt(self.salt.clone(), password).digest == self.digest
    }

    /// Stored salt column value.
    pub fn salt(&self) -> &str {
        self.salt.as_str()
    }

    /// Stored digest column value (lowercase hex).
    pub fn digest(&self) -> &str {
        self.digest.as_str()
    }
}
