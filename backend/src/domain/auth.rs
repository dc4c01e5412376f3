//! Authentication inputs forwarded to the identity provider.
//!
//! Credentials are passed through untouched: email format and password
//! strength are the provider's business, and its message is what the login
//! page shows. Secret material is held in [`Zeroizing`] buffers and kept out
//! of `Debug` output.

use std::fmt;

use base64::prelude::*;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Email/password pair submitted from the login form.
///
/// # Examples
/// ```
/// use tutor_portal::domain::PasswordCredentials;
///
/// let creds = PasswordCredentials::new("tutor@example.com", "hunter2");
/// assert_eq!(creds.email(), "tutor@example.com");
/// assert!(!format!("{creds:?}").contains("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl PasswordCredentials {
    /// Wrap raw form values without validation.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Email exactly as submitted.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password exactly as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raised when the callback carries no usable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authorization code must not be empty")]
pub struct EmptyAuthCode;

/// One-time authorisation code taken from the callback query string.
///
/// ## Invariants
/// - The code is non-empty once trimmed; surrounding whitespace is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCode(Zeroizing<String>);

impl AuthCode {
    /// Validate and wrap a raw code.
    pub fn new(raw: &str) -> Result<Self, EmptyAuthCode> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyAuthCode);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Raw code value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCode(<redacted>)")
    }
}

/// PKCE verifier stored when the OAuth flow was started.
///
/// # Examples
/// ```
/// use tutor_portal::domain::CodeVerifier;
///
/// let verifier = CodeVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap();
/// assert_eq!(verifier.challenge(), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CodeVerifier(Zeroizing<String>);

impl CodeVerifier {
    /// Fresh verifier: 32 random bytes, base64url without padding.
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(Zeroizing::new(BASE64_URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// `S256` challenge derived from this verifier.
    pub fn challenge(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(self.0.as_bytes()))
    }

    /// Wrap a stored verifier; blank values are treated as absent.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(raw)))
        }
    }

    /// Raw verifier value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeVerifier(<redacted>)")
    }
}

/// Everything the provider needs to turn a callback into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExchange {
    /// Code from the callback URL.
    pub code: AuthCode,
    /// Verifier recorded when the flow began, if any.
    pub verifier: Option<CodeVerifier>,
}

const MAX_PROVIDER_LEN: usize = 32;

/// Raised when an OAuth provider name is not a plain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported OAuth provider")]
pub struct InvalidOAuthProvider;

/// Name of the external OAuth provider the flow is started against.
///
/// ## Invariants
/// - 1 to 32 characters of lowercase ASCII letters, digits, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProvider(String);

impl OAuthProvider {
    /// Validate a provider name taken from the query string.
    pub fn new(raw: &str) -> Result<Self, InvalidOAuthProvider> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_PROVIDER_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(raw.to_owned()))
        } else {
            Err(InvalidOAuthProvider)
        }
    }

    /// Provider name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Parameters for the provider's authorise redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Provider the tutor picked.
    pub provider: OAuthProvider,
    /// `S256` challenge of the verifier kept in the session.
    pub code_challenge: String,
    /// Absolute callback URL, `next` already attached.
    pub redirect_to: String,
}
