/// JWT Token Issuance and Verification
///
/// Tokens are stateless: validity depends only on the signature and the
/// `exp` claim at verification time. Changing the secret invalidates every
/// token issued before.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::ConfigError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Signs and verifies bearer tokens with a process-wide symmetric secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            default_ttl,
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            settings.secret.as_bytes(),
            settings.signing_algorithm()?,
            settings.access_token_ttl(),
        ))
    }

    /// Issue a token for `subject` valid for `ttl`.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims::new(subject, ttl);
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a token with the configured TTL.
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// `Expired` once `exp` has passed (no leeway), `InvalidSignature` for a
    /// token signed with another secret, `Malformed` for anything that does
    /// not decode to `Claims`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        tracing::debug!(subject = %data.claims.sub, "Token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret.as_bytes(), Algorithm::HS256, Duration::minutes(30))
    }

    #[test]
    fn test_issue_and_verify_token() {
        let issuer = issuer("test-secret-key-at-least-32-characters-long");
        let token = issuer.issue_default("a@x.com").expect("Failed to issue token");
        let claims = issuer.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer("test-secret");
        let token = issuer.issue("a@x.com", Duration::seconds(-10)).unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_from_other_secret() {
        let token = issuer("secret-one").issue_default("a@x.com").unwrap();
        let result = issuer("secret-two").verify(&token);

        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer("test-secret").verify("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_tampered_token() {
        let issuer = issuer("test-secret");
        let token = issuer.issue_default("a@x.com").unwrap();

        let tampered = format!("{}X", token);
        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn test_algorithm_mismatch_is_rejected() {
        let signer = TokenIssuer::new(b"shared", Algorithm::HS512, Duration::minutes(5));
        let verifier = TokenIssuer::new(b"shared", Algorithm::HS256, Duration::minutes(5));
        let token = signer.issue_default("a@x.com").unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_token_without_subject_is_rejected() {
        #[derive(serde::Serialize)]
        struct NoSubject {
            exp: i64,
        }

        let secret = b"test-secret";
        let token = encode(
            &Header::default(),
            &NoSubject {
                exp: chrono::Utc::now().timestamp() + 60,
            },
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let issuer = TokenIssuer::new(secret, Algorithm::HS256, Duration::minutes(5));
        assert!(matches!(issuer.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_from_settings_rejects_asymmetric_algorithm() {
        let settings = JwtSettings {
            secret: "s".to_string(),
            algorithm: "ES256".to_string(),
            access_token_expire_minutes: 30,
        };
        assert!(TokenIssuer::from_settings(&settings).is_err());
    }
}
