use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

/// Claims embedded in every issued token; constructed per call and
/// discarded after signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id as string
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256-signed bearer tokens. Self-contained: any
/// middleware holding the same key, issuer and audience can verify a token
/// without a server-side lookup.
#[derive(Clone)]
pub struct TokenIssuer {
    key: String,
    issuer: String,
    audience: String,
    expiry_minutes: u64,
}

impl TokenIssuer {
    pub fn new(key: String, issuer: String, audience: String, expiry_minutes: u64) -> Self {
        Self { key, issuer, audience, expiry_minutes }
    }

    fn check_config(&self) -> Result<(), AuthError> {
        if self.key.trim().is_empty() {
            return Err(AuthError::Configuration("jwt signing key is empty".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(AuthError::Configuration("jwt issuer is empty".into()));
        }
        if self.audience.trim().is_empty() {
            return Err(AuthError::Configuration("jwt audience is empty".into()));
        }
        if self.expiry_minutes == 0 {
            return Err(AuthError::Configuration("jwt expiry must be >= 1 minute".into()));
        }
        Ok(())
    }

    /// Sign a token for `user_id`/`email`, expiring `expiry_minutes` from now.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        self.issue_at(Utc::now(), user_id, email)
    }

    fn issue_at(&self, now: DateTime<Utc>, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        self.check_config()?;
        let exp = now + Duration::minutes(self.expiry_minutes as i64);
        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.key.as_bytes()),
        )
        .map_err(|e| AuthError::Configuration(e.to_string()))
    }

    /// Validate signature, expiry, issuer and audience; returns the claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.check_config()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.key.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret".into(), "auth-service".into(), "clients".into(), 30)
    }

    #[test]
    fn issue_then_decode_round_trips_claims() {
        let issuer = issuer();
        let uid = Uuid::new_v4();
        let token = issuer.issue(uid, "ana@x.com").unwrap();
        assert!(!token.is_empty());
        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.sub, uid.to_string());
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.iss, "auth-service");
        assert_eq!(claims.aud, "clients");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer();
        let two_hours_ago = Utc::now() - Duration::hours(2);
        let token = issuer.issue_at(two_hours_ago, Uuid::new_v4(), "old@x.com").unwrap();
        assert!(matches!(issuer.decode(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = issuer().issue(Uuid::new_v4(), "ana@x.com").unwrap();
        let other = TokenIssuer::new("other-secret".into(), "auth-service".into(), "clients".into(), 30);
        assert!(matches!(other.decode(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn blank_config_fields_fail_with_configuration_error() {
        let cases = [
            TokenIssuer::new("".into(), "iss".into(), "aud".into(), 30),
            TokenIssuer::new("k".into(), "  ".into(), "aud".into(), 30),
            TokenIssuer::new("k".into(), "iss".into(), "".into(), 30),
            TokenIssuer::new("k".into(), "iss".into(), "aud".into(), 0),
        ];
        for issuer in cases {
            let res = issuer.issue(Uuid::new_v4(), "a@b.com");
            assert!(matches!(res, Err(AuthError::Configuration(_))));
        }
    }
}
