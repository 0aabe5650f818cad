use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fittrack_core::UserId;

/// Session token payload.
///
/// `iat`/`exp` are unix seconds, as in any JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: UserId,

    pub email: String,

    pub iat: i64,

    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of already-decoded claims.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token could not be issued: {0}")]
    Issue(String),

    /// Bad signature, malformed token, wrong algorithm, expired... callers
    /// only ever see this one variant.
    #[error("invalid token")]
    Invalid,
}

/// HS256 issuer/verifier keyed by a server-held secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: UserId, email: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        if ttl <= Duration::zero() {
            return Err(TokenError::Issue("ttl must be positive".to_string()));
        }

        let iat = now.timestamp();
        let claims = TokenClaims {
            user_id,
            email: email.to_string(),
            iat,
            exp: iat + ttl.num_seconds().max(1),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| TokenError::Issue(e.to_string()))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            TokenError::Invalid
        })?;

        validate_claims(&data.claims, now).map_err(|e| {
            debug!(error = %e, user_id = %data.claims.user_id, "token rejected");
            TokenError::Invalid
        })?;

        Ok(data.claims)
    }
}

impl core::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtCodec").field("algorithm", &Algorithm::HS256).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn codec() -> JwtCodec {
        JwtCodec::new(b"test-secret")
    }

    fn token() -> String {
        codec().issue(UserId::new(7), "ann@example.com", Duration::hours(1), now()).unwrap()
    }

    #[test]
    fn issued_token_verifies_within_window() {
        let claims = codec().verify(&token(), now() + Duration::minutes(59)).unwrap();
        assert_eq!(claims.user_id, UserId::new(7));
        assert_eq!(claims.email, "ann@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let json = serde_json::to_value(TokenClaims {
            user_id: UserId::new(1),
            email: "a@b.c".into(),
            iat: 0,
            exp: 1,
        })
        .unwrap();
        assert_eq!(json["userId"], 1);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn expired_token_is_invalid() {
        let err = codec().verify(&token(), now() + Duration::hours(1)).unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn future_token_is_invalid() {
        let err = codec().verify(&token(), now() - Duration::seconds(1)).unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn other_secret_is_invalid() {
        let err = JwtCodec::new(b"another-secret").verify(&token(), now()).unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(codec().verify("", now()).unwrap_err(), TokenError::Invalid);
        assert_eq!(codec().verify("a.b.c", now()).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let err = codec().issue(UserId::new(1), "a@b.c", Duration::zero(), now()).unwrap_err();
        assert!(matches!(err, TokenError::Issue(_)));
    }

    #[test]
    fn claims_window_checks() {
        let c = TokenClaims {
            user_id: UserId::new(1),
            email: "a@b.c".into(),
            iat: 100,
            exp: 100,
        };
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(100, 0).unwrap()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.";

    proptest! {
        #[test]
        fn tampering_with_any_byte_invalidates(index in any::<prop::sample::Index>(), replacement in 0..ALPHABET.len()) {
            let original = token();
            let mut bytes = original.clone().into_bytes();
            let at = index.index(bytes.len());
            let new_byte = ALPHABET[replacement];
            prop_assume!(bytes[at] != new_byte);
            bytes[at] = new_byte;
            let tampered = String::from_utf8(bytes).unwrap();

            prop_assert_eq!(codec().verify(&tampered, now()), Err(TokenError::Invalid));
        }

        #[test]
        fn verifies_strictly_before_expiry(ttl in 1i64..86_400, elapsed in 0i64..172_800) {
            let token = codec().issue(UserId::new(3), "x@y.z", Duration::seconds(ttl), now()).unwrap();
            let result = codec().verify(&token, now() + Duration::seconds(elapsed));
            prop_assert_eq!(result.is_ok(), elapsed < ttl);
        }
    }
}
