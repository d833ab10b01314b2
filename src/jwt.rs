//! Bearer token issuance and validation.
//!
//! Tokens are HS256 signed and carry a fixed claim set. The signing key, issuer
//! and audience come from [`AppConfig`](crate::config::AppConfig) through
//! [`JwtConfig`]; nothing is read from the environment here.

use std::time::Duration as StdDuration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

/// How far in the future an `iat` claim may be before the token is rejected.
pub const CLOCK_SKEW_LEEWAY: StdDuration = StdDuration::from_secs(60);

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Self> {
        let secret = STANDARD
            .decode(config.jwt_secret.trim())
            .map_err(|e| anyhow::anyhow!("JWT_SECRET is not valid base64: {e}"))?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        Ok(Self {
            secret,
            issuer: config.app_url.clone(),
            audience: config.app_url.clone(),
            ttl: Duration::minutes(config.jwt_ttl_minutes),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub jti: String,
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct JwtService {
    issuer: String,
    audience: String,
    ttl: Duration,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            issuer: config.issuer,
            audience: config.audience,
            ttl: config.ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> AppResult<IssuedToken> {
        self.issue_at(user_id, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let claims = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))?;

        tracing::debug!(user_id = %user_id, jti = %claims.jti, "token issued");
        Ok(IssuedToken { token, claims })
    }

    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        self.validate_at(token, Utc::now())
    }

    /// Verify signature, issuer and audience, then the validity window at `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // The window is checked below against the caller supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AppError::Unauthorized
            })?
            .claims;

        let now = now.timestamp();
        if now >= claims.exp {
            tracing::debug!(sub = %claims.sub, "token expired");
            return Err(AppError::Unauthorized);
        }
        if claims.iat > now + CLOCK_SKEW_LEEWAY.as_secs() as i64 {
            tracing::debug!(sub = %claims.sub, "token issued in the future");
            return Err(AppError::Unauthorized);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &[u8]) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_vec(),
            issuer: "http://localhost:3000".into(),
            audience: "http://localhost:3000".into(),
            ttl: Duration::minutes(30),
        })
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn token_is_valid_for_its_whole_lifetime() {
        let jwt = service(b"first-secret-key-for-tests");
        let user_id = Uuid::new_v4();
        let issued = jwt.issue_at(user_id, "kim@example.com", at(0)).unwrap();

        for offset in [0, 1, 60, 29 * 60, 30 * 60 - 1] {
            let claims = jwt.validate_at(&issued.token, at(offset)).unwrap();
            assert_eq!(claims.sub, user_id);
            assert_eq!(claims.email, "kim@example.com");
        }
    }

    #[test]
    fn token_expires_after_thirty_minutes() {
        let jwt = service(b"first-secret-key-for-tests");
        let issued = jwt.issue_at(Uuid::new_v4(), "kim@example.com", at(0)).unwrap();

        for offset in [30 * 60, 30 * 60 + 1, 3600] {
            assert!(matches!(
                jwt.validate_at(&issued.token, at(offset)),
                Err(AppError::Unauthorized)
            ));
        }
    }

    #[test]
    fn future_issued_tokens_are_accepted_within_leeway_only() {
        let jwt = service(b"first-secret-key-for-tests");
        let leeway = CLOCK_SKEW_LEEWAY.as_secs() as i64;
        let issued = jwt.issue_at(Uuid::new_v4(), "kim@example.com", at(leeway)).unwrap();
        assert!(jwt.validate_at(&issued.token, at(0)).is_ok());

        let too_early = jwt
            .issue_at(Uuid::new_v4(), "kim@example.com", at(leeway + 1))
            .unwrap();
        assert!(jwt.validate_at(&too_early.token, at(0)).is_err());
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let signer = service(b"first-secret-key-for-tests");
        let verifier = service(b"second-secret-key-for-tests");
        let issued = signer.issue_at(Uuid::new_v4(), "kim@example.com", at(0)).unwrap();

        assert!(matches!(
            verifier.validate_at(&issued.token, at(1)),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn token_for_another_audience_is_rejected() {
        let signer = JwtService::new(JwtConfig {
            secret: b"first-secret-key-for-tests".to_vec(),
            issuer: "http://localhost:3000".into(),
            audience: "https://elsewhere.example".into(),
            ttl: Duration::minutes(30),
        });
        let verifier = service(b"first-secret-key-for-tests");
        let issued = signer.issue_at(Uuid::new_v4(), "kim@example.com", at(0)).unwrap();

        assert!(verifier.validate_at(&issued.token, at(1)).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = service(b"first-secret-key-for-tests");
        assert!(jwt.validate_at("not-a-token", at(0)).is_err());
        assert!(jwt.validate_at("", at(0)).is_err());
    }

    #[test]
    fn each_token_gets_a_fresh_id() {
        let jwt = service(b"first-secret-key-for-tests");
        let user_id = Uuid::new_v4();
        let a = jwt.issue_at(user_id, "kim@example.com", at(0)).unwrap();
        let b = jwt.issue_at(user_id, "kim@example.com", at(0)).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
        assert_eq!(b.claims.exp - b.claims.iat, 30 * 60);
    }

    #[test]
    fn config_requires_base64_secret() {
        let mut config = AppConfig {
            database_url: "postgres://localhost/petshop".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            app_url: "http://localhost:3000".into(),
            jwt_secret: "***not base64***".into(),
            jwt_ttl_minutes: 30,
            storage_root: "./storage".into(),
        };
        assert!(JwtConfig::from_app_config(&config).is_err());

        config.jwt_secret = STANDARD.encode(b"a-perfectly-fine-key");
        let jwt = JwtConfig::from_app_config(&config).unwrap();
        assert_eq!(jwt.secret, b"a-perfectly-fine-key");
        assert_eq!(jwt.issuer, "http://localhost:3000");
    }
}
