//! Confirmation codes and access tokens.
//!
//! A confirmation code is `<issued-at in base36>-<hex HMAC-SHA256>` over the
//! user's id, username, email, `last_login` and the issue time. Nothing is
//! stored: a code stops verifying once it expires or once any of those
//! fields change, which is what makes it single-use (issuing an access token
//! stamps `last_login`).
//!
//! Access tokens are HS256 JWTs carrying the user id in `sub`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::UserId;
use crate::entities::users;

type HmacSha256 = Hmac<Sha256>;

const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid signing key")]
    InvalidKey,

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token type")]
    WrongType,

    #[error("Invalid user ID in token")]
    InvalidSubject,
}

/// Generates a random signing secret for processes started without one.
#[must_use]
pub fn random_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct ConfirmationCodes {
    key: Vec<u8>,
    ttl_secs: i64,
}

impl ConfirmationCodes {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            ttl_secs: ttl_hours.saturating_mul(3600),
        }
    }

    pub fn make(&self, user: &users::Model) -> Result<String, TokenError> {
        self.make_at(user, Utc::now().timestamp())
    }

    #[must_use]
    pub fn check(&self, user: &users::Model, code: &str) -> bool {
        self.check_at(user, code, Utc::now().timestamp())
    }

    fn make_at(&self, user: &users::Model, issued_at: i64) -> Result<String, TokenError> {
        let mac = self.mac(user, issued_at)?;
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}-{signature}", to_base36(issued_at)))
    }

    fn check_at(&self, user: &users::Model, code: &str, now: i64) -> bool {
        let Some((ts, signature)) = code.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = i64::from_str_radix(ts, 36) else {
            return false;
        };
        if issued_at > now || now - issued_at > self.ttl_secs {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };

        self.mac(user, issued_at)
            .is_ok_and(|mac| mac.verify_slice(&signature).is_ok())
    }

    fn mac(&self, user: &users::Model, issued_at: i64) -> Result<HmacSha256, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| TokenError::InvalidKey)?;
        let state = format!(
            "{}|{}|{}|{}|{issued_at}",
            user.id,
            user.username,
            user.email,
            user.last_login.as_deref().unwrap_or_default(),
        );
        mac.update(state.as_bytes());
        Ok(mac)
    }
}

fn to_base36(mut value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value <= 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
    pub iss: String,
}

#[derive(Clone)]
pub struct AccessTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl AccessTokens {
    #[must_use]
    pub fn new(secret: &str, issuer: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            ttl_secs: ttl_minutes.saturating_mul(60),
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            iss: self.issuer.clone(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Returns the user id of a valid, unexpired access token.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = true;

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::WrongType);
        }

        data.claims
            .sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::InvalidSubject)
    }
}
