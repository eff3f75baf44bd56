use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::Result;

/// Bearer tokens stay valid for 30 days.
const TOKEN_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Passwords never leave this service in the clear: the data layer only
/// ever sees the sha256 hex digest.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Issue an HS256 bearer token whose subject is the username.
pub fn issue_token(username: &str, secret: &str) -> Result<String> {
    let expires_at = Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS);
    let claims = Claims {
        sub: username.to_owned(),
        exp: expires_at.timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    #[test]
    fn digests_are_stable_sha256_hex() {
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
        assert_ne!(hash_password("admin"), hash_password("Admin"));
    }

    #[test]
    fn issued_tokens_carry_the_username_as_subject() {
        let token = issue_token("admin", "s3cret").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"s3cret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "admin");
        assert!(data.claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tokens_do_not_verify_under_a_different_secret() {
        let token = issue_token("admin", "s3cret").unwrap();
        let verified = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(verified.is_err());
    }
}
