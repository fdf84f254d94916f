use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims of tokens issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    #[serde(default)]
    pub iat: usize,
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

/// Tokens are issued elsewhere; tests mint their own.
#[cfg(test)]
pub fn create_token(sub: &str, secret: &str, valid_for: chrono::Duration) -> Result<String> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: sub.to_string(),
        exp: (now + valid_for).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_own_tokens() {
        let token = create_token("user-1", "secret", chrono::Duration::hours(1)).unwrap();
        let claims = validate_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = create_token("user-1", "secret", chrono::Duration::hours(1)).unwrap();
        assert!(validate_token(&token, "other").is_err());

        let expired = create_token("user-1", "secret", chrono::Duration::hours(-2)).unwrap();
        assert!(validate_token(&expired, "secret").is_err());
        assert!(validate_token("not.a.token", "secret").is_err());
    }
}
