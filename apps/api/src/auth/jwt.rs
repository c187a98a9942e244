use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Audience Supabase stamps on tokens of signed-in users.
pub const SUPABASE_AUDIENCE: &str = "authenticated";

/// Claims carried by a Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id")]
    BadSubject,
}

/// Verifies HS256 access tokens signed with the project's JWT secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Returns the user id and claims of a valid token.
    pub fn verify(&self, token: &str) -> Result<(Uuid, Claims), TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::BadSubject)?;
        Ok((id, data.claims))
    }
}
