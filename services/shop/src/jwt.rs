//! JWT service for token issuance and validation
//!
//! Tokens are signed either with a shared secret (HS256) or with an RSA key
//! pair (RS256). Claims carry the username, user id and roles so the
//! middleware can authorise requests without a database round trip.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Role, User};

/// Shortest accepted HS256 secret, in bytes
const MIN_SECRET_LEN: usize = 32;

/// Signing material
#[derive(Clone)]
pub enum JwtKeys {
    /// Shared HS256 secret
    Secret(String),
    /// RS256 key pair in PEM format
    Rsa {
        private_key: String,
        public_key: String,
    },
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtKeys::Secret(_) => f.write_str("Secret(..)"),
            JwtKeys::Rsa { .. } => f.write_str("Rsa { .. }"),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub keys: JwtKeys,
    /// Token expiration time in seconds (default: 24 hours)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY` / `JWT_PUBLIC_KEY`: RS256 key pair (PEM or path to a PEM file)
    /// - `JWT_SECRET`: HS256 secret, used when no key pair is configured
    /// - `JWT_EXPIRY`: Token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("JWT_PRIVATE_KEY").ok();
        let public_key = std::env::var("JWT_PUBLIC_KEY").ok();

        let keys = match (private_key, public_key) {
            (Some(private_key), Some(public_key)) => JwtKeys::Rsa {
                private_key: read_pem(&private_key)?,
                public_key: read_pem(&public_key)?,
            },
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("JWT_PRIVATE_KEY and JWT_PUBLIC_KEY must be set together")
            }
            (None, None) => {
                let secret = std::env::var("JWT_SECRET").map_err(|_| {
                    anyhow::anyhow!("JWT_SECRET or JWT_PRIVATE_KEY/JWT_PUBLIC_KEY must be set")
                })?;
                JwtKeys::Secret(secret)
            }
        };

        let token_expiry = std::env::var("JWT_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        Ok(JwtConfig { keys, token_expiry })
    }

    /// HS256 configuration from a secret
    pub fn with_secret(secret: impl Into<String>, token_expiry: u64) -> Self {
        Self {
            keys: JwtKeys::Secret(secret.into()),
            token_expiry,
        }
    }
}

/// Accept either a literal PEM or a path to a PEM file
fn read_pem(value: &str) -> Result<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map(|pem| pem.trim().to_string())
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User ID
    pub uid: i64,
    /// User roles
    pub roles: Vec<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// Roles the token asserts; unknown names are dropped
    pub fn roles(&self) -> Vec<Role> {
        self.roles.iter().filter_map(|r| r.parse().ok()).collect()
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let (encoding_key, decoding_key, algorithm) = match &config.keys {
            JwtKeys::Secret(secret) => {
                if secret.len() < MIN_SECRET_LEN {
                    anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
                }
                (
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                    Algorithm::HS256,
                )
            }
            JwtKeys::Rsa {
                private_key,
                public_key,
            } => (
                EncodingKey::from_rsa_pem(private_key.as_bytes())?,
                DecodingKey::from_rsa_pem(public_key.as_bytes())?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            token_expiry: config.token_expiry,
        })
    }

    /// Issue a token asserting the user's identity and roles
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.username.clone(),
            uid: user.id,
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now,
            exp: now + self.token_expiry,
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        let token = encode(&Header::new(self.algorithm), claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
