// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// Exchanges a signed JWT for an OAuth2 access token (the "JWT bearer" grant),
// then caches the token until shortly before it expires.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Read access to Docs, plus Drive access for listing files and writing the
/// lesson index sidecars.
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/documents.readonly https://www.googleapis.com/auth/drive";

/// Refresh tokens this long before Google says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    /// The token URI (where to exchange JWT for access token).
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    /// Issued at (Unix timestamp).
    iat: u64,
    /// Expiration (Unix timestamp, max 1 hour from iat).
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator that handles OAuth2 with service account credentials.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    /// Creates a new authenticator from a JSON key file path.
    pub async fn from_file(path: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            format!(
                "Failed to read service account key {}: {}",
                path.display(),
                e
            )
        })?;
        Self::from_json(&content)
    }

    /// Creates a new authenticator from JSON content.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| format!("Invalid service account JSON: {}", e))?;
        Ok(Self {
            credentials,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + REFRESH_MARGIN {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self.fetch_new_token().await?;
        tracing::debug!(
            client_email = %self.credentials.client_email,
            expires_in = response.expires_in,
            "Fetched Google access token"
        );

        let mut cached = self.cached_token.write().await;
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: SystemTime::now() + Duration::from_secs(response.expires_in),
        });

        Ok(response.access_token)
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, Box<dyn Error + Send + Sync>> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Token exchange failed ({}): {}", status, text).into());
        }

        Ok(response.json().await?)
    }
}
