//! Bearer-token verification.
//!
//! Tokens are verified either with a shared HS256 secret or with the RSA/EC
//! keys the issuer publishes as a JWKS document. The JWKS is fetched lazily
//! and refreshed once whenever a token names an unknown key id.

use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use docgate_core::config::AuthConfig;
use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;

use super::claims::Claims;

/// Where verification keys come from.
enum KeySource {
    /// Shared HMAC secret.
    Secret(DecodingKey),
    /// Keys published by the issuer.
    Jwks(JwksCache),
}

/// Validates bearer tokens issued by the CMS identity provider.
pub struct TokenVerifier {
    /// Verification keys.
    keys: KeySource,
    /// Expected issuer, if configured.
    issuer: Option<String>,
    /// Allowed clock skew in seconds.
    leeway: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.keys {
            KeySource::Secret(_) => "secret".to_string(),
            KeySource::Jwks(jwks) => jwks.url.clone(),
        };
        f.debug_struct("TokenVerifier")
            .field("keys", &source)
            .field("issuer", &self.issuer)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a verifier from auth configuration.
    ///
    /// A non-empty `jwt_secret` selects HS256. Otherwise keys are loaded from
    /// `jwks_url`, or from `<issuer>.well-known/jwks` when only the issuer is set.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let issuer = Some(config.issuer.clone()).filter(|i| !i.is_empty());

        let keys = if !config.jwt_secret.is_empty() {
            KeySource::Secret(DecodingKey::from_secret(config.jwt_secret.as_bytes()))
        } else {
            let url = if !config.jwks_url.is_empty() {
                config.jwks_url.clone()
            } else if let Some(issuer) = &issuer {
                format!("{issuer}.well-known/jwks")
            } else {
                return Err(AppError::configuration(
                    "auth.jwt_secret, auth.jwks_url or auth.issuer must be set when auth is enabled",
                ));
            };
            KeySource::Jwks(JwksCache::new(
                url,
                Duration::from_secs(config.request_timeout_seconds),
            )?)
        };

        Ok(Self {
            keys,
            issuer,
            leeway: config.leeway_seconds,
        })
    }

    /// Verifies signature, expiry and issuer, and returns the claims.
    pub async fn verify(&self, token: &str) -> AppResult<Claims> {
        let header = decode_header(token)
            .map_err(|e| AppError::authentication(format!("Invalid token format: {e}")))?;

        let (key, algorithm) = match &self.keys {
            KeySource::Secret(key) => {
                if header.alg != Algorithm::HS256 {
                    return Err(AppError::authentication(format!(
                        "Unexpected token algorithm {:?}",
                        header.alg
                    )));
                }
                (key.clone(), Algorithm::HS256)
            }
            KeySource::Jwks(jwks) => {
                if is_symmetric(header.alg) {
                    return Err(AppError::authentication(
                        "Symmetric algorithms are not accepted with published keys",
                    ));
                }
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AppError::authentication("Token has no key id"))?;
                (jwks.key_for(kid).await?, header.alg)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;

        if data.claims.user_id().is_none() {
            return Err(AppError::authentication("Token carries no user identity"));
        }
        debug!(user = data.claims.user_id(), "Token verified");
        Ok(data.claims)
    }
}

fn is_symmetric(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    use jsonwebtoken::errors::ErrorKind as JwtKind;
    match e.kind() {
        JwtKind::ExpiredSignature => AppError::authentication("Token has expired"),
        JwtKind::InvalidToken => AppError::authentication("Invalid token format"),
        JwtKind::InvalidSignature => AppError::authentication("Invalid token signature"),
        JwtKind::InvalidIssuer => AppError::authentication("Unexpected token issuer"),
        _ => AppError::authentication(format!("Token validation failed: {e}")),
    }
}

/// Lazily fetched, refresh-on-miss JWKS.
struct JwksCache {
    /// JWKS endpoint.
    url: String,
    /// HTTP client.
    http: Client,
    /// Upper bound for one fetch.
    timeout: Duration,
    /// Last fetched key set.
    keys: RwLock<Option<JwkSet>>,
}

impl JwksCache {
    fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build JWKS HTTP client", e)
        })?;
        Ok(Self {
            url,
            http,
            timeout,
            keys: RwLock::new(None),
        })
    }

    async fn key_for(&self, kid: &str) -> AppResult<DecodingKey> {
        if let Some(key) = self.lookup(kid).await? {
            return Ok(key);
        }

        self.refresh().await?;
        self.lookup(kid).await?.ok_or_else(|| {
            warn!(kid, "Token signed with unknown key");
            AppError::authentication("Token signed with an unknown key")
        })
    }

    async fn lookup(&self, kid: &str) -> AppResult<Option<DecodingKey>> {
        let guard = self.keys.read().await;
        let Some(jwk) = guard.as_ref().and_then(|set| set.find(kid)) else {
            return Ok(None);
        };
        DecodingKey::from_jwk(jwk)
            .map(Some)
            .map_err(|e| AppError::authentication(format!("Unusable signing key {kid}: {e}")))
    }

    async fn refresh(&self) -> AppResult<()> {
        let fetch = async {
            let response = self.http.get(&self.url).send().await.map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Failed to fetch JWKS", e)
            })?;
            if !response.status().is_success() {
                return Err(AppError::external(format!(
                    "JWKS endpoint answered with HTTP {}",
                    response.status()
                )));
            }
            response.json::<JwkSet>().await.map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Malformed JWKS document", e)
            })
        };

        let set = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| AppError::external("Timed out fetching JWKS"))??;

        info!(url = %self.url, keys = set.keys.len(), "Loaded signing keys");
        *self.keys.write().await = Some(set);
        Ok(())
    }
}
