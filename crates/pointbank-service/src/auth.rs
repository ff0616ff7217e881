//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthActor` - Admin, facilitator or user authentication via HS256 JWT
//! - `ServiceAuth` - Provisioning authentication via API key

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use pointbank_core::{Actor, Role, UserId};

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller extracted from a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthActor {
    /// Who is calling, and in which role.
    pub actor: Actor,
}

impl AuthActor {
    /// Require an admin or facilitator.
    pub fn require_granter(&self) -> Result<Actor, ApiError> {
        if self.actor.is_granter() {
            Ok(self.actor)
        } else {
            Err(ApiError::Forbidden(
                "admin or facilitator role required".into(),
            ))
        }
    }

    /// Require an administrator.
    pub fn require_admin(&self) -> Result<Actor, ApiError> {
        match self.actor {
            Actor::Admin(_) => Ok(self.actor),
            _ => Err(ApiError::Forbidden("admin role required".into())),
        }
    }

    /// Require a user, returning their ID.
    pub fn require_user(&self) -> Result<UserId, ApiError> {
        match self.actor {
            Actor::User(id) => Ok(id),
            _ => Err(ApiError::Forbidden("user role required".into())),
        }
    }

    /// Whether the caller may read `user`'s records.
    #[must_use]
    pub fn can_read_user(&self, user: &UserId) -> bool {
        match self.actor {
            Actor::Admin(_) => true,
            Actor::User(id) => id == *user,
            Actor::Facilitator(_) => false,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Extract the Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = validate_jwt(token, &state.config)?;
        let actor = claims.actor()?;

        tracing::debug!(actor = %actor, "Bearer token accepted");

        Ok(AuthActor { actor })
    }
}

/// Service authentication via API key.
///
/// Used for provisioning accounts and events.
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The service name or identifier.
    pub service_name: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Check for X-API-Key header
        let api_key = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Validate against configured service API key
        let expected_key = state
            .config
            .service_api_key
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        if api_key != expected_key {
            return Err(ApiError::Unauthorized);
        }

        // Extract service name from header if provided
        let service_name = parts
            .headers
            .get("x-service-name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(ServiceAuth { service_name })
    }
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (account ID for the given role).
    pub sub: String,
    /// Role the subject acts in.
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    #[serde(default)]
    pub iat: i64,
}

impl JwtClaims {
    /// Claims for `actor`, valid for `ttl` from now.
    #[must_use]
    pub fn for_actor(actor: &Actor, issuer: &str, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        let sub = match actor {
            Actor::Admin(id) => id.to_string(),
            Actor::Facilitator(id) => id.to_string(),
            Actor::User(id) => id.to_string(),
        };
        Self {
            sub,
            role: actor.role(),
            iss: issuer.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Resolve the subject into a typed actor.
    pub fn actor(&self) -> Result<Actor, ApiError> {
        let actor = match self.role {
            Role::Admin => self.sub.parse().map(Actor::Admin),
            Role::Facilitator => self.sub.parse().map(Actor::Facilitator),
            Role::User => self.sub.parse().map(Actor::User),
        };
        actor.map_err(|e| {
            tracing::debug!(error = %e, "JWT subject is not a valid account ID");
            ApiError::Unauthorized
        })
    }
}

/// Validate an HS256 token against the configured secret and issuer.
fn validate_jwt(token: &str, config: &ServiceConfig) -> Result<JwtClaims, ApiError> {
    let secret = config.auth_jwt_secret.as_ref().ok_or_else(|| {
        tracing::debug!("Bearer token presented but no JWT secret is configured");
        ApiError::Unauthorized
    })?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation.set_issuer(&[&config.auth_issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use pointbank_core::FacilitatorId;

    fn config() -> ServiceConfig {
        ServiceConfig {
            auth_jwt_secret: Some("unit-test-secret".into()),
            ..ServiceConfig::default()
        }
    }

    fn sign(claims: &JwtClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_actor() {
        let actor = Actor::Facilitator(FacilitatorId::generate());
        let claims = JwtClaims::for_actor(&actor, "pointbank", chrono::Duration::minutes(5));
        let token = sign(&claims, "unit-test-secret");

        let decoded = validate_jwt(&token, &config()).unwrap();
        assert_eq!(decoded.actor().unwrap(), actor);
    }

    #[test]
    fn wrong_secret_issuer_or_expiry_is_rejected() {
        let actor = Actor::User(UserId::generate());
        let good = JwtClaims::for_actor(&actor, "pointbank", chrono::Duration::minutes(5));

        let forged = sign(&good, "other-secret");
        assert!(matches!(validate_jwt(&forged, &config()), Err(ApiError::Unauthorized)));

        let foreign = JwtClaims::for_actor(&actor, "someone-else", chrono::Duration::minutes(5));
        let foreign = sign(&foreign, "unit-test-secret");
        assert!(matches!(validate_jwt(&foreign, &config()), Err(ApiError::Unauthorized)));

        let expired = JwtClaims::for_actor(&actor, "pointbank", chrono::Duration::hours(-1));
        let expired = sign(&expired, "unit-test-secret");
        assert!(matches!(validate_jwt(&expired, &config()), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn subject_must_match_role_id_format() {
        let claims = JwtClaims {
            sub: "not-a-uuid".into(),
            role: Role::Admin,
            iss: "pointbank".into(),
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.actor(), Err(ApiError::Unauthorized)));
    }
}
