//! Bearer-token authentication and per-route role allow-lists.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum::{async_trait, RequestPartsExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use residencia_config::AuthConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrador,
    Medico,
    Enfermero,
    Auxiliar,
    Recepcion,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrador => "Administrador",
            Self::Medico => "Medico",
            Self::Enfermero => "Enfermero",
            Self::Auxiliar => "Auxiliar",
            Self::Recepcion => "Recepcion",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Administrador" => Ok(Self::Administrador),
            "Medico" => Ok(Self::Medico),
            "Enfermero" => Ok(Self::Enfermero),
            "Auxiliar" => Ok(Self::Auxiliar),
            "Recepcion" => Ok(Self::Recepcion),
            other => Err(AppError::Validation(format!("unknown role `{other}`"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ADMIN: &[Role] = &[Role::Administrador];
pub const ADMIN_OR_DOCTOR: &[Role] = &[Role::Administrador, Role::Medico];
pub const PHARMACY: &[Role] = &[Role::Administrador, Role::Medico, Role::Enfermero];
pub const CARE_STAFF: &[Role] = &[Role::Administrador, Role::Enfermero, Role::Auxiliar];
pub const FRONT_DESK: &[Role] = &[Role::Administrador, Role::Recepcion];

/// The authenticated caller. Serialized with the field names the frontend reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "personalId")]
    pub staff_id: Option<i32>,
    #[serde(rename = "nombreCompleto")]
    pub full_name: Option<String>,
}

impl CurrentUser {
    /// Identity injected for every request when `auth.insecure_dev_mode` is on.
    #[must_use]
    pub fn development_admin() -> Self {
        Self {
            id: 1,
            username: "admin".to_owned(),
            role: Role::Administrador,
            staff_id: None,
            full_name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    user: CurrentUser,
    iat: i64,
    exp: i64,
}

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
    insecure_dev_mode: bool,
}

#[derive(Clone)]
pub struct TokenKeys(Arc<KeysInner>);

impl TokenKeys {
    /// Without a configured secret (only allowed in dev mode) tokens are signed with
    /// a random per-process key.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = match config.jwt_secret.as_deref().filter(|secret| !secret.is_empty()) {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                let mut secret = vec![0_u8; 32];
                rand::thread_rng().fill(secret.as_mut_slice());
                secret
            }
        };
        Self(Arc::new(KeysInner {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            lifetime: Duration::hours(config.token_lifetime_hours),
            insecure_dev_mode: config.insecure_dev_mode,
        }))
    }

    #[must_use]
    pub fn insecure_dev_mode(&self) -> bool {
        self.0.insecure_dev_mode
    }

    pub fn issue(&self, user: CurrentUser) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user,
            iat: now.timestamp(),
            exp: (now + self.0.lifetime).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.0.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<CurrentUser, AppError> {
        decode::<Claims>(token, &self.0.decoding, &Validation::default())
            .map(|data| data.claims.user)
            .map_err(|err| {
                debug!("rejected token: {err}");
                AppError::Unauthorized("invalid or expired token".to_owned())
            })
    }
}

/// Resolves the caller and stores it in the request extensions for handlers and
/// [`require_role`].
pub async fn authenticate(
    State(keys): State<TokenKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = if keys.insecure_dev_mode() {
        CurrentUser::development_admin()
    } else {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("authentication token missing".to_owned()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_owned()))?;
        keys.verify(token)?
    };
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Route middleware comparing the caller's role against an allow-list.
pub async fn require_role(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    if !allowed.contains(&user.role) {
        warn!(user = user.username, role = %user.role, path = %request.uri().path(), "role not allowed");
        return Err(AppError::Forbidden(format!(
            "role {} is not allowed to perform this action",
            user.role
        )));
    }
    Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extract::<axum::Extension<Self>>()
            .await
            .map(|axum::Extension(user)| user)
            .map_err(|_rejection| AppError::Unauthorized("authentication required".to_owned()))
    }
}

/// Argon2id hash in PHC string format.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(lifetime_hours: i64) -> TokenKeys {
        TokenKeys::from_config(&AuthConfig {
            jwt_secret: Some("test-secret".to_owned()),
            token_lifetime_hours: lifetime_hours,
            insecure_dev_mode: false,
        })
    }

    fn nurse() -> CurrentUser {
        CurrentUser {
            id: 4,
            username: "lucia".to_owned(),
            role: Role::Enfermero,
            staff_id: Some(12),
            full_name: Some("Lucía Pérez".to_owned()),
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let keys = keys(8);
        let token = keys.issue(nurse()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), nurse());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = keys(8).issue(nurse()).unwrap();
        let other = TokenKeys::from_config(&AuthConfig {
            jwt_secret: Some("other".to_owned()),
            ..AuthConfig::default()
        });
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = keys(-1);
        let token = keys.issue(nurse()).unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn claims_use_frontend_field_names() {
        let value = serde_json::to_value(nurse()).unwrap();
        assert_eq!(value["rol"], "Enfermero");
        assert_eq!(value["personalId"], 12);
        assert_eq!(value["nombreCompleto"], "Lucía Pérez");
    }

    #[test]
    fn passwords_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn roles_parse_from_stored_names() {
        assert_eq!("Recepcion".parse::<Role>().unwrap(), Role::Recepcion);
        assert!("Jardinero".parse::<Role>().is_err());
    }
}
