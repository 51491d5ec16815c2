use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, info};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::app_state::AppState;
use crate::error::AppError;

/// Name of the cookie carrying the credential.
pub const TOKEN_COOKIE: &str = "token";

const TOKEN_LIFETIME_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credential presented")]
    Missing,
    #[error("invalid credential: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// The decoded payload of a valid credential, `iat` and `exp` included.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    claims: Map<String, Value>,
}

impl Identity {
    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }
}

/// Signs and verifies HS256 credentials. Holds no per-session state: a
/// credential stays valid until it expires, logout or not.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Signs `payload` with a 365-day expiry. Caller-supplied `iat`/`exp` are overwritten.
    pub fn issue(&self, payload: Map<String, Value>) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(payload, Utc::now())
    }

    fn issue_at(
        &self,
        mut payload: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expiration = now + Duration::days(TOKEN_LIFETIME_DAYS);
        payload.insert("iat".to_string(), json!(now.timestamp()));
        payload.insert("exp".to_string(), json!(expiration.timestamp()));
        encode(&Header::default(), &payload, &self.encoding_key)
    }

    pub fn authenticate(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        let token = credential
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Missing)?;
        let token_data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::Invalid)?;
        Ok(Identity {
            claims: token_data.claims,
        })
    }
}

/// The `token` cookie. Only production sends it cross-site, and only over TLS.
fn credential_cookie(value: String, production: bool) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .finish()
}

/// POST /api/v1/jwt
pub async fn issue_token(
    data: web::Data<AppState>,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    debug!("Issuing credential for {:?}", payload.get("email"));

    let token = data.tokens.issue(payload)?;
    Ok(HttpResponse::Ok()
        .cookie(credential_cookie(token, data.config.production))
        .json(json!({ "success": true })))
}

/// GET /api/v1/logout
pub async fn logout(data: web::Data<AppState>) -> HttpResponse {
    let mut cookie = credential_cookie(String::new(), data.config.production);
    cookie.make_removal();
    info!("Logout successful");
    HttpResponse::Ok().cookie(cookie).json(json!({ "success": true }))
}
