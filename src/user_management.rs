use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use mongodb::bson::to_document;
use serde_json::{Map, Value};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::StoreError;

/// POST /api/v1/users
/// Registers a user; an email can only be registered once. A body without an
/// email registers a user with a `null` one, and only one of those.
pub async fn create_user(
    data: web::Data<AppState>,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    let NewUser { email, name } = payload.into_inner();

    if data.users.find_by_email(email.as_deref()).await?.is_some() {
        debug!("User {:?} already registered", email);
        return Err(AppError::Conflict("User already exists"));
    }

    let user = User {
        email,
        name,
        timestamp: Utc::now().timestamp_millis(),
    };
    let outcome = data.users.insert(&user).await?;
    info!("User created: {:?}", user.email);

    Ok(HttpResponse::Ok().json(outcome))
}

/// PUT /api/v1/users/{email}
/// Merges the given fields into an existing user and refreshes its timestamp.
/// The write is an upsert, but unknown emails are refused before it is issued.
pub async fn update_user(
    data: web::Data<AppState>,
    email: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let email = email.into_inner();

    if data.users.find_by_email(Some(&email)).await?.is_none() {
        return Err(AppError::NotFound("User not found"));
    }

    let mut fields = to_document(&payload.into_inner()).map_err(StoreError::from)?;
    fields.insert("timestamp", Utc::now().timestamp_millis());

    let outcome = data.users.upsert_by_email(&email, fields).await?;
    info!("User updated: {}", email);

    Ok(HttpResponse::Ok().json(outcome))
}
