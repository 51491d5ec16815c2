// src/task.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{debug, info, warn};
use mongodb::bson::{oid::ObjectId, to_document};
use serde_json::{json, Map, Value};

use crate::app_state::AppState;
use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{StatusUpdate, TaskEdit, TaskQuery};
use crate::projection::project_all;
use crate::store::StoreError;

fn parse_task_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::InvalidTaskId(raw.to_string()))
}

/// Under the ownership policy, refuses to touch a task owned by someone other
/// than the caller. A caller without an `email` claim owns nothing. Absent
/// tasks pass through so the store reports zero counts.
async fn ensure_owner(data: &AppState, id: ObjectId, identity: &Identity) -> Result<(), AppError> {
    if !data.config.enforce_task_ownership {
        return Ok(());
    }

    let Some(task) = data.tasks.find_by_id(id).await? else {
        return Ok(());
    };
    match identity.email() {
        Some(caller) if task.email() == Some(caller) => Ok(()),
        caller => {
            warn!(
                "{:?} attempted to modify task {} owned by {:?}",
                caller,
                id,
                task.email()
            );
            Err(AppError::Forbidden)
        }
    }
}

/// POST /api/v1/tasks
/// Stores the body as sent. A client-supplied `_id` is discarded.
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let mut task = to_document(&payload.into_inner()).map_err(StoreError::from)?;
    task.remove("_id");

    let outcome = data.tasks.insert(task).await?;
    info!("Task created: {}", outcome.inserted_id);
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/v1/tasks?email=
/// Every task, or the caller-selected owner's, with progress fields derived.
pub async fn list_tasks(
    data: web::Data<AppState>,
    query: web::Query<TaskQuery>,
) -> Result<HttpResponse, AppError> {
    let owner = query.email.as_deref().filter(|email| !email.is_empty());

    let tasks = data.tasks.list(owner).await?;
    debug!("Listing {} tasks for {:?}", tasks.len(), owner);

    Ok(HttpResponse::Ok().json(project_all(tasks, Utc::now())))
}

/// GET /api/v1/tasks/{id}
/// The stored document as-is, or `null`.
pub async fn get_task(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_task_id(&path)?;
    let task = data.tasks.find_by_id(id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    data: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_task_id(&path)?;
    ensure_owner(&data, id, &identity).await?;

    let outcome = data.tasks.delete_by_id(id).await?;
    info!("Task {} delete removed {} document(s)", id, outcome.deleted_count);
    Ok(HttpResponse::Ok().json(outcome))
}

/// PUT /api/v1/tasks/{id}
/// Replaces the status only.
pub async fn update_task_status(
    data: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
    payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = parse_task_id(&path)?;
    ensure_owner(&data, id, &identity).await?;

    let outcome = data.tasks.set_status(id, &payload.status).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// PATCH /api/v1/tasks/{id}
/// Rewrites name, description, deadline and priority. Succeeds only when the
/// store reports the document actually changed.
pub async fn edit_task(
    data: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
    payload: web::Json<TaskEdit>,
) -> Result<HttpResponse, AppError> {
    let id = parse_task_id(&path)?;
    ensure_owner(&data, id, &identity).await?;

    let outcome = data.tasks.apply_edit(id, &payload).await?;
    if outcome.modified_count == 1 {
        Ok(HttpResponse::Ok().json(json!({ "success": true })))
    } else {
        debug!("Task {} edit matched {} modified 0", id, outcome.matched_count);
        Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Failed to update task",
        })))
    }
}
