// src/store/mod.rs

mod mongo;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Task, TaskEdit, User};

pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("could not encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
    #[error("could not decode document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Persistence for the `users` collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `None` matches users stored without an email, as a `null` filter does.
    async fn find_by_email(&self, email: Option<&str>) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &User) -> Result<InsertOutcome, StoreError>;

    /// `$set`s `fields` on the user keyed by `email`, inserting when absent.
    async fn upsert_by_email(
        &self,
        email: &str,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>;
}

/// Persistence for the `tasks` collection.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts `task` as given, under a store-assigned id.
    async fn insert(&self, task: Document) -> Result<InsertOutcome, StoreError>;

    /// All tasks, or only those whose `email` equals `owner`.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Task>, StoreError>;

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError>;

    async fn set_status(
        &self,
        id: ObjectId,
        status: &Value,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Overwrites `taskName`, `taskDescription`, `deadline` and `priority`.
    async fn apply_edit(&self, id: ObjectId, edit: &TaskEdit) -> Result<UpdateOutcome, StoreError>;
}
