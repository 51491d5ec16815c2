// src/store/memory.rs

use async_trait::async_trait;
use mongodb::bson::{doc, from_document, oid::ObjectId, to_document, Bson, Document};
use serde_json::Value;
use tokio::sync::RwLock;

use super::mongo::{edit_update, status_update, user_update};
use super::{DeleteOutcome, InsertOutcome, StoreError, TaskStore, UpdateOutcome, UserStore};
use crate::models::{Task, TaskEdit, User};

/// In-process stand-in for `MongoStore`. Applies the same update documents
/// and reports matched/modified counts the way `$set` does: writing a field's
/// current value is not a modification.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<Document>>,
    tasks: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_document(&self, email: &str) -> Option<Document> {
        self.users
            .read()
            .await
            .iter()
            .find(|doc| doc.get_str("email").ok() == Some(email))
            .cloned()
    }

    pub async fn task(&self, id: ObjectId) -> Option<Document> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|doc| has_id(doc, id))
            .cloned()
    }

    async fn update_task(&self, id: ObjectId, update: Document) -> UpdateOutcome {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|doc| has_id(doc, id)) {
            Some(task) => updated(true, apply_set(task, &update)),
            None => updated(false, false),
        }
    }
}

fn has_id(doc: &Document, id: ObjectId) -> bool {
    doc.get_object_id("_id").ok() == Some(id)
}

// `{ email: null }` also matches documents with no email at all.
fn email_matches(doc: &Document, email: Option<&str>) -> bool {
    match (doc.get("email"), email) {
        (None | Some(Bson::Null), None) => true,
        (Some(Bson::String(stored)), Some(email)) => stored == email,
        _ => false,
    }
}

fn apply_set(doc: &mut Document, update: &Document) -> bool {
    let Ok(fields) = update.get_document("$set") else {
        return false;
    };
    let mut modified = false;
    for (key, value) in fields {
        if doc.get(key) != Some(value) {
            doc.insert(key.clone(), value.clone());
            modified = true;
        }
    }
    modified
}

fn updated(matched: bool, modified: bool) -> UpdateOutcome {
    UpdateOutcome {
        acknowledged: true,
        matched_count: u64::from(matched),
        modified_count: u64::from(modified),
        upserted_count: 0,
        upserted_id: None,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: Option<&str>) -> Result<Option<User>, StoreError> {
        let found = self
            .users
            .read()
            .await
            .iter()
            .find(|doc| email_matches(doc, email))
            .cloned();
        match found {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, user: &User) -> Result<InsertOutcome, StoreError> {
        let id = ObjectId::new();
        let mut doc = to_document(user)?;
        doc.insert("_id", id);
        self.users.write().await.push(doc);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id.to_hex(),
        })
    }

    async fn upsert_by_email(
        &self,
        email: &str,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let update = user_update(fields);
        let mut users = self.users.write().await;
        match users.iter_mut().find(|doc| email_matches(doc, Some(email))) {
            Some(existing) => Ok(updated(true, apply_set(existing, &update))),
            None => {
                let id = ObjectId::new();
                let mut doc = doc! { "_id": id, "email": email };
                apply_set(&mut doc, &update);
                users.push(doc);
                Ok(UpdateOutcome {
                    upserted_count: 1,
                    upserted_id: Some(id.to_hex()),
                    ..updated(false, false)
                })
            }
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, mut task: Document) -> Result<InsertOutcome, StoreError> {
        let id = ObjectId::new();
        task.insert("_id", id);
        self.tasks.write().await.push(task);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id.to_hex(),
        })
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .filter(|doc| owner.is_none() || email_matches(doc, owner))
            .cloned()
            .map(Task::from)
            .collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Task>, StoreError> {
        Ok(self.task(id).await.map(Task::from))
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|doc| !has_id(doc, id));
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: (before - tasks.len()) as u64,
        })
    }

    async fn set_status(&self, id: ObjectId, status: &Value) -> Result<UpdateOutcome, StoreError> {
        let update = status_update(status)?;
        Ok(self.update_task(id, update).await)
    }

    async fn apply_edit(&self, id: ObjectId, edit: &TaskEdit) -> Result<UpdateOutcome, StoreError> {
        let update = edit_update(edit)?;
        Ok(self.update_task(id, update).await)
    }
}
