// src/store/mongo.rs

use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::debug;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Bson, Document};
use mongodb::results::UpdateResult;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use serde_json::Value;

use super::{DeleteOutcome, InsertOutcome, StoreError, TaskStore, UpdateOutcome, UserStore};
use crate::models::{Task, TaskEdit, User};

const USERS: &str = "users";
const TASKS: &str = "tasks";

/// Both collections, backed by one pooled `mongodb::Client`.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        Ok(MongoStore { client, db })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn tasks(&self) -> Collection<Document> {
        self.db.collection(TASKS)
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(super) fn email_filter(email: Option<&str>) -> Document {
    doc! { "email": email }
}

pub(super) fn user_update(fields: Document) -> Document {
    doc! { "$set": fields }
}

pub(super) fn status_update(status: &Value) -> Result<Document, StoreError> {
    let status = to_bson(status)?;
    Ok(doc! { "$set": { "status": status } })
}

/// Rewrites exactly the four editable fields; a `null` clears the stored value.
pub(super) fn edit_update(edit: &TaskEdit) -> Result<Document, StoreError> {
    let task_name = to_bson(&edit.task_name)?;
    let task_description = to_bson(&edit.task_description)?;
    let deadline = to_bson(&edit.deadline)?;
    let priority = to_bson(&edit.priority)?;
    Ok(doc! {
        "$set": {
            "taskName": task_name,
            "taskDescription": task_description,
            "deadline": deadline,
            "priority": priority,
        }
    })
}

impl From<UpdateResult> for UpdateOutcome {
    fn from(res: UpdateResult) -> Self {
        UpdateOutcome {
            acknowledged: true,
            matched_count: res.matched_count,
            modified_count: res.modified_count,
            upserted_count: u64::from(res.upserted_id.is_some()),
            upserted_id: res.upserted_id.as_ref().map(id_to_string),
        }
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_by_email(&self, email: Option<&str>) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(email_filter(email)).await?)
    }

    async fn insert(&self, user: &User) -> Result<InsertOutcome, StoreError> {
        let res = self.users().insert_one(user).await?;
        debug!("Inserted user {:?}", user.email);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id_to_string(&res.inserted_id),
        })
    }

    async fn upsert_by_email(
        &self,
        email: &str,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let res = self
            .users()
            .update_one(email_filter(Some(email)), user_update(fields))
            .upsert(true)
            .await?;
        Ok(res.into())
    }
}

#[async_trait]
impl TaskStore for MongoStore {
    async fn insert(&self, mut task: Document) -> Result<InsertOutcome, StoreError> {
        task.remove("_id");

        let res = self.tasks().insert_one(task).await?;
        debug!("Inserted task {}", res.inserted_id);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id_to_string(&res.inserted_id),
        })
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Task>, StoreError> {
        let filter = match owner {
            Some(email) => email_filter(Some(email)),
            None => doc! {},
        };
        let documents: Vec<Document> = self.tasks().find(filter).await?.try_collect().await?;
        Ok(documents.into_iter().map(Task::from).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Task>, StoreError> {
        let document = self.tasks().find_one(doc! { "_id": id }).await?;
        Ok(document.map(Task::from))
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteOutcome, StoreError> {
        let res = self.tasks().delete_one(doc! { "_id": id }).await?;
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: res.deleted_count,
        })
    }

    async fn set_status(&self, id: ObjectId, status: &Value) -> Result<UpdateOutcome, StoreError> {
        let res = self
            .tasks()
            .update_one(doc! { "_id": id }, status_update(status)?)
            .await?;
        Ok(res.into())
    }

    async fn apply_edit(&self, id: ObjectId, edit: &TaskEdit) -> Result<UpdateOutcome, StoreError> {
        let res = self
            .tasks()
            .update_one(doc! { "_id": id }, edit_update(edit)?)
            .await?;
        Ok(res.into())
    }
}
