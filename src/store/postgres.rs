use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use super::{generate_id, sanitize, Document, DocumentStore, Fields, StoreError, StoreResult};
use crate::entities::document;

/// Documents persisted as JSONB rows in the `document` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    db: DatabaseConnection,
}

impl PgDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, collection: &str, id: &str) -> StoreResult<Option<document::Model>> {
        let model = document::Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await?;
        Ok(model)
    }
}

fn into_document(model: document::Model) -> StoreResult<Document> {
    let data: Fields = serde_json::from_value(model.data)?;
    Ok(Document::new(model.id, data))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        document::Entity::find()
            .filter(document::Column::Collection.eq(collection))
            .order_by_asc(document::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.find(collection, id).await?.map(into_document).transpose()
    }

    async fn add(&self, collection: &str, data: Fields) -> StoreResult<String> {
        let id = generate_id();
        let now = Utc::now();

        let row = document::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.clone()),
            data: Set(Value::Object(sanitize(data))),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        row.insert(&self.db).await?;

        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()> {
        let now = Utc::now();

        let row = document::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.to_string()),
            data: Set(Value::Object(sanitize(data))),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        document::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([document::Column::Collection, document::Column::Id])
                    .update_columns([document::Column::Data, document::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let existing = self
            .find(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let mut merged: Fields = serde_json::from_value(existing.data.clone())?;
        merged.extend(sanitize(fields));

        let mut active: document::ActiveModel = existing.into();
        active.data = Set(Value::Object(merged));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let result = document::Entity::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
