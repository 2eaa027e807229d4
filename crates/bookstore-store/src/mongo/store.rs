use bookstore_query::{DeleteOutcome, FindQuery, IndexSpec, UpdateOutcome};
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::BookStore;

/// A collection on a live server, reached through the async driver.
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Parse `uri`, build a client, and `ping` the server so an unreachable
    /// server fails here rather than on the first query.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!(%uri, %database, %collection, "connected");

        let database = client.database(database);
        let collection = database.collection::<Document>(collection);
        Ok(Self {
            client,
            database,
            collection,
        })
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database.name(), self.collection.name())
    }
}

impl BookStore for MongoStore {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        let mut find = self.collection.find(query.filter.clone());
        if let Some(projection) = &query.projection {
            find = find.projection(projection.clone());
        }
        if let Some(sort) = query.sort_document() {
            find = find.sort(sort);
        }
        if let Some(skip) = query.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_one(
        &self,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection
            .update_one(filter.clone(), update.clone())
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, StoreError> {
        let result = self.collection.delete_one(filter.clone()).await?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn aggregate(&self, pipeline: &[Document]) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.aggregate(pipeline.to_vec()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<String, StoreError> {
        let model = IndexModel::builder().keys(index.key_document()).build();
        let result = self.collection.create_index(model).await?;
        Ok(result.index_name)
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collection.list_index_names().await?)
    }

    async fn explain(&self, filter: &Document) -> Result<Document, StoreError> {
        let command = doc! {
            "explain": {
                "find": self.collection.name(),
                "filter": filter.clone(),
            },
            "verbosity": "executionStats",
        };
        Ok(self.database.run_command(command).await?)
    }

    async fn close(self) -> Result<(), StoreError> {
        debug!(namespace = %self.namespace(), "shutting down client");
        self.client.shutdown().await;
        info!("connection closed");
        Ok(())
    }
}
