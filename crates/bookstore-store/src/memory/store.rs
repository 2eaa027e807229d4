use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bookstore_query::{Book, DeleteOutcome, FindQuery, IndexSpec, UpdateOutcome};
use bson::oid::ObjectId;
use bson::{Bson, Document};
use tracing::debug;

use super::compare::{sort_documents, values_equal};
use super::filter::parse_filter;
use super::{explain, pipeline, projection, update};
use crate::error::StoreError;
use crate::store::BookStore;

const ID_INDEX: &str = "_id_";

#[derive(Default)]
struct State {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

/// In-process collection. Documents are kept in insertion order, which is
/// the natural order `find` returns when no sort is given.
pub struct MemoryStore {
    namespace: String,
    state: RwLock<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_namespace("memory.books")
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            state: RwLock::new(State::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Storage(format!("state lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Storage(format!("state lock poisoned: {e}")))
    }

    /// Insert seed documents, assigning an `ObjectId` to any without `_id`.
    pub fn insert_many(
        &self,
        docs: impl IntoIterator<Item = Document>,
    ) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let mut inserted = 0;
        for mut doc in docs {
            let id = match doc.get("_id") {
                Some(id) => id.clone(),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    doc.insert("_id", id.clone());
                    id
                }
            };
            if state
                .documents
                .iter()
                .any(|d| d.get("_id").is_some_and(|existing| values_equal(existing, &id)))
            {
                return Err(StoreError::DuplicateKey(format!("_id: {id}")));
            }
            state.documents.push(doc);
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Insert typed books, e.g. fixtures built as [`Book`] values.
    pub fn insert_books(&self, books: &[Book]) -> Result<usize, StoreError> {
        let docs = books
            .iter()
            .map(Book::to_document)
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_many(docs)
    }

    /// Snapshot of every stored document in natural order.
    pub fn documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.read()?.documents.clone())
    }
}

impl BookStore for MemoryStore {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        let expr = parse_filter(&query.filter)?;
        let mut docs: Vec<Document> = self
            .read()?
            .documents
            .iter()
            .filter(|d| expr.matches(d))
            .cloned()
            .collect();

        sort_documents(&mut docs, &query.sort);

        let skip = usize::try_from(query.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        let docs = docs.into_iter().skip(skip);
        // A negative limit means "one batch of |n|"; zero means no limit.
        let docs: Vec<Document> = match query.limit {
            Some(n) if n != 0 => docs
                .take(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX))
                .collect(),
            _ => docs.collect(),
        };

        match &query.projection {
            Some(p) => docs
                .into_iter()
                .map(|d| projection::apply_projection(d, p))
                .collect(),
            None => Ok(docs),
        }
    }

    async fn update_one(
        &self,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let expr = parse_filter(filter)?;
        let mut state = self.write()?;
        let Some(doc) = state.documents.iter_mut().find(|d| expr.matches(d)) else {
            return Ok(UpdateOutcome::default());
        };
        let modified = update::apply_update(doc, update)?;
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: modified as u64,
            upserted_id: None,
        })
    }

    async fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, StoreError> {
        let expr = parse_filter(filter)?;
        let mut state = self.write()?;
        let deleted_count = match state.documents.iter().position(|d| expr.matches(d)) {
            Some(idx) => {
                state.documents.remove(idx);
                1
            }
            None => 0,
        };
        Ok(DeleteOutcome { deleted_count })
    }

    async fn aggregate(&self, pipeline: &[Document]) -> Result<Vec<Document>, StoreError> {
        let docs = self.documents()?;
        pipeline::run(docs, pipeline)
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<String, StoreError> {
        if index.keys.is_empty() {
            return Err(StoreError::InvalidQuery("index key pattern must not be empty".into()));
        }
        let mut state = self.write()?;
        if !state.indexes.contains(index) {
            state.indexes.push(index.clone());
        }
        Ok(index.name())
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        let state = self.read()?;
        let mut names = vec![ID_INDEX.to_string()];
        names.extend(state.indexes.iter().map(IndexSpec::name));
        Ok(names)
    }

    async fn explain(&self, filter: &Document) -> Result<Document, StoreError> {
        let state = self.read()?;
        explain::explain(&self.namespace, &state.documents, &state.indexes, filter)
    }

    async fn close(self) -> Result<(), StoreError> {
        debug!(namespace = %self.namespace, "memory store closed");
        Ok(())
    }
}
