#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bookstore_query::{DeleteOutcome, FindQuery, IndexSpec, UpdateOutcome};
use bookstore_store::{BookStore, MemoryStore, StoreError};
use bson::{Document, doc};

pub fn seed_books() -> Vec<Document> {
    vec![
        doc! { "title": "To Kill a Mockingbird", "author": "Harper Lee", "genre": "Fiction", "published_year": 1960, "price": 12.99, "in_stock": true },
        doc! { "title": "1984", "author": "George Orwell", "genre": "Dystopian", "published_year": 1949, "price": 10.99, "in_stock": true },
        doc! { "title": "The Great Gatsby", "author": "F. Scott Fitzgerald", "genre": "Fiction", "published_year": 1925, "price": 9.99, "in_stock": true },
        doc! { "title": "Animal Farm", "author": "George Orwell", "genre": "Political Satire", "published_year": 1945, "price": 8.5, "in_stock": false },
        doc! { "title": "Wuthering Heights", "author": "Emily Brontë", "genre": "Gothic Fiction", "published_year": 1847, "price": 1000, "in_stock": true },
        doc! { "title": "The Midnight Library", "author": "Matt Haig", "genre": "Fiction", "published_year": 2020, "price": 14.99, "in_stock": true },
        doc! { "title": "Tender Is the Night", "author": "F. Scott Fitzgerald", "genre": "Fiction", "published_year": 1934, "price": 11.5, "in_stock": false },
        doc! { "title": "Klara and the Sun", "author": "Kazuo Ishiguro", "genre": "Science Fiction", "published_year": 2021, "price": 16.0, "in_stock": false },
    ]
}

pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::with_namespace("plp_bookstore.books");
    store.insert_many(seed_books()).unwrap();
    store
}

/// The seed set plus one extra document appended at the end.
pub fn seeded_store_with(extra: Document) -> MemoryStore {
    let store = seeded_store();
    store.insert_many([extra]).unwrap();
    store
}

/// Delegates to a [`MemoryStore`] but fails every aggregation, and records
/// whether it was closed.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub closed: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new(inner: MemoryStore) -> (Self, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                inner,
                closed: closed.clone(),
            },
            closed,
        )
    }
}

impl BookStore for FailingStore {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        self.inner.find(query).await
    }

    async fn update_one(
        &self,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.inner.update_one(filter, update).await
    }

    async fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, StoreError> {
        self.inner.delete_one(filter).await
    }

    async fn aggregate(&self, _pipeline: &[Document]) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Storage("connection reset".into()))
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<String, StoreError> {
        self.inner.create_index(index).await
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_indexes().await
    }

    async fn explain(&self, filter: &Document) -> Result<Document, StoreError> {
        self.inner.explain(filter).await
    }

    async fn close(self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close().await
    }
}
