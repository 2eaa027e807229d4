use std::future::Future;

use bookstore_query::{DeleteOutcome, FindQuery, IndexSpec, UpdateOutcome};
use bson::Document;

use crate::error::StoreError;

/// A handle on one collection of book documents.
///
/// Every call is a single round trip; callers await each one before issuing
/// the next. `close` consumes the handle and releases the connection.
pub trait BookStore {
    fn find(
        &self,
        query: &FindQuery,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Apply `update` to the first document matching `filter`.
    fn update_one(
        &self,
        filter: &Document,
        update: &Document,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Remove the first document matching `filter`.
    fn delete_one(
        &self,
        filter: &Document,
    ) -> impl Future<Output = Result<DeleteOutcome, StoreError>> + Send;

    fn aggregate(
        &self,
        pipeline: &[Document],
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Create an index and return its name. Creating an index whose key
    /// pattern already exists returns the existing name.
    fn create_index(
        &self,
        index: &IndexSpec,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn list_indexes(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Execution-statistics plan for a `find` with `filter`.
    fn explain(
        &self,
        filter: &Document,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), StoreError>> + Send
    where
        Self: Sized;
}
