use bson::{Document, doc};

use crate::sort::Sort;

/// A `find` against the books collection.
///
/// `filter` is the wire filter document; an empty document matches
/// everything. `skip`/`limit` are applied after `sort`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Vec<Sort>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(filter: Document) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    /// Inclusion projection over `fields`, with `_id` suppressed.
    pub fn project(mut self, fields: &[&str]) -> Self {
        let mut projection = doc! { "_id": 0 };
        for field in fields {
            projection.insert(*field, 1);
        }
        self.projection = Some(projection);
        self
    }

    pub fn sort_by(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    /// One page of `per_page` documents. Pages are 1-based; page 0 reads as page 1.
    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        self.skip = Some(page.saturating_sub(1).saturating_mul(per_page));
        self.limit = Some(i64::try_from(per_page).unwrap_or(i64::MAX));
        self
    }

    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            None
        } else {
            Some(Sort::to_document(&self.sort))
        }
    }
}
