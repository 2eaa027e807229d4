use bson::Document;

use crate::sort::{Sort, SortDirection};

/// Key pattern of a secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<Sort>,
}

impl IndexSpec {
    pub fn new(keys: impl IntoIterator<Item = (&'static str, SortDirection)>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(field, direction)| Sort {
                    field: field.to_string(),
                    direction,
                })
                .collect(),
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            keys: vec![Sort::asc(field)],
        }
    }

    /// Default name the server derives from the key pattern: `field_dir` pairs
    /// joined by `_`, e.g. `author_1_published_year_-1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("{}_{}", k.field, k.direction.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn key_document(&self) -> Document {
        Sort::to_document(&self.keys)
    }

    pub fn leading_field(&self) -> Option<&str> {
        self.keys.first().map(|k| k.field.as_str())
    }
}
