use bson::{Bson, Document};

use super::expression::{Number, add};
use crate::error::StoreError;

/// Apply an operator update (`$set`, `$unset`, `$inc`) to `doc`.
/// Operators run against a copy that replaces `doc` only when every one
/// succeeds. Returns whether the document changed.
pub(crate) fn apply_update(doc: &mut Document, update: &Document) -> Result<bool, StoreError> {
    if update.is_empty() {
        return Err(StoreError::InvalidQuery("update document must not be empty".into()));
    }

    let mut next = doc.clone();

    for (op, fields) in update {
        let fields = match fields {
            Bson::Document(fields) => fields,
            _ if !op.starts_with('$') => {
                return Err(StoreError::InvalidQuery(
                    "update document requires atomic operators".into(),
                ));
            }
            _ => {
                return Err(StoreError::InvalidQuery(format!(
                    "{op} value must be a document"
                )));
            }
        };

        for (field, value) in fields {
            if field == "_id" {
                return Err(StoreError::InvalidQuery(
                    "performing an update on _id is not allowed".into(),
                ));
            }
            if field.contains('.') {
                return Err(StoreError::InvalidQuery(format!(
                    "nested update paths are not supported: {field}"
                )));
            }

            match op.as_str() {
                "$set" => {
                    next.insert(field.clone(), value.clone());
                }
                "$unset" => {
                    next.remove(field);
                }
                "$inc" => {
                    let delta = Number::from_bson(value).ok_or_else(|| {
                        StoreError::InvalidQuery(format!("cannot increment by non-numeric {value}"))
                    })?;
                    let current = match next.get(field) {
                        None => Number::Int32(0),
                        Some(existing) => Number::from_bson(existing).ok_or_else(|| {
                            StoreError::InvalidQuery(format!(
                                "cannot increment non-numeric field {field}"
                            ))
                        })?,
                    };
                    next.insert(field.clone(), add(current, delta).into_bson());
                }
                k if k.starts_with('$') => {
                    return Err(StoreError::InvalidQuery(format!("unknown update operator: {k}")));
                }
                _ => {
                    return Err(StoreError::InvalidQuery(
                        "update document requires atomic operators".into(),
                    ));
                }
            }
        }
    }

    let changed = next != *doc;
    *doc = next;
    Ok(changed)
}
