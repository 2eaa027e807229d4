use bson::{Bson, Document};

use crate::error::StoreError;

enum Mode {
    Include,
    Exclude,
}

fn flag(value: &Bson) -> Option<bool> {
    match value {
        Bson::Boolean(b) => Some(*b),
        Bson::Int32(n) => Some(*n != 0),
        Bson::Int64(n) => Some(*n != 0),
        Bson::Double(n) => Some(*n != 0.0),
        _ => None,
    }
}

/// Apply a `find` projection. Inclusion and exclusion cannot be mixed,
/// except that `_id` (kept by default) may be excluded from an inclusion.
pub(crate) fn apply_projection(doc: Document, projection: &Document) -> Result<Document, StoreError> {
    let mut keep_id = true;
    let mut mode: Option<Mode> = None;

    for (field, value) in projection {
        let include = flag(value).ok_or_else(|| {
            StoreError::InvalidQuery(format!("unsupported projection value for {field}"))
        })?;
        if field == "_id" {
            keep_id = include;
            continue;
        }
        match (&mode, include) {
            (None, true) => mode = Some(Mode::Include),
            (None, false) => mode = Some(Mode::Exclude),
            (Some(Mode::Include), false) | (Some(Mode::Exclude), true) => {
                return Err(StoreError::InvalidQuery(format!(
                    "cannot mix inclusion and exclusion in projection at {field}"
                )));
            }
            _ => {}
        }
    }

    let out = match mode {
        Some(Mode::Include) => doc
            .into_iter()
            .filter(|(k, _)| {
                if k == "_id" {
                    keep_id
                } else {
                    projection.get(k).and_then(flag).unwrap_or(false)
                }
            })
            .collect(),
        Some(Mode::Exclude) | None => doc
            .into_iter()
            .filter(|(k, _)| {
                if k == "_id" {
                    keep_id
                } else {
                    projection.get(k).and_then(flag).unwrap_or(true)
                }
            })
            .collect(),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn book() -> Document {
        doc! { "_id": 1, "title": "Emma", "author": "Jane Austen", "genre": "Romance", "price": 8.5 }
    }

    #[test]
    fn inclusion_without_id() {
        let out = apply_projection(
            book(),
            &doc! { "_id": 0, "title": 1, "author": 1, "price": 1 },
        )
        .unwrap();
        assert_eq!(out, doc! { "title": "Emma", "author": "Jane Austen", "price": 8.5 });
    }

    #[test]
    fn inclusion_keeps_id_by_default() {
        let out = apply_projection(book(), &doc! { "title": true }).unwrap();
        assert_eq!(out, doc! { "_id": 1, "title": "Emma" });
    }

    #[test]
    fn exclusion_drops_named_fields() {
        let out = apply_projection(book(), &doc! { "genre": 0, "price": 0 }).unwrap();
        assert_eq!(out, doc! { "_id": 1, "title": "Emma", "author": "Jane Austen" });
    }

    #[test]
    fn mixed_modes_error() {
        assert!(apply_projection(book(), &doc! { "title": 1, "price": 0 }).is_err());
    }
}
