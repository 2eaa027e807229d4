use std::cmp::Ordering;

use bson::{Bson, Document};

use super::compare::{compare_values, get_path, same_bracket, values_equal};
use crate::error::StoreError;

/// A parsed filter document.
///
/// Owns field names and values so the expression can be evaluated against
/// any number of documents after parsing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Eq(String, Bson),
    Ne(String, Bson),
    Gt(String, Bson),
    Gte(String, Bson),
    Lt(String, Bson),
    Lte(String, Bson),
    In(String, Vec<Bson>),
    Exists(String, bool),
}

impl Expression {
    pub(crate) fn matches(&self, doc: &Document) -> bool {
        matches(doc, self)
    }

    /// Fields constrained by a top-level equality, for index selection.
    pub(crate) fn equality_fields(&self) -> Vec<&str> {
        match self {
            Expression::Eq(field, _) => vec![field.as_str()],
            Expression::And(children) => children
                .iter()
                .filter_map(|c| match c {
                    Expression::Eq(field, _) => Some(field.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Parse a filter document. An empty document matches every document.
pub(crate) fn parse_filter(doc: &Document) -> Result<Expression, StoreError> {
    let mut children = Vec::with_capacity(doc.len());

    for (key, value) in doc {
        match key.as_str() {
            "$and" => children.push(Expression::And(parse_logical_array(key, value)?)),
            "$or" => children.push(Expression::Or(parse_logical_array(key, value)?)),
            k if k.starts_with('$') => {
                return Err(StoreError::InvalidQuery(format!(
                    "unknown top-level operator: {k}"
                )));
            }
            _ => children.push(parse_field_condition(key, value)?),
        }
    }

    if children.len() == 1 {
        Ok(children.remove(0))
    } else {
        Ok(Expression::And(children))
    }
}

fn parse_logical_array(op: &str, value: &Bson) -> Result<Vec<Expression>, StoreError> {
    let items = match value {
        Bson::Array(items) if !items.is_empty() => items,
        Bson::Array(_) => {
            return Err(StoreError::InvalidQuery(format!(
                "{op} array must not be empty"
            )));
        }
        _ => return Err(StoreError::InvalidQuery(format!("{op} value must be an array"))),
    };

    items
        .iter()
        .map(|item| match item {
            Bson::Document(sub) => parse_filter(sub),
            _ => Err(StoreError::InvalidQuery(format!(
                "{op} array elements must be documents"
            ))),
        })
        .collect()
}

/// Either an implicit `$eq` or an operator sub-document like
/// `{ "$gt": 21, "$lte": 100 }`.
fn parse_field_condition(field: &str, value: &Bson) -> Result<Expression, StoreError> {
    let ops = match value {
        Bson::Document(sub) if sub.keys().next().is_some_and(|k| k.starts_with('$')) => sub,
        _ => return Ok(Expression::Eq(field.to_string(), value.clone())),
    };

    let mut conditions = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let field = field.to_string();
        let expr = match op.as_str() {
            "$eq" => Expression::Eq(field, operand.clone()),
            "$ne" => Expression::Ne(field, operand.clone()),
            "$gt" => Expression::Gt(field, operand.clone()),
            "$gte" => Expression::Gte(field, operand.clone()),
            "$lt" => Expression::Lt(field, operand.clone()),
            "$lte" => Expression::Lte(field, operand.clone()),
            "$in" => match operand {
                Bson::Array(values) => Expression::In(field, values.clone()),
                _ => return Err(StoreError::InvalidQuery("$in value must be an array".into())),
            },
            "$exists" => match operand {
                Bson::Boolean(b) => Expression::Exists(field, *b),
                _ => {
                    return Err(StoreError::InvalidQuery(
                        "$exists value must be a boolean".into(),
                    ));
                }
            },
            k => return Err(StoreError::InvalidQuery(format!("unknown field operator: {k}"))),
        };
        conditions.push(expr);
    }

    if conditions.len() == 1 {
        Ok(conditions.remove(0))
    } else {
        Ok(Expression::And(conditions))
    }
}

fn matches(doc: &Document, expr: &Expression) -> bool {
    match expr {
        Expression::And(children) => children.iter().all(|c| matches(doc, c)),
        Expression::Or(children) => children.iter().any(|c| matches(doc, c)),
        Expression::Eq(field, val) => field_eq(get_path(doc, field), val),
        Expression::Ne(field, val) => !field_eq(get_path(doc, field), val),
        Expression::In(field, vals) => {
            let stored = get_path(doc, field);
            vals.iter().any(|v| field_eq(stored, v))
        }
        Expression::Gt(field, val)
        | Expression::Gte(field, val)
        | Expression::Lt(field, val)
        | Expression::Lte(field, val) => {
            let predicate: fn(Ordering) -> bool = match expr {
                Expression::Gt(..) => |o| o == Ordering::Greater,
                Expression::Gte(..) => |o| o != Ordering::Less,
                Expression::Lt(..) => |o| o == Ordering::Less,
                _ => |o| o != Ordering::Greater,
            };
            match get_path(doc, field) {
                Some(Bson::Array(items)) => items.iter().any(|v| range_match(v, val, predicate)),
                Some(v) => range_match(v, val, predicate),
                None => false,
            }
        }
        // Presence only: an explicit null still counts as existing.
        Expression::Exists(field, expected) => get_path(doc, field).is_some() == *expected,
    }
}

/// `null` matches both a missing field and an explicit null. Array fields
/// match if any element (or the whole array) equals the value.
fn field_eq(stored: Option<&Bson>, val: &Bson) -> bool {
    match (stored, val) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), _) if !matches!(val, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, val))
        }
        (Some(v), _) => values_equal(v, val),
    }
}

/// Range predicates only hold between values of the same type bracket:
/// `{ price: { $gt: 10 } }` never matches a string price.
fn range_match(stored: &Bson, val: &Bson, predicate: fn(Ordering) -> bool) -> bool {
    same_bracket(stored, val) && predicate(compare_values(Some(stored), Some(val)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn book() -> Document {
        doc! {
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "published_year": 1925,
            "price": 10.99,
            "in_stock": true,
            "tags": ["classic", "jazz-age"],
        }
    }

    #[test]
    fn bare_field_is_implicit_eq() {
        let expr = parse_filter(&doc! { "genre": "Fiction" }).unwrap();
        assert_eq!(expr, Expression::Eq("genre".into(), Bson::String("Fiction".into())));
    }

    #[test]
    fn multiple_bare_fields_become_and() {
        let expr = parse_filter(&doc! { "in_stock": true, "published_year": { "$gt": 2010 } })
            .unwrap();
        match expr {
            Expression::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(std::matches!(&children[1], Expression::Gt(f, _) if f == "published_year"));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let expr = parse_filter(&doc! {}).unwrap();
        assert!(expr.matches(&book()));
        assert!(expr.matches(&doc! {}));
    }

    #[test]
    fn gt_compares_across_numeric_types() {
        let expr = parse_filter(&doc! { "published_year": { "$gt": 1910_i64 } }).unwrap();
        assert!(expr.matches(&book()));
        let expr = parse_filter(&doc! { "price": { "$lte": 10.99 } }).unwrap();
        assert!(expr.matches(&book()));
    }

    #[test]
    fn range_never_matches_other_types() {
        let expr = parse_filter(&doc! { "title": { "$gt": 0 } }).unwrap();
        assert!(!expr.matches(&book()));
    }

    #[test]
    fn null_matches_missing() {
        let expr = parse_filter(&doc! { "genre": null }).unwrap();
        assert!(expr.matches(&book()));
        let expr = parse_filter(&doc! { "genre": { "$exists": false } }).unwrap();
        assert!(expr.matches(&book()));
    }

    #[test]
    fn eq_reaches_into_arrays() {
        let expr = parse_filter(&doc! { "tags": "classic" }).unwrap();
        assert!(expr.matches(&book()));
        let expr = parse_filter(&doc! { "tags": { "$in": ["modern", "jazz-age"] } }).unwrap();
        assert!(expr.matches(&book()));
    }

    #[test]
    fn or_and_ne() {
        let expr = parse_filter(&doc! {
            "$or": [{ "author": "Jane Austen" }, { "in_stock": { "$ne": false } }]
        })
        .unwrap();
        assert!(expr.matches(&book()));
    }

    #[test]
    fn unknown_operators_error() {
        let err = parse_filter(&doc! { "$nor": [{ "a": 1 }] }).unwrap_err();
        assert!(err.to_string().contains("unknown top-level operator"), "{err}");
        let err = parse_filter(&doc! { "a": { "$between": 1 } }).unwrap_err();
        assert!(err.to_string().contains("unknown field operator"), "{err}");
    }

    #[test]
    fn equality_fields_for_index_selection() {
        let expr = parse_filter(&doc! { "title": "Emma", "price": { "$gt": 1 } }).unwrap();
        assert_eq!(expr.equality_fields(), vec!["title"]);
    }
}
