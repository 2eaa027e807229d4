use bookstore_query::Sort;
use bson::{Bson, Document};

use super::compare::{compare_values, sort_documents, values_equal};
use super::expression::{Number, add, evaluate};
use super::filter::parse_filter;
use crate::error::StoreError;

/// Run an aggregation pipeline over `docs` (in natural order).
pub(crate) fn run(mut docs: Vec<Document>, pipeline: &[Document]) -> Result<Vec<Document>, StoreError> {
    for stage in pipeline {
        let mut iter = stage.iter();
        let (name, spec) = match (iter.next(), iter.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(StoreError::InvalidQuery(
                    "a pipeline stage specification object must contain exactly one field".into(),
                ));
            }
        };

        docs = match name.as_str() {
            "$match" => {
                let expr = parse_filter(stage_document(name, spec)?)?;
                docs.into_iter().filter(|d| expr.matches(d)).collect()
            }
            "$group" => group(docs, stage_document(name, spec)?)?,
            "$sort" => {
                let sorts = Sort::from_document(stage_document(name, spec)?)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        StoreError::InvalidQuery("$sort key ordering must be 1 or -1".into())
                    })?;
                sort_documents(&mut docs, &sorts);
                docs
            }
            "$skip" => {
                let n = count_arg(name, spec)?;
                docs.into_iter().skip(n).collect()
            }
            "$limit" => {
                let n = count_arg(name, spec)?;
                if n == 0 {
                    return Err(StoreError::InvalidQuery("the limit must be positive".into()));
                }
                docs.truncate(n);
                docs
            }
            "$project" => {
                let spec = stage_document(name, spec)?;
                docs.iter()
                    .map(|d| project(d, spec))
                    .collect::<Result<Vec<_>, _>>()?
            }
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "unrecognized pipeline stage name: {other}"
                )));
            }
        };
    }
    Ok(docs)
}

fn stage_document<'a>(name: &str, spec: &'a Bson) -> Result<&'a Document, StoreError> {
    match spec {
        Bson::Document(d) => Ok(d),
        _ => Err(StoreError::InvalidQuery(format!(
            "the {name} stage specification must be an object"
        ))),
    }
}

fn count_arg(name: &str, spec: &Bson) -> Result<usize, StoreError> {
    let n = match spec {
        Bson::Int32(n) => *n as i64,
        Bson::Int64(n) => *n,
        Bson::Double(n) if n.fract() == 0.0 => *n as i64,
        _ => {
            return Err(StoreError::InvalidQuery(format!(
                "{name} argument must be an integer"
            )));
        }
    };
    usize::try_from(n).map_err(|_| {
        StoreError::InvalidQuery(format!("{name} argument must be non-negative"))
    })
}

enum Accumulator {
    Sum(Number),
    Avg { total: f64, count: u64 },
    Min(Option<Bson>),
    Max(Option<Bson>),
}

impl Accumulator {
    fn new(op: &str) -> Result<Self, StoreError> {
        match op {
            "$sum" => Ok(Accumulator::Sum(Number::Int32(0))),
            "$avg" => Ok(Accumulator::Avg { total: 0.0, count: 0 }),
            "$min" => Ok(Accumulator::Min(None)),
            "$max" => Ok(Accumulator::Max(None)),
            other => Err(StoreError::InvalidQuery(format!("unknown group operator: {other}"))),
        }
    }

    /// Non-numeric values are skipped by `$sum`/`$avg`; nulls are skipped by
    /// `$min`/`$max`.
    fn push(&mut self, value: Bson) {
        match self {
            Accumulator::Sum(total) => {
                if let Some(n) = Number::from_bson(&value) {
                    *total = add(*total, n);
                }
            }
            Accumulator::Avg { total, count } => {
                if let Some(n) = Number::from_bson(&value) {
                    *total += n.as_f64();
                    *count += 1;
                }
            }
            Accumulator::Min(_) | Accumulator::Max(_) if value == Bson::Null => {}
            Accumulator::Min(current) => {
                if current
                    .as_ref()
                    .is_none_or(|c| compare_values(Some(&value), Some(c)).is_lt())
                {
                    *current = Some(value);
                }
            }
            Accumulator::Max(current) => {
                if current
                    .as_ref()
                    .is_none_or(|c| compare_values(Some(&value), Some(c)).is_gt())
                {
                    *current = Some(value);
                }
            }
        }
    }

    fn finish(self) -> Bson {
        match self {
            Accumulator::Sum(total) => total.into_bson(),
            Accumulator::Avg { count: 0, .. } => Bson::Null,
            Accumulator::Avg { total, count } => Bson::Double(total / count as f64),
            Accumulator::Min(v) | Accumulator::Max(v) => v.unwrap_or(Bson::Null),
        }
    }
}

struct Group {
    key: Bson,
    accumulators: Vec<(String, Accumulator)>,
}

/// `$group`: one output document per distinct `_id` value, in order of
/// first appearance.
fn group(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, StoreError> {
    let key_expr = spec.get("_id").ok_or_else(|| {
        StoreError::InvalidQuery("a group specification must include an _id".into())
    })?;

    let mut fields: Vec<(&str, &str, &Bson)> = Vec::new();
    for (name, acc) in spec {
        if name == "_id" {
            continue;
        }
        let acc = match acc {
            Bson::Document(d) if d.len() == 1 => d,
            _ => {
                return Err(StoreError::InvalidQuery(format!(
                    "the field '{name}' must be an accumulator object"
                )));
            }
        };
        if let Some((op, arg)) = acc.iter().next() {
            Accumulator::new(op)?;
            fields.push((name.as_str(), op.as_str(), arg));
        }
    }

    let mut groups: Vec<Group> = Vec::new();
    for doc in &docs {
        let key = evaluate(key_expr, doc)?;
        let idx = match groups.iter().position(|g| values_equal(&g.key, &key)) {
            Some(idx) => idx,
            None => {
                let accumulators = fields
                    .iter()
                    .map(|(name, op, _)| Accumulator::new(op).map(|a| (name.to_string(), a)))
                    .collect::<Result<Vec<_>, _>>()?;
                groups.push(Group { key, accumulators });
                groups.len() - 1
            }
        };
        for ((_, _, arg), (_, acc)) in fields.iter().zip(groups[idx].accumulators.iter_mut()) {
            acc.push(evaluate(arg, doc)?);
        }
    }

    Ok(groups
        .into_iter()
        .map(|g| {
            let mut out = Document::new();
            out.insert("_id", g.key);
            for (name, acc) in g.accumulators {
                out.insert(name, acc.finish());
            }
            out
        })
        .collect())
}

fn include_flag(value: &Bson) -> Option<bool> {
    match value {
        Bson::Boolean(b) => Some(*b),
        Bson::Int32(n) => Some(*n != 0),
        Bson::Int64(n) => Some(*n != 0),
        Bson::Double(n) => Some(*n != 0.0),
        _ => None,
    }
}

/// `$project`: inclusion flags, computed fields, or a pure exclusion.
/// `_id` is kept unless excluded explicitly.
fn project(doc: &Document, spec: &Document) -> Result<Document, StoreError> {
    let exclusion = spec
        .iter()
        .filter(|(k, _)| *k != "_id")
        .all(|(_, v)| include_flag(v) == Some(false))
        && spec.keys().any(|k| k != "_id");

    if exclusion {
        let mut out = doc.clone();
        for (k, v) in spec {
            if include_flag(v) == Some(false) {
                out.remove(k);
            }
        }
        return Ok(out);
    }

    let mut out = Document::new();
    let keep_id = spec.get("_id").map_or(true, |v| include_flag(v) != Some(false));
    if keep_id {
        match spec.get("_id") {
            Some(v) if include_flag(v).is_none() => {
                out.insert("_id", evaluate(v, doc)?);
            }
            _ => {
                if let Some(id) = doc.get("_id") {
                    out.insert("_id", id.clone());
                }
            }
        }
    }

    for (field, value) in spec {
        if field == "_id" {
            continue;
        }
        match include_flag(value) {
            Some(true) => {
                if let Some(v) = doc.get(field) {
                    out.insert(field.clone(), v.clone());
                }
            }
            Some(false) => {
                return Err(StoreError::InvalidQuery(format!(
                    "cannot do exclusion on field {field} in inclusion projection"
                )));
            }
            None => {
                out.insert(field.clone(), evaluate(value, doc)?);
            }
        }
    }
    Ok(out)
}
