use bookstore_query::IndexSpec;
use bson::{Document, doc};

use super::filter::parse_filter;
use crate::error::StoreError;

/// Build an `executionStats`-verbosity plan for a `find` with `filter`.
///
/// An index is chosen when its leading key has an equality predicate in the
/// filter; the first such index in creation order wins. Without one the plan
/// is a collection scan.
pub(crate) fn explain(
    namespace: &str,
    docs: &[Document],
    indexes: &[IndexSpec],
    filter: &Document,
) -> Result<Document, StoreError> {
    let expr = parse_filter(filter)?;
    let returned = docs.iter().filter(|d| expr.matches(d)).count() as i64;
    let eq_fields = expr.equality_fields();

    let chosen = indexes
        .iter()
        .find(|index| index.leading_field().is_some_and(|f| eq_fields.contains(&f)));

    let (winning_plan, keys_examined, docs_examined) = match chosen {
        Some(index) => (
            doc! {
                "stage": "FETCH",
                "inputStage": {
                    "stage": "IXSCAN",
                    "keyPattern": index.key_document(),
                    "indexName": index.name(),
                    "direction": "forward",
                },
            },
            returned,
            returned,
        ),
        None => (
            doc! { "stage": "COLLSCAN", "filter": filter.clone(), "direction": "forward" },
            0,
            docs.len() as i64,
        ),
    };

    Ok(doc! {
        "queryPlanner": {
            "namespace": namespace,
            "parsedQuery": filter.clone(),
            "winningPlan": winning_plan,
            "rejectedPlans": [],
        },
        "executionStats": {
            "executionSuccess": true,
            "nReturned": returned,
            "executionTimeMillis": 0_i64,
            "totalKeysExamined": keys_examined,
            "totalDocsExamined": docs_examined,
        },
    })
}
