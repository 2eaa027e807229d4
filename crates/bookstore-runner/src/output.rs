use crate::error::RunError;
use crate::step::StepOutput;

/// Pretty JSON for the console. BSON-specific values (object ids, dates)
/// come out in their extended-JSON form, e.g. `{"$oid": "..."}`.
pub fn render(output: &StepOutput) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_query::{Book, DeleteOutcome, UpdateOutcome};
    use bson::doc;

    #[test]
    fn books_render_as_array_without_absent_fields() {
        let out = render(&StepOutput::Books(vec![Book {
            title: Some("Emma".into()),
            price: Some(8.5),
            ..Default::default()
        }]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!([{ "title": "Emma", "price": 8.5 }]));
    }

    #[test]
    fn acknowledgements_render_as_objects() {
        let update = render(&StepOutput::Update(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        }))
        .unwrap();
        assert!(update.contains("\"matchedCount\": 1"), "{update}");

        let delete = render(&StepOutput::Delete(DeleteOutcome { deleted_count: 0 })).unwrap();
        assert!(delete.contains("\"deletedCount\": 0"), "{delete}");
    }

    #[test]
    fn index_name_renders_as_string() {
        assert_eq!(render(&StepOutput::Index("title_1".into())).unwrap(), "\"title_1\"");
    }

    #[test]
    fn plan_document_renders_nested() {
        let out = render(&StepOutput::Plan(doc! {
            "executionStats": { "nReturned": 1_i64 }
        }))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["executionStats"]["nReturned"], 1);
    }
}
