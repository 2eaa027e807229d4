use bson::{Bson, Document};
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

/// A document from the `books` collection.
///
/// The collection is schemaless, so every field is optional: a projection
/// or a sparse seed document decodes to a `Book` with the missing fields
/// left as `None`. Numeric fields accept any BSON number the store hands
/// back (`price` may come back as an int after an update, `published_year`
/// as a whole double from a shell or extended-JSON import).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(
        default,
        deserialize_with = "whole_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl Book {
    pub fn from_document(doc: Document) -> Result<Self, bson::de::Error> {
        bson::from_document(doc)
    }

    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

fn whole_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Bson>::deserialize(deserializer)? {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Int32(year)) => Ok(Some(year)),
        Some(Bson::Int64(year)) => i32::try_from(year)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("year {year} out of range"))),
        Some(Bson::Double(year))
            if year.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&year) =>
        {
            Ok(Some(year as i32))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a whole-number year, found {other}"
        ))),
    }
}
