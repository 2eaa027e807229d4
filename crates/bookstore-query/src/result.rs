use bson::Bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<Bson>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Row of the average-price-by-genre pipeline. `genre` is `None` for the
/// group of documents with no genre; `avg_price` is `None` when none of the
/// group's prices are numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreAveragePrice {
    #[serde(rename = "_id")]
    pub genre: Option<String>,
    #[serde(rename = "avgPrice")]
    pub avg_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorCount {
    #[serde(rename = "_id")]
    pub author: Option<String>,
    pub count: i64,
}

/// Row of the books-per-decade pipeline. The decade is computed server-side
/// with floating point division, so it comes back as a double; books with no
/// numeric `published_year` land in a `None` decade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeCount {
    pub decade: Option<f64>,
    pub count: i64,
}
