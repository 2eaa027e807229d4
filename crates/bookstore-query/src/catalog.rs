//! The fixed set of queries the runner issues against the books collection.
//!
//! Everything here is a pure document builder, so the exact shape of what
//! goes over the wire can be asserted without a server.

use bson::{Document, doc};

use crate::index::IndexSpec;
use crate::query::FindQuery;
use crate::sort::{Sort, SortDirection};

pub const DATABASE: &str = "plp_bookstore";
pub const COLLECTION: &str = "books";

pub const GENRE: &str = "Fiction";
pub const PUBLISHED_AFTER: i32 = 1910;
pub const AUTHOR: &str = "F. Scott Fitzgerald";
pub const TITLE_TO_UPDATE: &str = "Wuthering Heights";
pub const NEW_PRICE: i32 = 1500;
pub const TITLE_TO_DELETE: &str = "To Kill a Mockingbird";
pub const IN_STOCK_AFTER: i32 = 2010;
pub const TITLE_TO_EXPLAIN: &str = "Wuthering Heights";
pub const PROJECTED_FIELDS: [&str; 3] = ["title", "author", "price"];

pub fn genre_filter(genre: &str) -> Document {
    doc! { "genre": genre }
}

pub fn published_after_filter(year: i32) -> Document {
    doc! { "published_year": { "$gt": year } }
}

pub fn author_filter(author: &str) -> Document {
    doc! { "author": author }
}

pub fn title_filter(title: &str) -> Document {
    doc! { "title": title }
}

pub fn in_stock_after_filter(year: i32) -> Document {
    doc! { "in_stock": true, "published_year": { "$gt": year } }
}

pub fn set_price_update(price: i32) -> Document {
    doc! { "$set": { "price": price } }
}

pub fn projected_books() -> FindQuery {
    FindQuery::all().project(&PROJECTED_FIELDS)
}

pub fn books_by_price(direction: SortDirection) -> FindQuery {
    FindQuery::all().sort_by(Sort {
        field: "price".into(),
        direction,
    })
}

pub fn books_page(page: u64, per_page: u64) -> FindQuery {
    FindQuery::all().page(page, per_page)
}

pub fn average_price_by_genre() -> Vec<Document> {
    vec![doc! { "$group": { "_id": "$genre", "avgPrice": { "$avg": "$price" } } }]
}

pub fn top_authors(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

/// Groups on `floor(published_year / 10)` and scales the key back up by ten
/// in the projection, so `1923` and `1925` share the `1920` bucket.
pub fn books_per_decade() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "$floor": { "$divide": ["$published_year", 10] } },
                "count": { "$sum": 1 },
            }
        },
        doc! {
            "$project": {
                "decade": { "$multiply": ["$_id", 10] },
                "count": 1,
                "_id": 0,
            }
        },
        doc! { "$sort": { "decade": 1 } },
    ]
}

pub fn title_index() -> IndexSpec {
    IndexSpec::ascending("title")
}

pub fn author_year_index() -> IndexSpec {
    IndexSpec::new([
        ("author", SortDirection::Asc),
        ("published_year", SortDirection::Desc),
    ])
}
