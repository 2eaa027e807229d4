#![allow(dead_code)]

use bson::{Document, doc};

/// Eight books in a fixed natural order. Prices are ints where the seed
/// data had round numbers, matching how a shell-inserted seed looks.
pub fn seed_books() -> Vec<Document> {
    vec![
        doc! { "title": "To Kill a Mockingbird", "author": "Harper Lee", "genre": "Fiction", "published_year": 1960, "price": 12.99, "in_stock": true },
        doc! { "title": "1984", "author": "George Orwell", "genre": "Dystopian", "published_year": 1949, "price": 10.99, "in_stock": true },
        doc! { "title": "The Great Gatsby", "author": "F. Scott Fitzgerald", "genre": "Fiction", "published_year": 1925, "price": 9.99, "in_stock": true },
        doc! { "title": "Animal Farm", "author": "George Orwell", "genre": "Political Satire", "published_year": 1945, "price": 8.5, "in_stock": false },
        doc! { "title": "Wuthering Heights", "author": "Emily Brontë", "genre": "Gothic Fiction", "published_year": 1847, "price": 1000, "in_stock": true },
        doc! { "title": "The Midnight Library", "author": "Matt Haig", "genre": "Fiction", "published_year": 2020, "price": 14.99, "in_stock": true },
        doc! { "title": "Tender Is the Night", "author": "F. Scott Fitzgerald", "genre": "Fiction", "published_year": 1934, "price": 11.5, "in_stock": false },
        doc! { "title": "Klara and the Sun", "author": "Kazuo Ishiguro", "genre": "Science Fiction", "published_year": 2021, "price": 16.0, "in_stock": false },
    ]
}

pub fn titles(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.get_str("title").unwrap_or_default().to_string())
        .collect()
}
