mod book;
pub mod catalog;
mod index;
mod query;
mod result;
mod sort;

pub use book::Book;
pub use index::IndexSpec;
pub use query::FindQuery;
pub use result::{AuthorCount, DecadeCount, DeleteOutcome, GenreAveragePrice, UpdateOutcome};
pub use sort::{Sort, SortDirection};
