use std::fmt;

use bookstore_query::catalog::{self, AUTHOR, GENRE, IN_STOCK_AFTER, NEW_PRICE, PUBLISHED_AFTER};
use bookstore_query::{
    AuthorCount, Book, DecadeCount, DeleteOutcome, FindQuery, GenreAveragePrice, SortDirection,
    UpdateOutcome,
};
use bookstore_store::{BookStore, StoreError};
use bson::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::RunError;

/// One entry in the fixed run. Steps execute in [`Step::ALL`] order and
/// never branch on each other's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BooksInGenre,
    PublishedAfter,
    BooksByAuthor,
    UpdatePrice,
    DeleteBook,
    InStockRecent,
    Projection,
    SortByPriceAsc,
    SortByPriceDesc,
    Page,
    AveragePriceByGenre,
    TopAuthor,
    BooksPerDecade,
    TitleIndex,
    AuthorYearIndex,
    ExplainTitleSearch,
}

impl Step {
    pub const ALL: [Step; 16] = [
        Step::BooksInGenre,
        Step::PublishedAfter,
        Step::BooksByAuthor,
        Step::UpdatePrice,
        Step::DeleteBook,
        Step::InStockRecent,
        Step::Projection,
        Step::SortByPriceAsc,
        Step::SortByPriceDesc,
        Step::Page,
        Step::AveragePriceByGenre,
        Step::TopAuthor,
        Step::BooksPerDecade,
        Step::TitleIndex,
        Step::AuthorYearIndex,
        Step::ExplainTitleSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::BooksInGenre => "books_in_genre",
            Step::PublishedAfter => "published_after",
            Step::BooksByAuthor => "books_by_author",
            Step::UpdatePrice => "update_price",
            Step::DeleteBook => "delete_book",
            Step::InStockRecent => "in_stock_recent",
            Step::Projection => "projection",
            Step::SortByPriceAsc => "sort_by_price_asc",
            Step::SortByPriceDesc => "sort_by_price_desc",
            Step::Page => "page",
            Step::AveragePriceByGenre => "average_price_by_genre",
            Step::TopAuthor => "top_author",
            Step::BooksPerDecade => "books_per_decade",
            Step::TitleIndex => "title_index",
            Step::AuthorYearIndex => "author_year_index",
            Step::ExplainTitleSearch => "explain_title_search",
        }
    }

    /// Console header printed before the step runs.
    pub fn label(self, config: &Config) -> String {
        match self {
            Step::BooksInGenre => format!("Books in genre '{GENRE}':"),
            Step::PublishedAfter => format!("Books published after {PUBLISHED_AFTER}:"),
            Step::BooksByAuthor => format!("Books by '{AUTHOR}':"),
            Step::UpdatePrice => format!("Updating price for '{}'...", catalog::TITLE_TO_UPDATE),
            Step::DeleteBook => format!("Deleting '{}'...", catalog::TITLE_TO_DELETE),
            Step::InStockRecent => format!("Books in stock & published after {IN_STOCK_AFTER}:"),
            Step::Projection => "Projection (title, author, price):".to_string(),
            Step::SortByPriceAsc => "Books sorted by price (ascending):".to_string(),
            Step::SortByPriceDesc => "Books sorted by price (descending):".to_string(),
            Step::Page => format!(
                "Books page {} ({} per page):",
                config.page, config.page_size
            ),
            Step::AveragePriceByGenre => "Average price by genre:".to_string(),
            Step::TopAuthor => "Author with the most books:".to_string(),
            Step::BooksPerDecade => "Books grouped by publication decade:".to_string(),
            Step::TitleIndex => "Creating index on title...".to_string(),
            Step::AuthorYearIndex => {
                "Creating compound index on author + published_year...".to_string()
            }
            Step::ExplainTitleSearch => "Explain() on title search (with index):".to_string(),
        }
    }

    pub async fn execute<S: BookStore>(
        self,
        store: &S,
        config: &Config,
    ) -> Result<StepOutput, RunError> {
        let output = match self {
            Step::BooksInGenre => {
                self.books(store, FindQuery::filter(catalog::genre_filter(GENRE)))
                    .await?
            }
            Step::PublishedAfter => {
                self.books(
                    store,
                    FindQuery::filter(catalog::published_after_filter(PUBLISHED_AFTER)),
                )
                .await?
            }
            Step::BooksByAuthor => {
                self.books(store, FindQuery::filter(catalog::author_filter(AUTHOR)))
                    .await?
            }
            Step::UpdatePrice => StepOutput::Update(
                store
                    .update_one(
                        &catalog::title_filter(catalog::TITLE_TO_UPDATE),
                        &catalog::set_price_update(NEW_PRICE),
                    )
                    .await
                    .map_err(|e| self.failed(e))?,
            ),
            Step::DeleteBook => StepOutput::Delete(
                store
                    .delete_one(&catalog::title_filter(catalog::TITLE_TO_DELETE))
                    .await
                    .map_err(|e| self.failed(e))?,
            ),
            Step::InStockRecent => {
                self.books(
                    store,
                    FindQuery::filter(catalog::in_stock_after_filter(IN_STOCK_AFTER)),
                )
                .await?
            }
            Step::Projection => self.books(store, catalog::projected_books()).await?,
            Step::SortByPriceAsc => {
                self.books(store, catalog::books_by_price(SortDirection::Asc))
                    .await?
            }
            Step::SortByPriceDesc => {
                self.books(store, catalog::books_by_price(SortDirection::Desc))
                    .await?
            }
            Step::Page => {
                self.books(store, catalog::books_page(config.page, config.page_size))
                    .await?
            }
            Step::AveragePriceByGenre => StepOutput::GenrePrices(
                self.aggregate(store, &catalog::average_price_by_genre())
                    .await?,
            ),
            Step::TopAuthor => {
                StepOutput::Authors(self.aggregate(store, &catalog::top_authors(1)).await?)
            }
            Step::BooksPerDecade => {
                StepOutput::Decades(self.aggregate(store, &catalog::books_per_decade()).await?)
            }
            Step::TitleIndex => StepOutput::Index(
                store
                    .create_index(&catalog::title_index())
                    .await
                    .map_err(|e| self.failed(e))?,
            ),
            Step::AuthorYearIndex => StepOutput::Index(
                store
                    .create_index(&catalog::author_year_index())
                    .await
                    .map_err(|e| self.failed(e))?,
            ),
            Step::ExplainTitleSearch => StepOutput::Plan(
                store
                    .explain(&catalog::title_filter(catalog::TITLE_TO_EXPLAIN))
                    .await
                    .map_err(|e| self.failed(e))?,
            ),
        };
        Ok(output)
    }

    fn failed(self, source: StoreError) -> RunError {
        RunError::Step { step: self, source }
    }

    async fn books<S: BookStore>(self, store: &S, query: FindQuery) -> Result<StepOutput, RunError> {
        let docs = store.find(&query).await.map_err(|e| self.failed(e))?;
        Ok(StepOutput::Books(self.decode(docs)?))
    }

    async fn aggregate<S: BookStore, T: DeserializeOwned>(
        self,
        store: &S,
        pipeline: &[Document],
    ) -> Result<Vec<T>, RunError> {
        let docs = store.aggregate(pipeline).await.map_err(|e| self.failed(e))?;
        self.decode(docs)
    }

    fn decode<T: DeserializeOwned>(self, docs: Vec<Document>) -> Result<Vec<T>, RunError> {
        docs.into_iter()
            .map(|d| bson::from_document(d).map_err(|source| RunError::Decode { step: self, source }))
            .collect()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed result of a step, serialized as-is for the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutput {
    Books(Vec<Book>),
    Update(UpdateOutcome),
    Delete(DeleteOutcome),
    GenrePrices(Vec<GenreAveragePrice>),
    Authors(Vec<AuthorCount>),
    Decades(Vec<DecadeCount>),
    Index(String),
    Plan(Document),
}
