use bookstore_store::StoreError;

use crate::step::Step;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("connect failed: {0}")]
    Connect(#[source] StoreError),

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: StoreError,
    },

    #[error("{step} returned an unexpected shape: {source}")]
    Decode {
        step: Step,
        #[source]
        source: bson::de::Error,
    },

    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("close failed: {0}")]
    Close(#[source] StoreError),
}
