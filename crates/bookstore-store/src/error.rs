use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    #[cfg(feature = "mongodb")]
    Driver(mongodb::error::Error),
    InvalidQuery(String),
    DuplicateKey(String),
    Serialization(String),
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "mongodb")]
            StoreError::Driver(e) => write!(f, "driver error: {e}"),
            StoreError::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
            StoreError::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StoreError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "mongodb")]
            StoreError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Driver(e)
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(e: bson::ser::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(e: bson::de::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
