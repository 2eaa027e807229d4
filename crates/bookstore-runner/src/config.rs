use std::str::FromStr;

use bookstore_query::catalog;
use tracing::warn;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Where to connect and which page to read. Every field has a default, so
/// the runner works with no environment at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub page: u64,
    pub page_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: catalog::DATABASE.to_string(),
            collection: catalog::COLLECTION.to_string(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Read `BOOKSTORE_URI`, `BOOKSTORE_DB`, `BOOKSTORE_COLLECTION`,
    /// `BOOKSTORE_PAGE` and `BOOKSTORE_PAGE_SIZE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            uri: lookup("BOOKSTORE_URI").unwrap_or(defaults.uri),
            database: lookup("BOOKSTORE_DB").unwrap_or(defaults.database),
            collection: lookup("BOOKSTORE_COLLECTION").unwrap_or(defaults.collection),
            page: parse_or(&lookup, "BOOKSTORE_PAGE", defaults.page, |_| true),
            page_size: parse_or(&lookup, "BOOKSTORE_PAGE_SIZE", defaults.page_size, |n| *n > 0),
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(%key, value = %raw, %default, "ignoring invalid value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "plp_bookstore");
        assert_eq!(config.collection, "books");
        assert_eq!((config.page, config.page_size), (1, 5));
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup(&[
            ("BOOKSTORE_URI", "mongodb://db:27018"),
            ("BOOKSTORE_DB", "shop"),
            ("BOOKSTORE_PAGE", "2"),
            ("BOOKSTORE_PAGE_SIZE", " 10 "),
        ]));
        assert_eq!(config.uri, "mongodb://db:27018");
        assert_eq!(config.database, "shop");
        assert_eq!(config.collection, "books");
        assert_eq!((config.page, config.page_size), (2, 10));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("BOOKSTORE_PAGE", "two"),
            ("BOOKSTORE_PAGE_SIZE", "0"),
        ]));
        assert_eq!((config.page, config.page_size), (1, 5));
    }
}
