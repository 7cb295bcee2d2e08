mod api;
pub mod args;
pub mod buckets;
mod cache;
pub mod commands;
mod config;
mod error;
pub mod filters;
mod loader;
pub mod model;
pub mod report;
mod snapshot;
mod utils;


pub use api::{
    fetch_transactions, CsvSheet, Mode, Sheet, TestSheet, DEFAULT_COLUMNS, DEFAULT_WORKSHEET,
    TEST_MODE_ENV,
};
pub use cache::{CacheKey, DataCache, DEFAULT_TTL_MINUTES};
pub use config::{Config, DataSource};
pub use error::{Error, NotMonday, Result};
pub use loader::Loader;
pub use snapshot::Snapshot;
