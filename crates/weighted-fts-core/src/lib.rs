//! Weighted FTS - PostgreSQL full-text search query construction.
//!
//! This crate turns a free-text search against a set of weighted columns into
//! one parameterized query fragment: a weighted document vector, a parsed
//! query bound to the search term, a `ts_rank_cd` ordering and an optional row
//! cap. It never talks to a database; the fragment goes to an executor.
//!
//! # Example
//!
//! ```rust,ignore
//! use weighted_fts::{FulltextConfig, NormalisationRequest, SearchOptions, TableSchema};
//!
//! let schema = TableSchema::new("articles")
//!     .column("id")
//!     .weighted_column("title", "A")
//!     .weighted_column("body", "C");
//!
//! // Fails here, not at query time, if nothing is weighted
//! let config = FulltextConfig::new(&schema)?;
//!
//! let options = SearchOptions::new()
//!     .normalisation(NormalisationRequest::from_names(["rank"]))
//!     .row_limit(10);
//! let fragment = config.search("cats", &options);
//!
//! let statement = fragment.to_select_sql("articles", &["id", "title"])?;
//! println!("{}", statement.sql);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod schema;
pub mod searchable;

// Re-export commonly used types
pub use config::{FulltextDefaults, PlaceholderStyle};
pub use error::{FtsError, IdentifierKind, Result};
pub use index::{
    BindValue, ColumnSpec, FulltextConfig, FulltextConfigBuilder, NormalisationFlag,
    NormalisationRequest, NormalisationTable, QueryFragment, RankExpression, SearchOptions,
    SearchRequest, Statement,
};
pub use schema::{ColumnAttributes, ColumnDefinition, SchemaSource, TableSchema, Weight};
pub use searchable::{RecordSet, SearchExecutor, Searchable};
