//! Weighted full-text search query construction.
//!
//! This module provides:
//! - Resolution of weighted columns from schema metadata
//! - Rank normalisation bitmask encoding
//! - Vector, query and rank expression building
//! - Assembly of the filter, ordering and row cap for one search

mod expr;
mod fulltext;
mod normalisation;
mod query;
mod rank;
mod resolver;
mod search;
mod vector;

pub use expr::{BindValue, Bindings, SqlClause, SqlNode, SqlWriter};
pub use fulltext::{FulltextConfig, FulltextConfigBuilder};
pub use normalisation::{NormalisationFlag, NormalisationRequest, NormalisationTable};
pub use query::{build_query, QueryExpr};
pub use rank::{build_rank, RankExpr, RankExpression};
pub use resolver::{resolve_column_specs, ColumnSpec};
pub use search::{QueryFragment, SearchOptions, SearchRequest, Statement};
pub use vector::{build_vector, VectorExpr};
