//! Search capability for record sets.
//!
//! An entity becomes searchable by supplying a [`FulltextConfig`] and an
//! executor that runs assembled fragments. Nothing in this crate executes SQL;
//! the executor is the caller's database layer.

use crate::index::{FulltextConfig, QueryFragment, SearchOptions};

/// Runs assembled search fragments against the database.
pub trait SearchExecutor: Send + Sync {
    type Row;
    type Error;

    /// Execute `fragment` and return the matching rows, best rank first.
    fn execute(&self, fragment: &QueryFragment) -> Result<Vec<Self::Row>, Self::Error>;
}

/// Capability of a record set that supports weighted full-text search.
pub trait Searchable {
    type Executor: SearchExecutor;

    fn fulltext_config(&self) -> &FulltextConfig;

    fn executor(&self) -> &Self::Executor;

    /// Assemble a search for `term` and hand it to the executor.
    fn fulltext_search(
        &self,
        term: &str,
        options: &SearchOptions,
    ) -> Result<Vec<<Self::Executor as SearchExecutor>::Row>, <Self::Executor as SearchExecutor>::Error>
    {
        let fragment = self.fulltext_config().search(term, options);
        self.executor().execute(&fragment)
    }
}

/// A configuration paired with an executor.
pub struct RecordSet<E> {
    config: FulltextConfig,
    executor: E,
}

impl<E: SearchExecutor> RecordSet<E> {
    pub fn new(config: FulltextConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn into_parts(self) -> (FulltextConfig, E) {
        (self.config, self.executor)
    }
}

impl<E: SearchExecutor> Searchable for RecordSet<E> {
    type Executor = E;

    fn fulltext_config(&self) -> &FulltextConfig {
        &self.config
    }

    fn executor(&self) -> &E {
        &self.executor
    }
}
