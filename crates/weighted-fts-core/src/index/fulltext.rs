//! Validated full-text search configuration for one entity.

use super::expr::{BindValue, Bindings, SqlNode};
use super::normalisation::{NormalisationRequest, NormalisationTable};
use super::query::{build_query, QueryExpr};
use super::rank::{build_rank, RankExpression};
use super::resolver::{resolve_column_specs, validate_identifier, ColumnSpec};
use super::vector::{build_vector, VectorExpr};
use crate::config::{FulltextDefaults, PlaceholderStyle};
use crate::error::{FtsError, IdentifierKind, Result};
use crate::schema::SchemaSource;
use std::sync::Arc;
use tracing::info;

/// Search configuration for one entity.
///
/// Built once per entity. Construction resolves and validates the weighted
/// columns and renders the vector and query templates; nothing here depends
/// on a search term, so one configuration can serve concurrent searches.
#[derive(Debug, Clone)]
pub struct FulltextConfig {
    entity: String,
    dictionary: String,
    column_specs: Vec<ColumnSpec>,
    normalisation_table: NormalisationTable,
    placeholder_style: PlaceholderStyle,
    vector: Arc<VectorExpr>,
    query: Arc<QueryExpr>,
}

impl FulltextConfig {
    /// Build a configuration with default dictionary and placeholder style.
    pub fn new(schema: &dyn SchemaSource) -> Result<Self> {
        Self::builder(schema).build()
    }

    /// Create a builder for more control over the configuration.
    pub fn builder(schema: &dyn SchemaSource) -> FulltextConfigBuilder<'_> {
        FulltextConfigBuilder::new(schema)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    pub fn column_specs(&self) -> &[ColumnSpec] {
        &self.column_specs
    }

    pub fn normalisation_table(&self) -> &NormalisationTable {
        &self.normalisation_table
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder_style
    }

    pub fn vector(&self) -> &Arc<VectorExpr> {
        &self.vector
    }

    pub fn query(&self) -> &Arc<QueryExpr> {
        &self.query
    }

    /// Encode a normalisation request against this configuration's flag table.
    pub fn normalisation_mask(&self, request: Option<&NormalisationRequest>) -> u32 {
        self.normalisation_table.encode(request)
    }

    /// Render only the rank expression for `term`.
    pub fn rank_expression(
        &self,
        term: &str,
        normalisation: Option<&NormalisationRequest>,
    ) -> RankExpression {
        let mut bindings = Bindings::new(self.placeholder_style);
        let term_index = bindings.bind(BindValue::from(term));

        let rank = build_rank(
            Arc::clone(&self.vector),
            Arc::clone(&self.query),
            self.normalisation_mask(normalisation),
        );
        let clause = rank.to_clause(&bindings, term_index);

        RankExpression {
            bound_parameters: bindings.parameters_for(&[&clause]),
            sql_fragment: clause.sql,
        }
    }
}

/// Builder for [`FulltextConfig`].
///
/// # Example
///
/// ```rust,ignore
/// let config = FulltextConfig::builder(&schema)
///     .dictionary("simple")
///     .placeholder_style(PlaceholderStyle::Numbered)
///     .build()?;
/// ```
pub struct FulltextConfigBuilder<'a> {
    schema: &'a dyn SchemaSource,
    dictionary: String,
    placeholder_style: PlaceholderStyle,
}

impl<'a> FulltextConfigBuilder<'a> {
    pub fn new(schema: &'a dyn SchemaSource) -> Self {
        Self {
            schema,
            dictionary: FulltextDefaults::DICTIONARY.to_string(),
            placeholder_style: PlaceholderStyle::default(),
        }
    }

    /// Text search configuration passed to `to_tsvector`/`plainto_tsquery`.
    ///
    /// Default: `english`
    pub fn dictionary(mut self, dictionary: impl Into<String>) -> Self {
        self.dictionary = dictionary.into();
        self
    }

    /// Placeholder syntax for rendered SQL.
    ///
    /// Default: [`PlaceholderStyle::Positional`]
    pub fn placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Validate the schema and precompute the term-independent expressions.
    pub fn build(self) -> Result<FulltextConfig> {
        let entity = self.schema.entity_name().to_string();

        if self.dictionary.trim().is_empty() {
            return Err(FtsError::configuration(entity, "dictionary name is empty"));
        }
        validate_identifier(&entity, IdentifierKind::Dictionary, &self.dictionary)?;

        let column_specs = resolve_column_specs(self.schema)?;
        let vector = Arc::new(build_vector(&self.dictionary, &column_specs));
        let query = Arc::new(build_query(&self.dictionary));

        info!(
            "Built full-text configuration for {} ({} columns, dictionary {})",
            entity,
            column_specs.len(),
            self.dictionary
        );

        Ok(FulltextConfig {
            entity,
            dictionary: self.dictionary,
            column_specs,
            normalisation_table: NormalisationTable::standard(),
            placeholder_style: self.placeholder_style,
            vector,
            query,
        })
    }
}
