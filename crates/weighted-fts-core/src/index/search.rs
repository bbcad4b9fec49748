//! Search assembly: filter predicate, rank ordering and row cap.

use super::expr::{count_markers, BindValue, Bindings, SqlClause, SqlNode, SqlWriter};
use super::fulltext::FulltextConfig;
use super::normalisation::NormalisationRequest;
use super::query::QueryExpr;
use super::rank::build_rank;
use super::resolver::validate_identifier;
use super::vector::VectorExpr;
use crate::config::{FulltextDefaults, PlaceholderStyle};
use crate::error::{FtsError, IdentifierKind, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-call search options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    /// Rank normalisation flags. `None` means no normalisation.
    pub normalisation: Option<NormalisationRequest>,
    /// Maximum number of rows. Zero or negative imposes no cap.
    pub row_limit: Option<i64>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalisation(mut self, request: NormalisationRequest) -> Self {
        self.normalisation = Some(request);
        self
    }

    pub fn row_limit(mut self, limit: i64) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// The row cap to apply, if any.
    pub fn effective_limit(&self) -> Option<u64> {
        match self.row_limit {
            Some(limit) if limit > 0 => Some(limit as u64),
            Some(limit) if limit < 0 => {
                warn!("Ignoring negative row limit {}", limit);
                None
            }
            _ => None,
        }
    }
}

/// A complete search request: the term plus its options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub term: String,
    #[serde(flatten)]
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Full-text match: `<query> @@ <vector>`.
struct MatchExpr<'a> {
    query: &'a QueryExpr,
    vector: &'a VectorExpr,
}

impl SqlNode for MatchExpr<'_> {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        self.query.write_sql(w);
        w.push_str(" @@ ");
        self.vector.write_sql(w);
    }
}

/// A complete SQL statement with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<BindValue>,
}

/// The assembled search, ready to hand to an executor.
///
/// Holds the filter predicate, the rank ordering and the optional row cap.
/// The search term is bound exactly once; predicate and ordering reference
/// that single value. Ties in rank come back in whatever order the executor
/// produces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QueryFragmentRepr")]
pub struct QueryFragment {
    entity: String,
    bindings: Bindings,
    term_index: usize,
    predicate: SqlClause,
    rank: SqlClause,
    order: SqlClause,
    limit: Option<u64>,
    normalisation: u32,
}

/// Wire form of [`QueryFragment`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryFragmentRepr {
    entity: String,
    bindings: Bindings,
    term_index: usize,
    predicate: SqlClause,
    rank: SqlClause,
    order: SqlClause,
    limit: Option<u64>,
    normalisation: u32,
}

impl TryFrom<QueryFragmentRepr> for QueryFragment {
    type Error = String;

    fn try_from(repr: QueryFragmentRepr) -> std::result::Result<Self, Self::Error> {
        let bound = repr.bindings.values().len();
        if repr.term_index >= bound {
            return Err(format!(
                "term index {} out of range for {} bound values",
                repr.term_index, bound
            ));
        }
        for (name, clause) in [
            ("predicate", &repr.predicate),
            ("rank", &repr.rank),
            ("order", &repr.order),
        ] {
            if let Some(index) = clause.refs.iter().find(|&&index| index >= bound) {
                return Err(format!(
                    "{} references value {} but only {} are bound",
                    name, index, bound
                ));
            }
        }

        Ok(Self {
            entity: repr.entity,
            bindings: repr.bindings,
            term_index: repr.term_index,
            predicate: repr.predicate,
            rank: repr.rank,
            order: repr.order,
            limit: repr.limit,
            normalisation: repr.normalisation,
        })
    }
}

impl QueryFragment {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.bindings.style()
    }

    /// The bound search term.
    pub fn term(&self) -> &str {
        self.bindings
            .get(self.term_index)
            .and_then(BindValue::as_text)
            .unwrap_or_default()
    }

    /// Logical bind values; the term is the first.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Filter predicate, including any composed caller filters.
    pub fn predicate(&self) -> &SqlClause {
        &self.predicate
    }

    /// Rank expression on its own, for use in a select list.
    pub fn rank(&self) -> &SqlClause {
        &self.rank
    }

    /// Ordering term: the rank expression, descending.
    pub fn order(&self) -> &SqlClause {
        &self.order
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn normalisation(&self) -> u32 {
        self.normalisation
    }

    /// Parameters for `WHERE <predicate> ORDER BY <order>`, in placeholder order.
    pub fn bound_parameters(&self) -> Vec<BindValue> {
        self.bindings
            .parameters_for(&[&self.predicate, &self.order])
    }

    pub fn order_by_sql(&self) -> String {
        format!("ORDER BY {}", self.order.sql)
    }

    pub fn limit_sql(&self) -> Option<String> {
        self.limit.map(|limit| format!("LIMIT {}", limit))
    }

    /// AND-compose a caller filter onto the predicate.
    ///
    /// `sql` marks each value with `?`; `params` supplies them in order. A `?`
    /// inside a quoted literal, a quoted identifier or a dollar-quoted body is
    /// not a marker. Write `??` for a literal `?`, such as the jsonb `?`
    /// operators. The markers are rewritten to this fragment's placeholder
    /// style.
    pub fn and_where(mut self, sql: &str, params: Vec<BindValue>) -> Result<Self> {
        if sql.trim().is_empty() {
            return Err(FtsError::InvalidFilter {
                entity: self.entity,
                message: "filter is empty".to_string(),
            });
        }

        let markers = count_markers(sql);
        if markers != params.len() {
            return Err(FtsError::InvalidFilter {
                entity: self.entity,
                message: format!(
                    "filter has {} placeholders but {} parameters were given",
                    markers,
                    params.len()
                ),
            });
        }

        let indices: Vec<usize> = params
            .into_iter()
            .map(|value| self.bindings.bind(value))
            .collect();

        let mut w = SqlWriter::new(&self.bindings, self.term_index);
        w.push_template(sql, &indices);
        let filter = w.finish();

        self.predicate.sql = format!("{} AND ({})", self.predicate.sql, filter.sql);
        self.predicate.refs.extend(filter.refs);
        Ok(self)
    }

    /// Render a complete statement selecting `columns` plus the rank.
    ///
    /// An empty `columns` selects `*`. Ordering repeats the rank expression
    /// rather than naming the alias, which a selected column called `rank`
    /// would shadow.
    pub fn to_select_sql(&self, table: &str, columns: &[&str]) -> Result<Statement> {
        validate_identifier(&self.entity, IdentifierKind::Table, table)?;
        for column in columns {
            validate_identifier(&self.entity, IdentifierKind::Column, column)?;
        }

        let select_list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let alias = FulltextDefaults::RANK_ALIAS;

        let mut sql = format!(
            "SELECT {}, {} AS {} FROM {} WHERE {} {}",
            select_list,
            self.rank.sql,
            alias,
            table,
            self.predicate.sql,
            self.order_by_sql()
        );
        if let Some(limit) = self.limit_sql() {
            sql.push(' ');
            sql.push_str(&limit);
        }

        Ok(Statement {
            sql,
            parameters: self
                .bindings
                .parameters_for(&[&self.rank, &self.predicate, &self.order]),
        })
    }
}

impl FulltextConfig {
    /// Assemble a search for `term`.
    ///
    /// Never fails: an empty or odd term is passed through for the engine's
    /// own parser to handle.
    pub fn search(&self, term: &str, options: &SearchOptions) -> QueryFragment {
        let normalisation = self.normalisation_mask(options.normalisation.as_ref());
        let limit = options.effective_limit();

        let mut bindings = Bindings::new(self.placeholder_style());
        let term_index = bindings.bind(BindValue::from(term));

        let predicate = MatchExpr {
            query: self.query(),
            vector: self.vector(),
        }
        .to_clause(&bindings, term_index);

        let rank = build_rank(Arc::clone(self.vector()), Arc::clone(self.query()), normalisation)
            .to_clause(&bindings, term_index);

        let order = SqlClause {
            sql: format!("{} DESC", rank.sql),
            refs: rank.refs.clone(),
        };

        debug!(
            "Assembled search on {} (normalisation {}, limit {:?})",
            self.entity(),
            normalisation,
            limit
        );

        QueryFragment {
            entity: self.entity().to_string(),
            bindings,
            term_index,
            predicate,
            rank,
            order,
            limit,
            normalisation,
        }
    }

    /// Assemble a search from a request value.
    pub fn search_request(&self, request: &SearchRequest) -> QueryFragment {
        self.search(&request.term, &request.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;

    const VECTOR: &str = "(setweight(to_tsvector('english', COALESCE(title, '')), 'A') || ' ' || \
                          setweight(to_tsvector('english', COALESCE(body, '')), 'B'))";

    fn config(style: PlaceholderStyle) -> FulltextConfig {
        let schema = TableSchema::new("articles")
            .column("id")
            .weighted_column("title", "A")
            .weighted_column("body", "B");
        FulltextConfig::builder(&schema)
            .placeholder_style(style)
            .build()
            .unwrap()
    }

    #[test]
    fn test_search_defaults() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());

        assert_eq!(fragment.normalisation(), 0);
        assert_eq!(fragment.limit(), None);
        assert_eq!(
            fragment.predicate().sql,
            format!("plainto_tsquery('english', ?) @@ {}", VECTOR)
        );
        assert_eq!(
            fragment.order().sql,
            format!("ts_rank_cd({}, plainto_tsquery('english', ?), 0) DESC", VECTOR)
        );
        assert_eq!(fragment.term(), "cats");
    }

    #[test]
    fn test_positional_parameters_share_term() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());
        let params = fragment.bound_parameters();

        assert_eq!(params.len(), 2);
        match (&params[0], &params[1]) {
            (BindValue::Text(a), BindValue::Text(b)) => {
                assert!(Arc::ptr_eq(a, b));
                assert_eq!(&**a, "cats");
            }
            other => panic!("unexpected parameters: {:?}", other),
        }
        assert_eq!(fragment.bindings().values().len(), 1);
    }

    #[test]
    fn test_numbered_binds_term_once() {
        let fragment = config(PlaceholderStyle::Numbered).search("cats", &SearchOptions::new());

        assert!(fragment.predicate().sql.starts_with("plainto_tsquery('english', $1) @@ "));
        assert!(fragment.order().sql.contains("plainto_tsquery('english', $1), 0)"));
        assert_eq!(fragment.bound_parameters(), vec![BindValue::from("cats")]);
    }

    #[test]
    fn test_row_limit() {
        let config = config(PlaceholderStyle::Positional);

        let capped = config.search("cats", &SearchOptions::new().row_limit(10));
        assert_eq!(capped.limit(), Some(10));
        assert_eq!(capped.limit_sql().as_deref(), Some("LIMIT 10"));

        let zero = config.search("cats", &SearchOptions::new().row_limit(0));
        assert_eq!(zero.limit(), None);
        assert_eq!(zero.limit_sql(), None);

        let negative = config.search("cats", &SearchOptions::new().row_limit(-5));
        assert_eq!(negative.limit(), None);
    }

    #[test]
    fn test_normalisation_in_rank() {
        let options = SearchOptions::new()
            .normalisation(NormalisationRequest::from_names(["rank", "log_length"]));
        let fragment = config(PlaceholderStyle::Positional).search("cats", &options);

        assert_eq!(fragment.normalisation(), 33);
        assert!(fragment.rank().sql.ends_with(", 33)"));
        assert!(fragment.order_by_sql().ends_with(", 33) DESC"));
    }

    #[test]
    fn test_empty_term_is_valid() {
        let fragment = config(PlaceholderStyle::Positional).search("", &SearchOptions::new());
        assert_eq!(fragment.term(), "");
        assert_eq!(fragment.bound_parameters().len(), 2);
    }

    #[test]
    fn test_repeated_search_is_identical() {
        let config = config(PlaceholderStyle::Numbered);
        let options = SearchOptions::new().row_limit(5);
        assert_eq!(config.search("cats", &options), config.search("cats", &options));
    }

    #[test]
    fn test_and_where_numbered() {
        let fragment = config(PlaceholderStyle::Numbered)
            .search("cats", &SearchOptions::new())
            .and_where("author_id = ? AND status <> 'draft?'", vec![BindValue::Integer(7)])
            .unwrap();

        assert!(fragment
            .predicate()
            .sql
            .ends_with(" AND (author_id = $2 AND status <> 'draft?')"));
        assert_eq!(
            fragment.bound_parameters(),
            vec![BindValue::from("cats"), BindValue::Integer(7)]
        );
    }

    #[test]
    fn test_and_where_positional_keeps_textual_order() {
        let fragment = config(PlaceholderStyle::Positional)
            .search("cats", &SearchOptions::new())
            .and_where("author_id = ?", vec![BindValue::Integer(7)])
            .unwrap();

        // WHERE <term> ... AND author_id = ? ORDER BY ... <term>
        assert_eq!(
            fragment.bound_parameters(),
            vec![
                BindValue::from("cats"),
                BindValue::Integer(7),
                BindValue::from("cats"),
            ]
        );
    }

    #[test]
    fn test_and_where_rejects_mismatched_params() {
        let err = config(PlaceholderStyle::Positional)
            .search("cats", &SearchOptions::new())
            .and_where("a = ? AND b = ?", vec![BindValue::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, FtsError::InvalidFilter { .. }));

        let err = config(PlaceholderStyle::Positional)
            .search("cats", &SearchOptions::new())
            .and_where("  ", vec![])
            .unwrap_err();
        assert!(matches!(err, FtsError::InvalidFilter { .. }));
    }

    #[test]
    fn test_to_select_sql() {
        let fragment = config(PlaceholderStyle::Numbered)
            .search("cats", &SearchOptions::new().row_limit(10));
        let statement = fragment.to_select_sql("articles", &["id", "title"]).unwrap();

        assert_eq!(
            statement.sql,
            format!(
                "SELECT id, title, ts_rank_cd({v}, plainto_tsquery('english', $1), 0) AS rank \
                 FROM articles WHERE plainto_tsquery('english', $1) @@ {v} \
                 ORDER BY ts_rank_cd({v}, plainto_tsquery('english', $1), 0) DESC LIMIT 10",
                v = VECTOR
            )
        );
        assert_eq!(statement.parameters, vec![BindValue::from("cats")]);
    }

    #[test]
    fn test_to_select_sql_positional_star() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());
        let statement = fragment.to_select_sql("public.articles", &[]).unwrap();

        assert!(statement.sql.starts_with("SELECT *, ts_rank_cd("));
        assert!(!statement.sql.contains("LIMIT"));
        assert_eq!(statement.sql.matches('?').count(), 3);
        assert_eq!(statement.parameters.len(), 3);
        assert_eq!(fragment.style().as_str(), "positional");
    }

    #[test]
    fn test_to_select_sql_with_rank_column() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());
        let statement = fragment.to_select_sql("articles", &["id", "rank"]).unwrap();

        assert!(!statement.sql.contains("ORDER BY rank"));
        assert!(statement.sql.ends_with(&fragment.order_by_sql()));
        assert_eq!(
            statement.parameters,
            vec![
                BindValue::from("cats"),
                BindValue::from("cats"),
                BindValue::from("cats"),
            ]
        );
    }

    #[test]
    fn test_and_where_ignores_markers_in_identifiers_and_jsonb_operators() {
        let fragment = config(PlaceholderStyle::Numbered)
            .search("cats", &SearchOptions::new())
            .and_where(r#""is_public?" = ?"#, vec![BindValue::Boolean(true)])
            .unwrap()
            .and_where("tags ?? 'rust' AND author_id = ?", vec![BindValue::Integer(7)])
            .unwrap();

        assert!(fragment
            .predicate()
            .sql
            .ends_with(r#" AND ("is_public?" = $2) AND (tags ? 'rust' AND author_id = $3)"#));
        assert_eq!(
            fragment.bound_parameters(),
            vec![
                BindValue::from("cats"),
                BindValue::Boolean(true),
                BindValue::Integer(7),
            ]
        );

        let err = config(PlaceholderStyle::Numbered)
            .search("cats", &SearchOptions::new())
            .and_where("body = $$why?$$ AND id = ?", vec![])
            .unwrap_err();
        assert!(matches!(err, FtsError::InvalidFilter { .. }));
    }

    #[test]
    fn test_to_select_sql_rejects_bad_table() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());
        let err = fragment.to_select_sql("articles; --", &[]).unwrap_err();
        assert!(matches!(
            err,
            FtsError::InvalidIdentifier {
                kind: IdentifierKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_search_request_with_options() {
        let request = SearchRequest::new("cats").with_options(
            SearchOptions::new()
                .normalisation(NormalisationRequest::from_names(["length"]))
                .row_limit(4),
        );
        assert!(!request.options.normalisation.as_ref().unwrap().is_empty());

        let fragment = config(PlaceholderStyle::Positional).search_request(&request);
        assert_eq!(fragment.term(), "cats");
        assert_eq!(fragment.normalisation(), 2);
        assert_eq!(fragment.limit(), Some(4));
    }

    #[test]
    fn test_search_request_deserializes() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"term": "cats", "normalisation": ["rank"], "rowLimit": 3}"#,
        )
        .unwrap();
        let fragment = config(PlaceholderStyle::Positional).search_request(&request);
        assert_eq!(fragment.normalisation(), 32);
        assert_eq!(fragment.limit(), Some(3));
    }

    #[test]
    fn test_fragment_serializes() {
        let fragment = config(PlaceholderStyle::Numbered).search("cats", &SearchOptions::new());
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["entity"], "articles");
        assert_eq!(json["normalisation"], 0);
        assert!(json["limit"].is_null());
        assert_eq!(json["bindings"]["values"][0], "cats");

        let restored: QueryFragment = serde_json::from_value(json).unwrap();
        assert_eq!(restored, fragment);
    }

    #[test]
    fn test_fragment_deserialize_rejects_dangling_refs() {
        let fragment = config(PlaceholderStyle::Positional).search("cats", &SearchOptions::new());
        let mut json = serde_json::to_value(&fragment).unwrap();
        json["bindings"]["values"] = serde_json::json!([]);
        assert!(serde_json::from_value::<QueryFragment>(json).is_err());

        let mut json = serde_json::to_value(&fragment).unwrap();
        json["bindings"]["values"] = serde_json::json!(["cats"]);
        json["order"]["refs"] = serde_json::json!([0, 5]);
        let err = serde_json::from_value::<QueryFragment>(json).unwrap_err();
        assert!(err.to_string().contains("order references value 5"));
    }
}
