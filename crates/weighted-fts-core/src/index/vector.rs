//! Combined weighted document vector.

use super::expr::{quote_literal, SqlNode, SqlWriter};
use super::resolver::ColumnSpec;

/// Separator placed between per-column vectors.
const VECTOR_CONCAT: &str = " || ' ' || ";

/// `setweight(to_tsvector(..), ..)` over every searched column, joined into
/// one parenthesized expression.
///
/// The vector carries no bind values, so its text is rendered once on
/// construction and reused by every search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorExpr {
    dictionary: String,
    columns: Vec<ColumnSpec>,
    sql: String,
}

impl VectorExpr {
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// The rendered vector text.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl SqlNode for VectorExpr {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.push_str(&self.sql);
    }
}

/// Build the combined vector for `columns` under `dictionary`.
///
/// Each column is wrapped in `COALESCE(column, '')` so a NULL column adds an
/// empty document instead of nulling the whole vector. Column order follows
/// `columns`. Callers pass identifiers that have already been validated.
pub fn build_vector(dictionary: &str, columns: &[ColumnSpec]) -> VectorExpr {
    let dictionary_literal = quote_literal(dictionary);
    let parts: Vec<String> = columns
        .iter()
        .map(|spec| {
            format!(
                "setweight(to_tsvector({}, COALESCE({}, '')), {})",
                dictionary_literal,
                spec.name,
                quote_literal(spec.weight.as_str())
            )
        })
        .collect();

    VectorExpr {
        dictionary: dictionary.to_string(),
        columns: columns.to_vec(),
        sql: format!("({})", parts.join(VECTOR_CONCAT)),
    }
}
