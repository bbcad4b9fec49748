//! Cover-density rank expression.

use super::expr::{BindValue, SqlNode, SqlWriter};
use super::query::QueryExpr;
use super::vector::VectorExpr;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `ts_rank_cd(<vector>, <query>, <normalisation>)`.
///
/// Vector and query are shared with the configuration that built them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankExpr {
    vector: Arc<VectorExpr>,
    query: Arc<QueryExpr>,
    normalisation: u32,
}

impl RankExpr {
    pub fn vector(&self) -> &VectorExpr {
        &self.vector
    }

    pub fn query(&self) -> &QueryExpr {
        &self.query
    }

    pub fn normalisation(&self) -> u32 {
        self.normalisation
    }
}

impl SqlNode for RankExpr {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.push_str("ts_rank_cd(");
        self.vector.write_sql(w);
        w.push_str(", ");
        self.query.write_sql(w);
        w.push_str(&format!(", {})", self.normalisation));
    }
}

/// Combine vector, query and normalisation bitmask into a rank expression.
pub fn build_rank(vector: Arc<VectorExpr>, query: Arc<QueryExpr>, normalisation: u32) -> RankExpr {
    RankExpr {
        vector,
        query,
        normalisation,
    }
}

/// A rank expression rendered on its own, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankExpression {
    pub sql_fragment: String,
    pub bound_parameters: Vec<BindValue>,
}
