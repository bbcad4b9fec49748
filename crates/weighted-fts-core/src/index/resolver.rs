//! Resolution of weighted columns from schema metadata.

use crate::error::{FtsError, IdentifierKind, Result};
use crate::schema::{SchemaSource, Weight};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Plain SQL identifier, optionally qualified once (`me.title`, `pg_catalog.english`).
static SQL_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_$]*(\.[\p{L}_][\p{L}\p{N}_$]*)?$").unwrap()
});

/// A column taking part in search, with its weight class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub weight: Weight,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, weight: Weight) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Check that `value` can be written into SQL text verbatim.
pub(crate) fn validate_identifier(entity: &str, kind: IdentifierKind, value: &str) -> Result<()> {
    if SQL_IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(FtsError::InvalidIdentifier {
            entity: entity.to_string(),
            kind,
            value: value.to_string(),
        })
    }
}

/// Collect every column that declares a weight tag, in schema order.
///
/// Fails when no column is weighted, when a column name repeats, when a tag is
/// not one of `A`-`D` (or falsy), or when a name is not a plain identifier.
pub fn resolve_column_specs(schema: &dyn SchemaSource) -> Result<Vec<ColumnSpec>> {
    let entity = schema.entity_name();
    let mut seen = HashSet::new();
    let mut specs = Vec::new();

    for (name, attributes) in schema.column_attributes() {
        let Some(tag) = attributes.fulltext_weight.as_deref() else {
            continue;
        };

        if name.is_empty() {
            return Err(FtsError::configuration(
                entity,
                "weighted column has an empty name",
            ));
        }
        validate_identifier(entity, IdentifierKind::Column, name)?;

        let weight = Weight::from_tag(tag).ok_or_else(|| {
            FtsError::configuration(
                entity,
                format!("column {} has unknown weight tag {:?}", name, tag),
            )
        })?;

        if !seen.insert(name) {
            return Err(FtsError::configuration(
                entity,
                format!("column {} is declared more than once", name),
            ));
        }

        debug!("Resolved search column {}.{} with weight {}", entity, name, weight);
        specs.push(ColumnSpec::new(name, weight));
    }

    if specs.is_empty() {
        return Err(FtsError::configuration(
            entity,
            "no columns declare a full-text weight",
        ));
    }

    Ok(specs)
}
