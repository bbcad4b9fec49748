//! Schema metadata consumed by the search configuration.
//!
//! The object-relational layer owns the real schema; this module only defines
//! the read-only view the resolver needs: column names in a stable order and,
//! per column, an optional full-text weight tag.

use crate::error::{FtsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full-text weight class of a column. `A` ranks highest, `D` lowest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weight {
    #[default]
    A,
    B,
    C,
    D,
}

impl Weight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weight::A => "A",
            Weight::B => "B",
            Weight::C => "C",
            Weight::D => "D",
        }
    }

    /// Interpret a raw weight tag.
    ///
    /// Falsy tags (empty, whitespace, `"0"`) mean `A`. Letters are
    /// case-insensitive. Anything else yields `None`.
    pub fn from_tag(tag: &str) -> Option<Weight> {
        let tag = tag.trim();
        if tag.is_empty() || tag == "0" {
            return Some(Weight::A);
        }
        match tag.to_ascii_uppercase().as_str() {
            "A" => Some(Weight::A),
            "B" => Some(Weight::B),
            "C" => Some(Weight::C),
            "D" => Some(Weight::D),
            _ => None,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a single column, as exposed by the schema layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnAttributes {
    pub data_type: Option<String>,
    pub is_nullable: bool,
    /// Raw full-text weight tag. `None` means the column is not searched.
    pub fulltext_weight: Option<String>,
}

impl ColumnAttributes {
    /// Attributes for a searchable column with the given raw weight tag.
    pub fn weighted(tag: impl Into<String>) -> Self {
        Self {
            fulltext_weight: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Whether the column declares a weight tag at all.
    pub fn is_searchable(&self) -> bool {
        self.fulltext_weight.is_some()
    }
}

/// A named column and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(flatten)]
    pub attributes: ColumnAttributes,
}

/// Read-only schema metadata for one searchable entity.
///
/// Implementations must return columns in the same order on every call.
pub trait SchemaSource {
    /// Name of the entity (table or result source), used in error messages.
    fn entity_name(&self) -> &str;

    /// Column names paired with their attributes, in a stable order.
    fn column_attributes(&self) -> Vec<(&str, &ColumnAttributes)>;
}

/// Plain in-memory schema description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column that takes no part in search.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnDefinition {
            name: name.into(),
            attributes: ColumnAttributes::default(),
        });
        self
    }

    /// Append a column carrying a full-text weight tag.
    pub fn weighted_column(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.columns.push(ColumnDefinition {
            name: name.into(),
            attributes: ColumnAttributes::weighted(tag),
        });
        self
    }

    /// Load a schema description from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: TableSchema = serde_json::from_str(json)?;
        if schema.name.trim().is_empty() {
            return Err(FtsError::configuration(
                "<unnamed>",
                "schema description has an empty entity name",
            ));
        }
        Ok(schema)
    }
}

impl SchemaSource for TableSchema {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn column_attributes(&self) -> Vec<(&str, &ColumnAttributes)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), &c.attributes))
            .collect()
    }
}
