//! Centralized configuration for weighted full-text search.
//!
//! Engine-facing constants and the placeholder syntax used when rendering
//! expressions to SQL text.

use serde::{Deserialize, Serialize};

/// Defaults for full-text search configurations.
pub struct FulltextDefaults;

impl FulltextDefaults {
    /// Text search configuration used when none is given.
    pub const DICTIONARY: &'static str = "english";
    /// Column alias given to the rank expression in rendered statements.
    pub const RANK_ALIAS: &'static str = "rank";
    /// Version of the normalisation flag table in `NormalisationTable::standard`.
    pub const NORMALISATION_TABLE_VERSION: u32 = 1;
}

/// Bind placeholder syntax for rendered SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` for every occurrence; each occurrence has its own slot in the parameter list.
    #[default]
    Positional,
    /// `$1`, `$2`, ...; a value bound once is referenced by the same number everywhere.
    Numbered,
}

impl PlaceholderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderStyle::Positional => "positional",
            PlaceholderStyle::Numbered => "numbered",
        }
    }
}
