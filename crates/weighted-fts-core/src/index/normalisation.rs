//! Rank normalisation flags and their bitmask encoding.
//!
//! The bit values are those `ts_rank_cd` documents for its normalization
//! argument. The table is versioned; changing a bit value is a breaking change.

use crate::config::FulltextDefaults;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A named rank normalisation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalisationFlag {
    /// Divide rank by 1 + log of document length.
    LogLength,
    /// Divide rank by document length.
    Length,
    /// Divide rank by the mean harmonic distance between extents.
    HarmonicDistance,
    /// Divide rank by the number of unique words.
    UniqueWords,
    /// Divide rank by 1 + log of the number of unique words.
    LogUniqueWords,
    /// Divide rank by itself + 1.
    Rank,
}

impl NormalisationFlag {
    pub const ALL: [NormalisationFlag; 6] = [
        NormalisationFlag::LogLength,
        NormalisationFlag::Length,
        NormalisationFlag::HarmonicDistance,
        NormalisationFlag::UniqueWords,
        NormalisationFlag::LogUniqueWords,
        NormalisationFlag::Rank,
    ];

    pub fn bit(&self) -> u32 {
        match self {
            NormalisationFlag::LogLength => 1,
            NormalisationFlag::Length => 2,
            NormalisationFlag::HarmonicDistance => 4,
            NormalisationFlag::UniqueWords => 8,
            NormalisationFlag::LogUniqueWords => 16,
            NormalisationFlag::Rank => 32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NormalisationFlag::LogLength => "log_length",
            NormalisationFlag::Length => "length",
            NormalisationFlag::HarmonicDistance => "harmonic_distance",
            NormalisationFlag::UniqueWords => "unique_words",
            NormalisationFlag::LogUniqueWords => "log_unique_words",
            NormalisationFlag::Rank => "rank",
        }
    }

    pub fn from_name(name: &str) -> Option<NormalisationFlag> {
        Self::ALL.into_iter().find(|flag| flag.as_str() == name)
    }
}

impl fmt::Display for NormalisationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalisationFlag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown normalisation flag: {}", s))
    }
}

/// Mapping of flag name to bit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalisationTable {
    version: u32,
    bits: BTreeMap<String, u32>,
}

impl NormalisationTable {
    /// The fixed table of all six engine flags.
    pub fn standard() -> Self {
        Self {
            version: FulltextDefaults::NORMALISATION_TABLE_VERSION,
            bits: NormalisationFlag::ALL
                .into_iter()
                .map(|flag| (flag.as_str().to_string(), flag.bit()))
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn bits(&self) -> &BTreeMap<String, u32> {
        &self.bits
    }

    pub fn bit(&self, name: &str) -> Option<u32> {
        self.bits.get(name).copied()
    }

    /// OR together the bits of every requested flag the table knows.
    ///
    /// No request encodes to `0`, not to every flag. Unknown names are skipped.
    pub fn encode(&self, request: Option<&NormalisationRequest>) -> u32 {
        let Some(request) = request else {
            return 0;
        };

        request.names().fold(0, |mask, name| match self.bit(name) {
            Some(bit) => mask | bit,
            None => {
                debug!("Ignoring unknown normalisation flag {:?}", name);
                mask
            }
        })
    }
}

impl Default for NormalisationTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// The set of normalisation flag names requested for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalisationRequest {
    names: BTreeSet<String>,
}

impl NormalisationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from flag names. Names are kept even if unknown.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_flag(mut self, flag: NormalisationFlag) -> Self {
        self.names.insert(flag.as_str().to_string());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<NormalisationFlag> for NormalisationRequest {
    fn from_iter<I: IntoIterator<Item = NormalisationFlag>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |request, flag| request.with_flag(flag))
    }
}
