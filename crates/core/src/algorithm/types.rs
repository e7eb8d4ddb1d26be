//! Types for the algorithm catalog.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// A single speedcubing algorithm (one PLL or OLL case).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    /// Catalog id. PLL cases use 1..=22, OLL cases 23..=79; 0 never names a record.
    #[serde(default)]
    pub id: u32,
    /// Unique display name (e.g. "Ua Perm").
    pub name: String,
    /// Move sequence in standard notation.
    #[serde(default)]
    pub moves: String,
    /// Video explaining the case.
    #[serde(default)]
    pub video_id: String,
    /// Clip start, in seconds.
    #[serde(default)]
    pub video_start: u32,
    /// Clip end, in seconds.
    #[serde(default)]
    pub video_end: u32,
    /// Short recognition or execution hint.
    #[serde(default)]
    pub short_note: String,
    /// Grouping key ("PLL", "OLL" or a finer subset).
    #[serde(default)]
    pub category: String,
    /// Diagram image.
    #[serde(default)]
    pub image_url: String,
}

impl Algorithm {
    /// Whether this record carries a real catalog id.
    ///
    /// Documents without an id decode to 0 and are treated as missing.
    pub fn has_id(&self) -> bool {
        self.id != 0
    }
}

/// The two algorithm families the random endpoints draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    /// Permutation of the last layer.
    Pll,
    /// Orientation of the last layer.
    Oll,
}

impl AlgorithmFamily {
    /// Catalog ids belonging to this family.
    pub fn id_range(self) -> RangeInclusive<u32> {
        match self {
            AlgorithmFamily::Pll => 1..=22,
            AlgorithmFamily::Oll => 23..=79,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmFamily::Pll => "pll",
            AlgorithmFamily::Oll => "oll",
        }
    }
}
