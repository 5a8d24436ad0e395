use serde::Serialize;
use std::cmp::Ordering;

use super::ItemId;

/// Result of comparing two preference vectors
///
/// `Undefined` means the vectors share no co-rated key. It is distinct
/// from a defined score of zero and must never be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "score", rename_all = "lowercase")]
pub enum Similarity {
    Defined(f64),
    Undefined,
}

impl Similarity {
    /// The score, if defined
    pub fn score(&self) -> Option<f64> {
        match self {
            Similarity::Defined(score) => Some(*score),
            Similarity::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Similarity::Defined(_))
    }
}

/// An item recommended to a user with its estimated preference
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendedItem {
    pub item_id: ItemId,
    pub estimated_value: f64,
}

impl RecommendedItem {
    pub fn new(item_id: ItemId, estimated_value: f64) -> Self {
        Self {
            item_id,
            estimated_value,
        }
    }

    /// Ranking order: higher estimate first, then lower item id
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .estimated_value
            .total_cmp(&self.estimated_value)
            .then_with(|| self.item_id.cmp(&other.item_id))
    }
}
