use std::collections::BTreeSet;

use crate::models::{ItemId, UserId};

use super::similarity::{SimilarityEngine, SimilarityMetric};

/// Options for candidate generation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateOptions {
    /// Minimum similarity an item needs to one of the user's rated items.
    /// `None` accepts any defined similarity.
    pub min_similarity: Option<f64>,
}

/// Enumerates unrated items similar to what a user already rated
pub struct CandidateGenerator<'e, 'a, M: SimilarityMetric> {
    engine: &'e SimilarityEngine<'a, M>,
    options: CandidateOptions,
}

impl<'e, 'a, M: SimilarityMetric> CandidateGenerator<'e, 'a, M> {
    pub fn new(engine: &'e SimilarityEngine<'a, M>, options: CandidateOptions) -> Self {
        Self { engine, options }
    }

    /// Candidate item ids for a user, in ascending order
    ///
    /// Only items co-rated with one of the user's items can have a defined
    /// similarity to it, so the search is limited to items rated by users
    /// who share at least one item with this user. Unknown users and users
    /// with nothing similar produce an empty set.
    pub fn candidates(&self, user_id: UserId) -> BTreeSet<ItemId> {
        let store = self.engine.store();
        let Some(rated) = store.user_vector(user_id) else {
            return BTreeSet::new();
        };

        let mut pool = BTreeSet::new();
        for rated_item in rated.keys() {
            let Some(raters) = store.item_vector(rated_item) else {
                continue;
            };

            for other_user in raters.keys() {
                let Some(other_items) = store.user_vector(other_user) else {
                    continue;
                };
                pool.extend(other_items.keys().filter(|item| !rated.contains(*item)));
            }
        }

        let candidates: BTreeSet<ItemId> = pool
            .into_iter()
            .filter(|candidate| {
                rated
                    .keys()
                    .any(|rated_item| self.qualifies(*candidate, rated_item))
            })
            .collect();

        tracing::debug!(
            user_id,
            rated = rated.len(),
            candidates = candidates.len(),
            "Generated candidates"
        );

        candidates
    }

    fn qualifies(&self, candidate: ItemId, rated_item: ItemId) -> bool {
        match (
            self.engine.item_similarity(candidate, rated_item).score(),
            self.options.min_similarity,
        ) {
            (Some(score), Some(threshold)) => score >= threshold,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}
