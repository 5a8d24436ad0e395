use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, PreferenceVector, RecommendedItem, UserId},
};

use super::candidates::{CandidateGenerator, CandidateOptions};
use super::similarity::{SimilarityEngine, SimilarityMetric};

/// Item-based collaborative filtering recommender
///
/// Scores each candidate as the similarity-weighted average of the user's
/// own preferences for the items it is similar to, then ranks by estimate.
pub struct Recommender<'a, M: SimilarityMetric> {
    engine: SimilarityEngine<'a, M>,
    candidate_options: CandidateOptions,
}

impl<'a, M: SimilarityMetric> Recommender<'a, M> {
    pub fn new(engine: SimilarityEngine<'a, M>, candidate_options: CandidateOptions) -> Self {
        Self {
            engine,
            candidate_options,
        }
    }

    pub fn engine(&self) -> &SimilarityEngine<'a, M> {
        &self.engine
    }

    /// Top-N items for a user, best first
    ///
    /// Ties on the estimate are broken by ascending item id. `top_n == 0`
    /// yields an empty list. Fails with `UnknownUser` when the user has no
    /// preferences at all.
    #[instrument(skip(self))]
    pub fn recommend(&self, user_id: UserId, top_n: usize) -> AppResult<Vec<RecommendedItem>> {
        let rated = self
            .engine
            .store()
            .user_vector(user_id)
            .ok_or(AppError::UnknownUser(user_id))?;

        if top_n == 0 {
            return Ok(Vec::new());
        }

        let generator = CandidateGenerator::new(&self.engine, self.candidate_options);
        let candidates = generator.candidates(user_id);

        let mut scored: Vec<RecommendedItem> = candidates
            .into_iter()
            .filter_map(|item_id| {
                let estimate = self.estimate(rated, item_id);
                if estimate.is_none() {
                    tracing::debug!(user_id, item_id, "Candidate has no estimable score");
                }
                estimate.map(|value| RecommendedItem::new(item_id, value))
            })
            .collect();

        scored.sort_by(RecommendedItem::rank_cmp);
        scored.truncate(top_n);

        tracing::debug!(user_id, count = scored.len(), "Recommendations ranked");

        Ok(scored)
    }

    /// Recommendations for every user, in ascending user id order
    pub fn recommend_all(&self, top_n: usize) -> AppResult<Vec<(UserId, Vec<RecommendedItem>)>> {
        let store = self.engine.store();
        let mut results = Vec::with_capacity(store.num_users());

        for user_id in store.all_user_ids() {
            results.push((user_id, self.recommend(user_id, top_n)?));
        }

        tracing::info!(
            users = results.len(),
            recommended = results.iter().map(|(_, items)| items.len()).sum::<usize>(),
            "Recommendations computed for all users"
        );

        Ok(results)
    }

    /// Estimated preference of a user for one item
    ///
    /// Returns the stored value when the user already rated the item, and
    /// `None` when no estimate can be formed.
    pub fn estimate_preference(&self, user_id: UserId, item_id: ItemId) -> AppResult<Option<f64>> {
        let rated = self
            .engine
            .store()
            .user_vector(user_id)
            .ok_or(AppError::UnknownUser(user_id))?;

        if let Some(value) = rated.get(item_id) {
            return Ok(Some(value));
        }

        Ok(self.estimate(rated, item_id))
    }

    /// Weighted average over rated items with a defined similarity to `item_id`
    fn estimate(&self, rated: &PreferenceVector, item_id: ItemId) -> Option<f64> {
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (rated_item, preference) in rated.iter() {
            if let Some(sim) = self.engine.item_similarity(item_id, rated_item).score() {
                numerator += sim * preference;
                denominator += sim.abs();
            }
        }

        if denominator == 0.0 {
            return None;
        }

        let estimate = numerator / denominator;
        estimate.is_finite().then_some(estimate)
    }
}
