use crate::{
    models::{ItemId, PreferenceVector, Similarity, UserId},
    store::PreferenceStore,
};

/// Pairwise similarity between two sparse preference vectors
///
/// Implementations must be symmetric and must return
/// `Similarity::Undefined` when the vectors share no key.
pub trait SimilarityMetric: Send + Sync {
    fn similarity(&self, a: &PreferenceVector, b: &PreferenceVector) -> Similarity;

    /// Metric name for logging
    fn name(&self) -> &'static str;
}

/// Similarity derived from Euclidean distance over co-rated keys
///
/// `s = 1 / (1 + d)` where `d` is the distance restricted to the overlap.
/// Overlap size is deliberately not used as a confidence weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistanceSimilarity;

impl SimilarityMetric for EuclideanDistanceSimilarity {
    fn similarity(&self, a: &PreferenceVector, b: &PreferenceVector) -> Similarity {
        let mut overlap = 0usize;
        let mut sum_squares = 0.0;

        // Summed in key order so that sim(a, b) and sim(b, a) are bit-identical
        for (_, x, y) in a.overlap(b) {
            let diff = x - y;
            sum_squares += diff * diff;
            overlap += 1;
        }

        if overlap == 0 {
            return Similarity::Undefined;
        }

        Similarity::Defined(1.0 / (1.0 + sum_squares.sqrt()))
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Binds a metric to a preference store for id-based lookups
pub struct SimilarityEngine<'a, M: SimilarityMetric = EuclideanDistanceSimilarity> {
    store: &'a PreferenceStore,
    metric: M,
}

impl<'a> SimilarityEngine<'a, EuclideanDistanceSimilarity> {
    /// Engine using the Euclidean-derived metric
    pub fn euclidean(store: &'a PreferenceStore) -> Self {
        Self::new(store, EuclideanDistanceSimilarity)
    }
}

impl<'a, M: SimilarityMetric> SimilarityEngine<'a, M> {
    pub fn new(store: &'a PreferenceStore, metric: M) -> Self {
        Self { store, metric }
    }

    pub fn store(&self) -> &'a PreferenceStore {
        self.store
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Similarity of two items over the users who rated both
    pub fn item_similarity(&self, a: ItemId, b: ItemId) -> Similarity {
        match (self.store.item_vector(a), self.store.item_vector(b)) {
            (Some(va), Some(vb)) => self.metric.similarity(va, vb),
            _ => Similarity::Undefined,
        }
    }

    /// Similarity of two users over the items both rated
    pub fn user_similarity(&self, a: UserId, b: UserId) -> Similarity {
        match (self.store.user_vector(a), self.store.user_vector(b)) {
            (Some(va), Some(vb)) => self.metric.similarity(va, vb),
            _ => Similarity::Undefined,
        }
    }
}
