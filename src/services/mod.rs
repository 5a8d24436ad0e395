pub mod candidates;
pub mod recommender;
pub mod samples;
pub mod sampling;
pub mod similarity;

pub use candidates::{CandidateGenerator, CandidateOptions};
pub use recommender::Recommender;
pub use samples::generate_samples;
pub use sampling::{choose_initial_centroids, sample, RandomSource, ReservoirSampler, RngSource};
pub use similarity::{EuclideanDistanceSimilarity, SimilarityEngine, SimilarityMetric};
