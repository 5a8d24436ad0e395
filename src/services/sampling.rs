use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Point;

/// Source of uniform random indices for sampling
///
/// Injected into every sampling call so tests can supply seeded or mocked
/// sources.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource {
    /// Uniform integer in `[0, upper)`; `upper` is always at least 1
    fn next_index(&mut self, upper: u64) -> u64;
}

/// Adapts any `rand` generator into a [`RandomSource`]
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }

    /// The wrapped generator, for callers that need other distributions
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.0
    }
}

impl RngSource<StdRng> {
    /// Reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, upper: u64) -> u64 {
        if upper <= 1 {
            return 0;
        }
        self.0.gen_range(0..upper)
    }
}

/// Upper bound on slots reserved before any element arrives
const INITIAL_ALLOCATION: usize = 1024;

/// Fixed-capacity uniform sample over a stream (Algorithm R)
///
/// After `n >= k` offers every element has been kept with probability
/// `k / n`, independent of arrival order.
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T> {
    capacity: usize,
    seen: u64,
    reservoir: Vec<T>,
}

impl<T> ReservoirSampler<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            reservoir: Vec::with_capacity(capacity.min(INITIAL_ALLOCATION)),
        }
    }

    /// Offers the next stream element
    ///
    /// The first `capacity` elements are kept outright. Element `i` after
    /// that draws `j` uniformly from `[0, i)` and replaces slot `j` when
    /// `j < capacity`. A zero-capacity sampler never draws.
    pub fn offer<R: RandomSource + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;

        if self.capacity == 0 {
            return;
        }

        if self.reservoir.len() < self.capacity {
            self.reservoir.push(item);
            return;
        }

        let j = rng.next_index(self.seen);
        if j < self.capacity as u64 {
            self.reservoir[j as usize] = item;
        }
    }

    /// Offers every element of `items` in order
    pub fn extend<I, R>(&mut self, items: I, rng: &mut R)
    where
        I: IntoIterator<Item = T>,
        R: RandomSource + ?Sized,
    {
        for item in items {
            self.offer(item, rng);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements offered so far
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn as_slice(&self) -> &[T] {
        &self.reservoir
    }

    pub fn into_sample(self) -> Vec<T> {
        self.reservoir
    }
}

/// Single-pass uniform sample of at most `k` elements from `stream`
pub fn sample<T, I, R>(stream: I, k: usize, rng: &mut R) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    R: RandomSource + ?Sized,
{
    let mut sampler = ReservoirSampler::new(k);
    sampler.extend(stream, rng);
    sampler.into_sample()
}

/// Picks `k` initial cluster centroids uniformly from a point stream
pub fn choose_initial_centroids<I, R>(points: I, k: usize, rng: &mut R) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
    R: RandomSource + ?Sized,
{
    let mut sampler = ReservoirSampler::new(k);
    sampler.extend(points, rng);

    let seen = sampler.seen();
    let centroids = sampler.into_sample();

    for centroid in &centroids {
        tracing::info!(centroid = %centroid, "Initial centroid");
    }
    tracing::info!(k, seen, chosen = centroids.len(), "Centroids seeded");

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_zero_capacity_never_draws() {
        let mut rng = MockRandomSource::new();
        rng.expect_next_index().never();

        let result = sample(1..=100, 0, &mut rng);
        assert!(result.is_empty());
    }

    #[test]
    fn test_short_stream_returns_everything_without_draws() {
        let mut rng = MockRandomSource::new();
        rng.expect_next_index().never();

        let result = sample(vec!['a', 'b', 'c'], 5, &mut rng);
        assert_eq!(result, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_huge_capacity_returns_whole_stream() {
        let mut rng = MockRandomSource::new();
        rng.expect_next_index().never();

        let result = sample(1..=3u32, usize::MAX, &mut rng);
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[test]
    fn test_extend_matches_repeated_offer() {
        let mut by_offer = ReservoirSampler::new(4);
        let mut rng = RngSource::seeded(5);
        for i in 0..100 {
            by_offer.offer(i, &mut rng);
        }

        let mut by_extend = ReservoirSampler::new(4);
        by_extend.extend(0..100, &mut RngSource::seeded(5));

        assert_eq!(by_extend.seen(), 100);
        assert_eq!(by_extend.as_slice(), by_offer.as_slice());
    }

    #[test]
    fn test_replacement_uses_drawn_position() {
        let mut rng = MockRandomSource::new();
        let mut seq = Sequence::new();
        // Element 3 draws from [0, 3) and lands in slot 1
        rng.expect_next_index()
            .with(eq(3u64))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(1u64);
        // Element 4 draws from [0, 4) and is discarded
        rng.expect_next_index()
            .with(eq(4u64))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(2u64);
        // Element 5 draws from [0, 5) and lands in slot 0
        rng.expect_next_index()
            .with(eq(5u64))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(0u64);

        let result = sample(vec![10, 20, 30, 40, 50], 2, &mut rng);
        assert_eq!(result, vec![50, 30]);
    }

    #[test]
    fn test_sampler_tracks_seen_and_capacity() {
        let mut rng = RngSource::seeded(7);
        let mut sampler = ReservoirSampler::new(3);
        for i in 0..50 {
            sampler.offer(i, &mut rng);
            assert!(sampler.as_slice().len() <= 3);
        }
        assert_eq!(sampler.seen(), 50);
        assert_eq!(sampler.capacity(), 3);
        assert_eq!(sampler.as_slice().len(), 3);
    }

    #[test]
    fn test_uniform_selection_frequency() {
        const RUNS: usize = 10_000;
        let mut rng = RngSource::seeded(42);
        let mut counts = [0usize; 10];

        for _ in 0..RUNS {
            for value in sample(1..=10usize, 3, &mut rng) {
                counts[value - 1] += 1;
            }
        }

        for (i, count) in counts.iter().enumerate() {
            let frequency = *count as f64 / RUNS as f64;
            assert!(
                (frequency - 0.3).abs() < 0.02,
                "value {} selected with frequency {}",
                i + 1,
                frequency
            );
        }
    }

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let first = sample(0..1000, 5, &mut RngSource::seeded(99));
        let second = sample(0..1000, 5, &mut RngSource::seeded(99));
        assert_eq!(first, second);
    }

    #[test]
    fn test_choose_initial_centroids() {
        let points: Vec<Point> = (0..20).map(|i| Point::new(vec![i as f64, 0.0])).collect();
        let centroids = choose_initial_centroids(points.clone(), 3, &mut RngSource::seeded(1));

        assert_eq!(centroids.len(), 3);
        for centroid in &centroids {
            assert!(points.contains(centroid));
        }
    }
}
