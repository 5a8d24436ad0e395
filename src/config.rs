use serde::Deserialize;

use crate::store::{DuplicatePolicy, MalformedPolicy};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Delimited preference file (`userId,itemId,value` per line)
    #[serde(default = "default_input_path")]
    pub input_path: String,

    /// Optional point file used to seed cluster centroids
    #[serde(default)]
    pub points_path: Option<String>,

    /// Number of items recommended to each user
    #[serde(default = "default_recommendations_per_user")]
    pub recommendations_per_user: usize,

    /// Number of centroids chosen from the point file
    #[serde(default = "default_centroid_count")]
    pub centroid_count: usize,

    /// Minimum item similarity for candidate generation
    #[serde(default)]
    pub min_similarity: Option<f64>,

    /// What to do when a (user, item) pair appears twice
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// What to do with lines that fail to parse
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,

    /// Seed for the sampler's random source
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_input_path() -> String {
    "data/item.csv".to_string()
}

fn default_recommendations_per_user() -> usize {
    3
}

fn default_centroid_count() -> usize {
    3
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
            .validated()
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_pairs<I>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(pairs)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
            .validated()
    }

    /// Rejects values that deserialize but cannot be used
    fn validated(self) -> anyhow::Result<Self> {
        if let Some(threshold) = self.min_similarity {
            if !threshold.is_finite() {
                anyhow::bail!("MIN_SIMILARITY must be finite, got {}", threshold);
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_pairs(Vec::new()).unwrap();
        assert_eq!(config.input_path, "data/item.csv");
        assert_eq!(config.points_path, None);
        assert_eq!(config.recommendations_per_user, 3);
        assert_eq!(config.centroid_count, 3);
        assert_eq!(config.min_similarity, None);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert_eq!(config.malformed_policy, MalformedPolicy::Abort);
        assert_eq!(config.random_seed, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_pairs(pairs(&[
            ("INPUT_PATH", "prefs.tsv"),
            ("POINTS_PATH", "points.csv"),
            ("RECOMMENDATIONS_PER_USER", "10"),
            ("CENTROID_COUNT", "5"),
            ("MIN_SIMILARITY", "0.25"),
            ("DUPLICATE_POLICY", "reject"),
            ("MALFORMED_POLICY", "skip"),
            ("RANDOM_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.input_path, "prefs.tsv");
        assert_eq!(config.points_path.as_deref(), Some("points.csv"));
        assert_eq!(config.recommendations_per_user, 10);
        assert_eq!(config.centroid_count, 5);
        assert_eq!(config.min_similarity, Some(0.25));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.malformed_policy, MalformedPolicy::Skip);
        assert_eq!(config.random_seed, Some(42));
    }

    #[test]
    fn test_rejects_non_finite_min_similarity() {
        for value in ["NaN", "inf", "-inf"] {
            let result = Config::from_pairs(pairs(&[("MIN_SIMILARITY", value)]));
            assert!(result.is_err(), "{} was accepted", value);
        }
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = Config::from_pairs(pairs(&[("DUPLICATE_POLICY", "merge")]));
        assert!(result.is_err());
    }
}
