use serde::Serialize;
use tracing_subscriber::EnvFilter;

use taste_engine::{
    config::Config,
    models::{Point, RecommendedItem, UserId},
    services::{choose_initial_centroids, CandidateOptions, Recommender, RngSource, SimilarityEngine},
    store::{load_points, load_preferences, LoadOptions},
};

/// Summary printed to stdout once all work is done
#[derive(Debug, Serialize)]
struct RunSummary {
    users: usize,
    items: usize,
    recommendations: Vec<UserRecommendations>,
    centroids: Vec<Point>,
}

#[derive(Debug, Serialize)]
struct UserRecommendations {
    user_id: UserId,
    items: Vec<RecommendedItem>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        config.input_path = path;
    }

    tracing::info!(input = %config.input_path, "Loading preferences");

    let store = load_preferences(
        &config.input_path,
        LoadOptions {
            duplicate_policy: config.duplicate_policy,
            malformed_policy: config.malformed_policy,
        },
    )
    .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", config.input_path, e))?;

    let recommender = Recommender::new(
        SimilarityEngine::euclidean(&store),
        CandidateOptions {
            min_similarity: config.min_similarity,
        },
    );

    let mut recommendations = Vec::new();
    for (user_id, items) in recommender.recommend_all(config.recommendations_per_user)? {
        for item in &items {
            tracing::info!(
                user_id,
                item_id = item.item_id,
                value = item.estimated_value,
                "Recommended item"
            );
        }
        recommendations.push(UserRecommendations { user_id, items });
    }

    let centroids = match &config.points_path {
        Some(path) => {
            let points = load_points(path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path, e))?;
            let mut rng = match config.random_seed {
                Some(seed) => RngSource::seeded(seed),
                None => RngSource::from_entropy(),
            };
            choose_initial_centroids(points, config.centroid_count, &mut rng)
        }
        None => Vec::new(),
    };

    let summary = RunSummary {
        users: store.num_users(),
        items: store.num_items(),
        recommendations,
        centroids,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
