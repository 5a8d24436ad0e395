use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{
    error::{AppError, AppResult},
    models::Point,
};

/// Generates `count` points normally distributed around `center`
///
/// Every coordinate is drawn independently from `N(center[d], std_dev)`.
/// Used to build synthetic clustering inputs.
pub fn generate_samples<R: Rng + ?Sized>(
    count: usize,
    center: &[f64],
    std_dev: f64,
    rng: &mut R,
) -> AppResult<Vec<Point>> {
    if center.is_empty() {
        return Err(AppError::InvalidInput(
            "sample center must have at least one dimension".to_string(),
        ));
    }

    let distributions = center
        .iter()
        .map(|mean| {
            Normal::new(*mean, std_dev).map_err(|e| {
                AppError::InvalidInput(format!(
                    "invalid normal distribution N({}, {}): {}",
                    mean, std_dev, e
                ))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let points = (0..count)
        .map(|_| Point::new(distributions.iter().map(|d| d.sample(rng)).collect()))
        .collect();

    Ok(points)
}
