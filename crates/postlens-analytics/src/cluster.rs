//! Seeded k-means over post embeddings.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AnalyticsError;

const DEFAULT_MAX_ITER: usize = 300;
const DEFAULT_TOL: f64 = 1e-4;

/// Batch k-means with k-means++ seeding and Lloyd iterations.
///
/// The same `seed` over the same data always yields the same assignment.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    seed: u64,
    max_iter: usize,
    tol: f64,
}

impl KMeans {
    #[must_use]
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Cluster `data` and return one id in `0..k` per row.
    ///
    /// An empty dataset yields no assignments.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::EmbeddingShape`] if rows differ in length.
    /// - [`AnalyticsError::Clustering`] if `k` is zero or there are fewer
    ///   rows than clusters.
    pub fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>, AnalyticsError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let dim = data[0].len();
        if let Some(row) = data.iter().position(|row| row.len() != dim) {
            return Err(AnalyticsError::EmbeddingShape(format!(
                "row {row} has dimension {}, expected {dim}",
                data[row].len()
            )));
        }
        if self.k == 0 {
            return Err(AnalyticsError::Clustering(
                "cluster count must be at least 1".to_string(),
            ));
        }
        if data.len() < self.k {
            return Err(AnalyticsError::Clustering(format!(
                "{} samples cannot form {} clusters",
                data.len(),
                self.k
            )));
        }

        let points: Vec<Vec<f64>> = data
            .iter()
            .map(|row| row.iter().map(|&x| f64::from(x)).collect())
            .collect();
        let threshold = self.tol * mean_variance(&points, dim);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centers = self.init_centers(&points, &mut rng);
        let mut labels = assign(&points, &centers);

        for iteration in 0..self.max_iter {
            let updated = recompute(&points, &labels, &centers);
            let shift: f64 = centers
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_distance(old, new))
                .sum();
            centers = updated;
            labels = assign(&points, &centers);
            if shift <= threshold {
                tracing::debug!(iterations = iteration + 1, "k-means converged");
                break;
            }
        }

        Ok(labels)
    }

    /// k-means++: first centre uniform, each next one sampled with
    /// probability proportional to squared distance from the nearest centre.
    fn init_centers(&self, points: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centers = Vec::with_capacity(self.k);
        centers.push(points[rng.random_range(0..points.len())].clone());

        let mut nearest: Vec<f64> = points
            .iter()
            .map(|p| squared_distance(p, &centers[0]))
            .collect();

        while centers.len() < self.k {
            let total: f64 = nearest.iter().sum();
            let idx = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                nearest
                    .iter()
                    .position(|&d| {
                        target -= d;
                        target < 0.0
                    })
                    .unwrap_or(points.len() - 1)
            } else {
                rng.random_range(0..points.len())
            };
            let center = points[idx].clone();
            for (best, p) in nearest.iter_mut().zip(points) {
                *best = best.min(squared_distance(p, &center));
            }
            centers.push(center);
        }
        centers
    }
}

/// Index of the nearest centre per point; ties go to the lower index.
fn assign(points: &[Vec<f64>], centers: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, c) in centers.iter().enumerate() {
                let d = squared_distance(p, c);
                if d < best_dist {
                    best = idx;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}

/// Member means per cluster. A cluster that lost all members keeps its
/// previous centre.
fn recompute(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; previous.len()];
    let mut counts = vec![0_usize; previous.len()];
    for (p, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, x) in sums[label].iter_mut().zip(p) {
            *s += x;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                #[allow(clippy::cast_precision_loss)]
                let n = count as f64;
                sum.into_iter().map(|s| s / n).collect()
            }
        })
        .collect()
}

fn mean_variance(points: &[Vec<f64>], dim: usize) -> f64 {
    if dim == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mut total = 0.0;
    for d in 0..dim {
        let mean = points.iter().map(|p| p[d]).sum::<f64>() / n;
        total += points.iter().map(|p| (p[d] - mean).powi(2)).sum::<f64>() / n;
    }
    #[allow(clippy::cast_precision_loss)]
    let dims = dim as f64;
    total / dims
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
