//! K-means (Lloyd's algorithm) over unique colors.
//!
//! Points are the unique colors as 3-D vectors with squared Euclidean
//! distance. The loop stops when a full round leaves every centroid
//! bit-identical, or after [`MAX_ITERATIONS`] rounds. There is no distance
//! tolerance, so most real images run to the cap.

use crate::color::Rgb;
use crate::palette::nearest;

/// Iteration cap for Lloyd's loop.
pub const MAX_ITERATIONS: usize = 50;

/// Result of [`cluster`].
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Exactly `k` centroids (empty only for empty input)
    pub centroids: Vec<Rgb>,
    /// Rounds executed, at most [`MAX_ITERATIONS`]
    pub iterations: usize,
    /// True if the last round changed nothing
    pub converged: bool,
}

/// Starting centroids.
///
/// With no more points than `k`, every point is used and the list is padded
/// by cycling through the points again. Otherwise points are taken at stride
/// `len / k` in discovery order.
fn initial_centroids(points: &[Rgb], k: usize) -> Vec<Rgb> {
    if points.len() <= k {
        points.iter().cycle().take(k).copied().collect()
    } else {
        let stride = points.len() / k;
        (0..k).map(|i| points[i * stride]).collect()
    }
}

fn same_centroids(a: &[Rgb], b: &[Rgb]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.same_bits(*y))
}

/// Cluster `points` into `k` centroids.
///
/// Each round assigns every point to its nearest centroid (ties go to the
/// lowest index), then moves each centroid to the mean of its points. A
/// centroid with no points keeps its position for that round.
pub fn cluster(points: &[Rgb], k: usize) -> KMeansResult {
    if points.is_empty() {
        return KMeansResult {
            centroids: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }
    let k = k.max(1);

    let mut centroids = initial_centroids(points, k);
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        sums.iter_mut().for_each(|s| *s = [0.0; 3]);
        counts.iter_mut().for_each(|c| *c = 0);

        for &p in points {
            let (idx, _) = nearest(&centroids, p);
            sums[idx][0] += p.r as f64;
            sums[idx][1] += p.g as f64;
            sums[idx][2] += p.b as f64;
            counts[idx] += 1;
        }

        let next: Vec<Rgb> = centroids
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if counts[i] == 0 {
                    c
                } else {
                    let n = counts[i] as f64;
                    Rgb::new(
                        (sums[i][0] / n) as f32,
                        (sums[i][1] / n) as f32,
                        (sums[i][2] / n) as f32,
                    )
                }
            })
            .collect();

        let unchanged = same_centroids(&next, &centroids);
        centroids = next;
        if unchanged {
            converged = true;
            break;
        }
    }

    KMeansResult {
        centroids,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_pads_cyclically() {
        let a = Rgb::new(0.1, 0.0, 0.0);
        let b = Rgb::new(0.9, 0.0, 0.0);
        assert_eq!(initial_centroids(&[a, b], 5), vec![a, b, a, b, a]);
    }

    #[test]
    fn test_initial_strided() {
        let points: Vec<Rgb> = (0..10).map(|i| Rgb::new(i as f32 / 10.0, 0.0, 0.0)).collect();
        // stride 10 / 3 = 3 -> indices 0, 3, 6
        assert_eq!(
            initial_centroids(&points, 3),
            vec![points[0], points[3], points[6]]
        );
    }

    #[test]
    fn test_two_clusters_separate() {
        let mut points = Vec::new();
        for i in 0..5 {
            points.push(Rgb::new(0.0 + i as f32 * 0.01, 0.0, 0.0));
            points.push(Rgb::new(1.0 - i as f32 * 0.01, 1.0, 1.0));
        }
        let result = cluster(&points, 2);
        assert_eq!(result.centroids.len(), 2);
        assert!(result.converged);
        let mut reds: Vec<f32> = result.centroids.iter().map(|c| c.r).collect();
        reds.sort_by(f32::total_cmp);
        assert!((reds[0] - 0.02).abs() < 1e-5);
        assert!((reds[1] - 0.98).abs() < 1e-5);
    }

    #[test]
    fn test_fewer_points_than_k_returns_k() {
        let points = [Rgb::BLACK, Rgb::new(1.0, 1.0, 1.0)];
        let result = cluster(&points, 6);
        assert_eq!(result.centroids.len(), 6);
        // Padded duplicates never win a tie, so nothing moves.
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_iteration_cap() {
        let points: Vec<Rgb> = (0..2000)
            .map(|i| {
                Rgb::from_u8(
                    (i * 37 % 256) as u8,
                    (i * 91 % 256) as u8,
                    (i * 53 % 256) as u8,
                )
            })
            .collect();
        let result = cluster(&points, 16);
        assert_eq!(result.centroids.len(), 16);
        assert!(result.iterations <= MAX_ITERATIONS);
    }

    #[test]
    fn test_empty_input() {
        let result = cluster(&[], 4);
        assert!(result.centroids.is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_deterministic() {
        let points: Vec<Rgb> = (0..300)
            .map(|i| Rgb::from_u8((i % 256) as u8, (i * 3 % 256) as u8, 7))
            .collect();
        assert_eq!(cluster(&points, 5), cluster(&points, 5));
    }
}
