//! Integration tests for voxmesh-isosurface
//!
//! These tests run the full extraction pipeline on realistic volumes and
//! verify the mesh invariants end to end.

use voxmesh_core::Point3f;
use voxmesh_isosurface::{
    laplacian_smooth, marching_cubes, MarchingCubes, MarchingCubesConfig, ScalarField,
};

/// Build a signed-distance sphere sampled on a regular grid
fn sphere_volume(extent: usize, radius: f32) -> Vec<f32> {
    let center = (extent - 1) as f32 / 2.0;
    let mut data = Vec::with_capacity(extent * extent * extent);

    for z in 0..extent {
        for y in 0..extent {
            for x in 0..extent {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dz = z as f32 - center;
                data.push((dx * dx + dy * dy + dz * dz).sqrt() - radius);
            }
        }
    }

    data
}

#[test]
fn test_sphere_extraction_invariants() {
    let data = sphere_volume(16, 5.0);
    let field = ScalarField::new(&data, 16, 16, 16).unwrap();

    // Inside the sphere the distance is negative, so extract at 0.0.
    let mesh = marching_cubes(&field, 0.0).unwrap();

    assert!(!mesh.is_empty());
    assert!(mesh.indices_in_bounds());

    // Every distinct grid edge maps to exactly one vertex, and distinct grid
    // edges have distinct midpoints.
    let mut positions: Vec<[u32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
        .collect();
    positions.sort_unstable();
    positions.dedup();
    assert_eq!(positions.len(), mesh.vertex_count());
}

#[test]
fn test_sphere_extraction_is_deterministic() {
    let data = sphere_volume(12, 4.0);
    let field = ScalarField::new(&data, 12, 12, 12).unwrap();

    let first = marching_cubes(&field, 0.0).unwrap();
    let second = marching_cubes(&field, 0.0).unwrap();

    assert_eq!(first.vertices, second.vertices);
    assert_eq!(first.faces, second.faces);
}

#[test]
fn test_smoothing_is_deterministic() {
    let data = sphere_volume(16, 5.0);
    let field = ScalarField::new(&data, 16, 16, 16).unwrap();
    let mesh = marching_cubes(&field, 0.0).unwrap();

    // Neighbor sums accumulate in a fixed order, so repeated invocations on
    // the same mesh are bit-identical despite float non-associativity.
    let reference = laplacian_smooth(&mesh.vertices, &mesh.faces, 5, 0.5);
    for _ in 0..4 {
        let again = laplacian_smooth(&mesh.vertices, &mesh.faces, 5, 0.5);
        assert_eq!(again, reference);
    }
}

#[test]
fn test_isolated_voxel_with_smoothing() {
    // A 3x3x3 zero volume with a single hot interior voxel marches into a
    // closed octahedron-like surface: 6 vertices, 8 triangles. Smoothing
    // must not change those counts.
    let mut data = vec![0.0f32; 27];
    data[13] = 1.0;
    let field = ScalarField::new(&data, 3, 3, 3).unwrap();

    let config = MarchingCubesConfig {
        iso_level: 0.5,
        smoothing_iterations: 1,
        smoothing_factor: 0.05,
    };
    let mesh = MarchingCubes::new(config).extract(&field).unwrap();

    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.face_count(), 8);
}

#[test]
fn test_smoothing_pulls_sphere_vertices_inward() {
    let data = sphere_volume(16, 5.0);
    let field = ScalarField::new(&data, 16, 16, 16).unwrap();

    let mesh = marching_cubes(&field, 0.0).unwrap();
    let smoothed = laplacian_smooth(&mesh.vertices, &mesh.faces, 10, 0.5);

    assert_eq!(smoothed.len(), mesh.vertex_count());

    // Laplacian relaxation of a closed convex surface shrinks it.
    let center = Point3f::new(7.5, 7.5, 7.5);
    let mean_radius = |vertices: &[Point3f]| {
        vertices
            .iter()
            .map(|v| (v - center).magnitude())
            .sum::<f32>()
            / vertices.len() as f32
    };

    assert!(mean_radius(&smoothed) < mean_radius(&mesh.vertices));
}

#[test]
fn test_full_configured_pipeline_matches_manual_smoothing() {
    let data = sphere_volume(12, 4.0);
    let field = ScalarField::new(&data, 12, 12, 12).unwrap();

    let raw = marching_cubes(&field, 0.0).unwrap();
    let manual = laplacian_smooth(&raw.vertices, &raw.faces, 3, 0.4);

    let config = MarchingCubesConfig {
        iso_level: 0.0,
        smoothing_iterations: 3,
        smoothing_factor: 0.4,
    };
    let piped = MarchingCubes::new(config).extract(&field).unwrap();

    assert_eq!(piped.vertices, manual);
    assert_eq!(piped.faces, raw.faces);
}
