//! Marching Cubes isosurface extraction
//!
//! This module walks every unit cube of a dense scalar volume, classifies it
//! against an isosurface threshold, and emits a deduplicated shared-vertex
//! triangle mesh. Surface vertices sit at the midpoints of the grid edges the
//! surface crosses; cubes that share a grid edge share the resulting vertex.

use std::collections::HashMap;

use voxmesh_core::{Error, Point3f, Result, TriangleMesh};

use crate::smoothing;
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, TRIANGLE_TABLE};

/// A canonicalized pair of flat grid-point indices identifying a grid edge
///
/// The smaller index always comes first, so the same physical edge maps to
/// the same key no matter which cube visited it.
pub type EdgeKey = (usize, usize);

/// A read-only view over a dense 3D scalar field
///
/// Samples are stored flat, with x varying fastest, then y, then z:
/// `index = z * width * height + y * width + x`. The view never owns or
/// mutates the buffer.
#[derive(Debug, Clone, Copy)]
pub struct ScalarField<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
    depth: usize,
}

impl<'a> ScalarField<'a> {
    /// Create a field view, validating that the buffer matches the extents
    pub fn new(data: &'a [f32], width: usize, height: usize, depth: usize) -> Result<Self> {
        if data.len() != width * height * depth {
            return Err(Error::InvalidData(format!(
                "Volume buffer has {} samples, expected {} for extents ({}, {}, {})",
                data.len(),
                width * height * depth,
                width,
                height,
                depth
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            depth,
        })
    }

    /// Width of the volume (x extent)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the volume (y extent)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth of the volume (z extent)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Convert grid coordinates to a flat buffer index
    fn flat_index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.width * self.height + y * self.width + x
    }

    /// Decode a flat buffer index back into grid coordinates
    fn grid_coords(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.width;
        let y = (index / self.width) % self.height;
        let z = index / (self.width * self.height);
        (x, y, z)
    }

    fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.flat_index(x, y, z)]
    }
}

/// Configuration for Marching Cubes extraction
#[derive(Debug, Clone)]
pub struct MarchingCubesConfig {
    /// Isosurface level (scalar value to extract)
    pub iso_level: f32,
    /// Laplacian smoothing passes applied after extraction (0 disables)
    pub smoothing_iterations: usize,
    /// Blend weight between the neighbor average and the current position
    pub smoothing_factor: f32,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            smoothing_iterations: 10,
            smoothing_factor: 0.5,
        }
    }
}

/// Marching Cubes implementation
pub struct MarchingCubes {
    config: MarchingCubesConfig,
}

impl MarchingCubes {
    /// Create a new Marching Cubes instance
    pub fn new(config: MarchingCubesConfig) -> Self {
        Self { config }
    }

    /// Extract the isosurface from a scalar field as an indexed triangle mesh
    ///
    /// Volumes with any extent below 2 contain no complete cube and yield an
    /// empty mesh. When `smoothing_iterations` is nonzero the vertex
    /// positions are relaxed after extraction; the topology is untouched.
    pub fn extract(&self, field: &ScalarField) -> Result<TriangleMesh> {
        let mut corner_triples = Vec::new();

        for z in 0..field.depth().saturating_sub(1) {
            for y in 0..field.height().saturating_sub(1) {
                for x in 0..field.width().saturating_sub(1) {
                    march_cell(field, x, y, z, self.config.iso_level, &mut corner_triples);
                }
            }
        }

        let mut mesh = assemble_mesh(&corner_triples, field);

        if self.config.smoothing_iterations > 0 {
            mesh.vertices = smoothing::laplacian_smooth(
                &mesh.vertices,
                &mesh.faces,
                self.config.smoothing_iterations,
                self.config.smoothing_factor,
            );
        }

        Ok(mesh)
    }
}

/// Convenience function for plain extraction without smoothing
pub fn marching_cubes(field: &ScalarField, iso_level: f32) -> Result<TriangleMesh> {
    let config = MarchingCubesConfig {
        iso_level,
        smoothing_iterations: 0,
        ..Default::default()
    };
    MarchingCubes::new(config).extract(field)
}

/// Classify one cube and emit its triangles as edge-key triples
fn march_cell(
    field: &ScalarField,
    x: usize,
    y: usize,
    z: usize,
    iso_level: f32,
    corner_triples: &mut Vec<[EdgeKey; 3]>,
) {
    let mut cube_index = 0usize;
    for (bit, offset) in CORNER_OFFSETS.iter().enumerate() {
        // Strictly below the threshold; a value equal to the iso level
        // classifies as outside.
        if field.value(x + offset[0], y + offset[1], z + offset[2]) < iso_level {
            cube_index |= 1 << bit;
        }
    }

    // Rows for the uniform configurations 0 and 255 are empty, so fully
    // inside/outside cubes fall through without special-casing.
    let row = &TRIANGLE_TABLE[cube_index];

    let mut i = 0;
    while row[i] != -1 {
        corner_triples.push([
            cell_edge_key(row[i] as usize, x, y, z, field),
            cell_edge_key(row[i + 1] as usize, x, y, z, field),
            cell_edge_key(row[i + 2] as usize, x, y, z, field),
        ]);
        i += 3;
    }
}

/// Resolve a local cube edge to the canonical key of the grid edge it lies on
fn cell_edge_key(edge: usize, x: usize, y: usize, z: usize, field: &ScalarField) -> EdgeKey {
    let [corner_a, corner_b] = EDGE_CORNERS[edge];
    let offset_a = CORNER_OFFSETS[corner_a];
    let offset_b = CORNER_OFFSETS[corner_b];

    let index_a = field.flat_index(x + offset_a[0], y + offset_a[1], z + offset_a[2]);
    let index_b = field.flat_index(x + offset_b[0], y + offset_b[1], z + offset_b[2]);

    if index_a < index_b {
        (index_a, index_b)
    } else {
        (index_b, index_a)
    }
}

/// Midpoint of the grid edge identified by an edge key
fn edge_midpoint(key: EdgeKey, field: &ScalarField) -> Point3f {
    let (xa, ya, za) = field.grid_coords(key.0);
    let (xb, yb, zb) = field.grid_coords(key.1);

    Point3f::new(
        0.5 * (xa + xb) as f32,
        0.5 * (ya + yb) as f32,
        0.5 * (za + zb) as f32,
    )
}

/// Fold the emitted triples into an indexed mesh, deduplicating edge keys
///
/// The first occurrence of a key appends its midpoint vertex; repeats reuse
/// the existing index, so every distinct grid edge produces exactly one
/// vertex.
fn assemble_mesh(corner_triples: &[[EdgeKey; 3]], field: &ScalarField) -> TriangleMesh {
    let mut vertex_map: HashMap<EdgeKey, usize> = HashMap::new();
    let mut mesh = TriangleMesh::new();

    for corners in corner_triples {
        let mut face = [0usize; 3];
        for (slot, key) in corners.iter().enumerate() {
            face[slot] = *vertex_map
                .entry(*key)
                .or_insert_with(|| mesh.add_vertex(edge_midpoint(*key, field)));
        }
        mesh.add_face(face);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3x3 zero volume with a single hot voxel at the center
    fn isolated_voxel_volume() -> Vec<f32> {
        let mut data = vec![0.0f32; 27];
        data[13] = 1.0; // (1, 1, 1)
        data
    }

    #[test]
    fn test_scalar_field_validates_buffer_length() {
        let data = vec![0.0f32; 26];
        assert!(ScalarField::new(&data, 3, 3, 3).is_err());
        let data = vec![0.0f32; 27];
        assert!(ScalarField::new(&data, 3, 3, 3).is_ok());
    }

    #[test]
    fn test_flat_index_round_trip() {
        let data = vec![0.0f32; 3 * 4 * 5];
        let field = ScalarField::new(&data, 3, 4, 5).unwrap();

        for z in 0..5 {
            for y in 0..4 {
                for x in 0..3 {
                    let index = field.flat_index(x, y, z);
                    assert_eq!(field.grid_coords(index), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_isolated_voxel_yields_octahedron() {
        let data = isolated_voxel_volume();
        let field = ScalarField::new(&data, 3, 3, 3).unwrap();

        let mesh = marching_cubes(&field, 0.5).unwrap();

        // One triangle pair per cube face around the hot voxel, closing into
        // an octahedron-like surface.
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 8);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_vertices_are_deduplicated() {
        let data = isolated_voxel_volume();
        let field = ScalarField::new(&data, 3, 3, 3).unwrap();

        let mesh = marching_cubes(&field, 0.5).unwrap();

        // Distinct grid edges have distinct midpoints, so a duplicated edge
        // key would show up as a repeated vertex position.
        for (i, a) in mesh.vertices.iter().enumerate() {
            for b in mesh.vertices.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let data = isolated_voxel_volume();
        let field = ScalarField::new(&data, 3, 3, 3).unwrap();

        let first = marching_cubes(&field, 0.5).unwrap();
        let second = marching_cubes(&field, 0.5).unwrap();

        assert_eq!(first.vertices, second.vertices);
        assert_eq!(first.faces, second.faces);
    }

    #[test]
    fn test_corner_at_iso_level_classifies_as_outside() {
        // A single cube whose origin corner sits exactly at the iso level
        // must behave identically to one strictly above it.
        let mut at_level = vec![0.0f32; 8];
        at_level[0] = 0.5;
        let mut above_level = vec![0.0f32; 8];
        above_level[0] = 1.0;

        let field_at = ScalarField::new(&at_level, 2, 2, 2).unwrap();
        let field_above = ScalarField::new(&above_level, 2, 2, 2).unwrap();

        let mesh_at = marching_cubes(&field_at, 0.5).unwrap();
        let mesh_above = marching_cubes(&field_above, 0.5).unwrap();

        assert_eq!(mesh_at.vertices, mesh_above.vertices);
        assert_eq!(mesh_at.faces, mesh_above.faces);
        assert!(!mesh_at.is_empty());
    }

    #[test]
    fn test_uniform_volume_yields_empty_mesh() {
        let data = vec![1.0f32; 27];
        let field = ScalarField::new(&data, 3, 3, 3).unwrap();

        let mesh = marching_cubes(&field, 0.5).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_degenerate_extents_yield_empty_mesh() {
        for (w, h, d) in [(1, 3, 3), (3, 1, 3), (3, 3, 1), (0, 3, 3), (2, 2, 1)] {
            let data = vec![1.0f32; w * h * d];
            let field = ScalarField::new(&data, w, h, d).unwrap();

            let mesh = marching_cubes(&field, 0.5).unwrap();
            assert!(mesh.is_empty(), "extents ({}, {}, {})", w, h, d);
        }
    }

    #[test]
    fn test_extract_applies_smoothing_without_changing_topology() {
        let data = isolated_voxel_volume();
        let field = ScalarField::new(&data, 3, 3, 3).unwrap();

        let raw = marching_cubes(&field, 0.5).unwrap();
        let config = MarchingCubesConfig {
            iso_level: 0.5,
            smoothing_iterations: 1,
            smoothing_factor: 0.05,
        };
        let smoothed = MarchingCubes::new(config).extract(&field).unwrap();

        assert_eq!(smoothed.faces, raw.faces);
        assert_eq!(smoothed.vertex_count(), raw.vertex_count());
        assert_ne!(smoothed.vertices, raw.vertices);
    }
}
