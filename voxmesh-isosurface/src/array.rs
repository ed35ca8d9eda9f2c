//! Conversion between multi-dimensional arrays and extracted meshes
//!
//! Boundary layer for callers holding `ndarray` volumes: validates the
//! dimensionality, flattens the view into the layout the extractor expects,
//! and returns the mesh as a pair of plain arrays.

use ndarray::{Array1, Array2, ArrayViewD};

use voxmesh_core::{Error, Result};

use crate::marching::{MarchingCubes, MarchingCubesConfig, ScalarField};

/// Extract an isosurface from a 3-dimensional array of scalar samples
///
/// Axis 0 is x, axis 1 is y, axis 2 is z. Returns an `N x 3` vertex-position
/// array and a flat index array where every 3 consecutive entries form one
/// triangle. Fails with [`Error::InvalidData`] if the view is not
/// 3-dimensional; smoothing runs when `n_smoothing_iterations > 0`.
pub fn extract_from_array(
    volume: &ArrayViewD<'_, f32>,
    iso_level: f32,
    n_smoothing_iterations: usize,
    smoothing_factor: f32,
) -> Result<(Array2<f32>, Array1<i32>)> {
    if volume.ndim() != 3 {
        return Err(Error::InvalidData(format!(
            "ndim must be 3, not {}",
            volume.ndim()
        )));
    }

    let shape = volume.shape();
    let (width, height, depth) = (shape[0], shape[1], shape[2]);

    // Flatten with x varying fastest regardless of the view's memory order.
    let mut data = Vec::with_capacity(width * height * depth);
    for z in 0..depth {
        for y in 0..height {
            for x in 0..width {
                data.push(volume[[x, y, z]]);
            }
        }
    }

    let field = ScalarField::new(&data, width, height, depth)?;
    let config = MarchingCubesConfig {
        iso_level,
        smoothing_iterations: n_smoothing_iterations,
        smoothing_factor,
    };
    let mesh = MarchingCubes::new(config).extract(&field)?;

    let mut vertices = Array2::zeros((mesh.vertex_count(), 3));
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        vertices[[i, 0]] = vertex.x;
        vertices[[i, 1]] = vertex.y;
        vertices[[i, 2]] = vertex.z;
    }

    let indices: Vec<i32> = mesh
        .faces
        .iter()
        .flat_map(|face| face.iter().map(|&index| index as i32))
        .collect();

    Ok((vertices, Array1::from_vec(indices)))
}
