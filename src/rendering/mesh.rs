//! Procedural latitude/longitude sphere.
//!
//! The grid has `(lat_res + 1) * (lon_res + 1)` vertices; the seam column and
//! both pole rows are duplicated rather than welded, so pole triangles are
//! degenerate. Vertex and index order are fixed and depend only on the inputs.

use super::Vertex;
use std::f32::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CPU-side sphere geometry. Consumed by the GPU upload and dropped there.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Build a closed triangulated sphere of the given radius centered at the origin.
pub fn generate_sphere(lat_res: u32, lon_res: u32, radius: f32) -> Result<Mesh, MeshError> {
    if lat_res == 0 || lon_res == 0 {
        return Err(MeshError::InvalidArgument(format!(
            "resolution must be at least 1 (lat {lat_res}, lon {lon_res})"
        )));
    }
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(MeshError::InvalidArgument(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }

    let row = lon_res as usize + 1;
    let mut vertices = Vec::with_capacity((lat_res as usize + 1) * row);
    for lat in 0..=lat_res {
        let theta = PI * (lat as f32 / lat_res as f32);
        let (sin_theta, cos_theta) = theta.sin_cos();
        for lon in 0..=lon_res {
            let phi = 2.0 * PI * (lon as f32 / lon_res as f32);
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = [cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            let position = normal.map(|c| c * radius);
            vertices.push(Vertex::new(position, normal));
        }
    }

    let mut indices = Vec::with_capacity(lat_res as usize * lon_res as usize * 6);
    for lat in 0..lat_res {
        for lon in 0..lon_res {
            let first = lat * (lon_res + 1) + lon;
            let second = first + lon_res + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    Ok(Mesh { vertices, indices })
}
