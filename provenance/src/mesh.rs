use std::{
    io::{BufRead, BufReader, Read, Seek},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    geometry::{enclosed_volume, signed_tetrahedron_volume, BoundingBox},
    Pos, Triangle,
};

/// A mesh made of vertices and triangular faces, kept in the coordinate frame
/// it was loaded in. Cloning is cheap, the geometry is shared.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,
}

#[derive(Debug)]
struct MeshInner {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
}

impl Mesh {
    /// Creates a new mesh from the given vertices and faces. Faces that
    /// reference a missing vertex are dropped.
    pub fn new(vertices: Vec<Pos>, mut faces: Vec<[u32; 3]>) -> Self {
        let count = vertices.len();
        faces.retain(|face| face.iter().all(|&x| (x as usize) < count));

        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
            }),
        }
    }

    pub fn vertices(&self) -> &[Pos] {
        self.inner.vertices.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.inner.faces.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces().is_empty()
    }

    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let v = self.vertices();
        let [a, b, c] = *self.faces().get(index)?;
        Some([v[a as usize], v[b as usize], v[c as usize]])
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.face_count()).filter_map(|x| self.triangle(x))
    }

    /// Absolute enclosed volume, see [`crate::geometry::compute_volume`].
    /// Faces are summed in parallel.
    pub fn volume(&self) -> f64 {
        let v = self.vertices();
        enclosed_volume(
            self.faces()
                .par_iter()
                .map(|&[a, b, c]| {
                    signed_tetrahedron_volume(&v[a as usize], &v[b as usize], &v[c as usize])
                })
                .sum::<f64>(),
        )
    }

    /// Get the minimum and maximum of each component of every vertex in the
    /// model. Returns None for a mesh without vertices.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices())
    }

    /// Centroid of the surface, with every triangle weighted by its area.
    /// Falls back to the vertex average when the surface has no area.
    pub fn centroid(&self) -> Option<Pos> {
        let vertices = self.vertices();
        if vertices.is_empty() {
            return None;
        }

        let (weighted, area) = self
            .triangles()
            .fold((Vector3::zeros(), 0.0), |(sum, total), [a, b, c]| {
                let area = (b - a).cross(&(c - a)).norm() / 2.0;
                (sum + (a + b + c) / 3.0 * area, total + area)
            });

        Some(if area > 0.0 && area.is_finite() {
            weighted / area
        } else {
            vertices.iter().fold(Vector3::zeros(), |acc, x| acc + x) / vertices.len() as f64
        })
    }
}

/// Loads a buffer into a mesh. Supported formats include `.stl` (ascii and
/// binary) and `.obj`.
pub fn load_mesh<T: Read + Seek>(mut reader: T, format: &str) -> Result<Mesh> {
    let format = format.to_ascii_lowercase();
    let mesh = match format.as_str() {
        "stl" => load_stl(&mut reader)?,
        "obj" => load_obj(BufReader::new(reader))?,
        _ => bail!("Unsupported format: {format}"),
    };

    debug!(
        "Parsed {format} mesh with {} vertices and {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

fn load_stl<T: Read + Seek>(reader: &mut T) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Failed to parse STL")?;

    let vertices = (stl.vertices.iter())
        .map(|v| Vector3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let faces = (stl.faces.iter())
        .map(|f| f.vertices.map(|x| x as u32))
        .collect();

    Ok(Mesh::new(vertices, faces))
}

fn load_obj<T: BufRead>(reader: T) -> Result<Mesh> {
    let obj: obj::Obj<obj::Position, u32> =
        obj::load_obj(reader).context("Failed to parse OBJ")?;

    let vertices = (obj.vertices.iter())
        .map(|v| v.position.map(|x| x as f64).into())
        .collect();
    let faces = (obj.indices.chunks_exact(3))
        .map(|x| [x[0], x[1], x[2]])
        .collect();

    Ok(Mesh::new(vertices, faces))
}

/// Closed cube with outward facing triangles.
#[cfg(test)]
pub(crate) fn cube(min: Pos, side: f64) -> Mesh {
    let vertices = (0..8)
        .map(|i| {
            let corner = Vector3::new((i & 1) as f64, ((i >> 1) & 1) as f64, (i >> 2) as f64);
            min + corner * side
        })
        .collect();
    let faces = [
        [[0, 2, 3], [0, 3, 1]], // -z
        [[4, 5, 7], [4, 7, 6]], // +z
        [[0, 1, 5], [0, 5, 4]], // -y
        [[2, 6, 7], [2, 7, 3]], // +y
        [[0, 4, 6], [0, 6, 2]], // -x
        [[1, 3, 7], [1, 7, 5]], // +x
    ]
    .concat();

    Mesh::new(vertices, faces)
}
