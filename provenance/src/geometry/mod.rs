use crate::{Pos, Triangle};

mod bounding_box;
pub use bounding_box::BoundingBox;

/// Signed volume of the tetrahedron formed by a triangle and the origin.
#[inline]
pub fn signed_tetrahedron_volume(v1: &Pos, v2: &Pos, v3: &Pos) -> f64 {
    v1.dot(&v2.cross(v3)) / 6.0
}

/// Computes the enclosed volume of a triangle soup using the divergence
/// theorem, in the cube of whatever units the vertices are in.
///
/// The absolute value of the summed signed volumes is returned so flipped
/// winding on a closed mesh does not produce a negative volume. This masks
/// winding defects rather than detecting them. Empty or fully degenerate input
/// yields zero, as does any non-finite result.
pub fn compute_volume<'a>(triangles: impl IntoIterator<Item = &'a Triangle>) -> f64 {
    enclosed_volume(
        triangles
            .into_iter()
            .map(|[v1, v2, v3]| signed_tetrahedron_volume(v1, v2, v3))
            .sum(),
    )
}

/// Turns a sum of signed tetrahedron volumes into an enclosed volume.
pub(crate) fn enclosed_volume(signed: f64) -> f64 {
    let volume = signed.abs();
    if volume.is_finite() {
        volume
    } else {
        0.0
    }
}

/// Estimated mass in grams of a part with the given volume (mm³), solid
/// density (g/cm³) and infill percentage.
///
/// Infill is treated as a uniform fraction of the solid volume, walls and top
/// / bottom shells are not accounted for.
pub fn compute_mass(volume_mm3: f64, density: f64, infill: u8) -> f64 {
    volume_mm3 * density * (infill as f64 / 100.0) / 1000.0
}
