//! Utilities useful for various generations tasks.

use glamx::{Vec2, Vec3};

/// Pushes two triangles forming the rectangle `ul, ur, dr, dl`.
///
/// The corners are named as seen from the side the triangles face:
///
/// * `ul` - the up-left point.
/// * `dl` - the down-left point.
/// * `dr` - the down-right point.
/// * `ur` - the up-right point.
#[inline]
pub fn push_rectangle_indices(ul: u32, ur: u32, dl: u32, dr: u32, out: &mut Vec<[u32; 3]>) {
    out.push([ul, dl, dr]);
    out.push([dr, ur, ul]);
}

/// Reverses the clockwising of a set of faces.
#[inline]
pub fn reverse_clockwising(indices: &mut [[u32; 3]]) {
    for i in indices.iter_mut() {
        i.swap(0, 1);
    }
}

/// Twice the signed area of a closed polygon. Positive for counter-clockwise polygons.
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n)
        .map(|i| polygon[i].perp_dot(polygon[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Whether `point` lies inside `polygon`, using the even-odd rule.
pub fn is_point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);

    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Computes the normals of a set of vertices.
///
/// Each vertex normal is the mean of the normals of the faces sharing it.
#[inline]
pub fn compute_normals(coordinates: &[Vec3], faces: &[[u32; 3]], normals: &mut Vec<Vec3>) {
    let mut divisor: Vec<f32> = vec![0.0; coordinates.len()];

    normals.clear();
    normals.extend(std::iter::repeat_n(Vec3::ZERO, coordinates.len()));

    // Accumulate normals ...
    for f in faces.iter() {
        let edge1 = coordinates[f[1] as usize] - coordinates[f[0] as usize];
        let edge2 = coordinates[f[2] as usize] - coordinates[f[0] as usize];
        let normal = edge1.cross(edge2).normalize_or_zero();

        for &v in f {
            normals[v as usize] += normal;
            divisor[v as usize] += 1.0;
        }
    }

    // ... and compute the mean
    for (n, divisor) in normals.iter_mut().zip(divisor.iter()) {
        if *divisor > 0.0 {
            *n = (*n / *divisor).normalize_or_zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn signed_area_follows_orientation() {
        let mut poly = square();
        assert_eq!(signed_area(&poly), 4.0);
        poly.reverse();
        assert_eq!(signed_area(&poly), -4.0);
    }

    #[test]
    fn point_in_polygon() {
        let poly = square();
        assert!(is_point_in_polygon(Vec2::new(1.0, 1.0), &poly));
        assert!(!is_point_in_polygon(Vec2::new(3.0, 1.0), &poly));
        assert!(!is_point_in_polygon(Vec2::new(1.0, -0.5), &poly));
    }
}
