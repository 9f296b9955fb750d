use super::Aabb;
use glamx::Vec3;
use rand::Rng;

/// An unordered set of points rendered as screen-facing squares.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PointCloud {
    /// The point positions, in the local space of the node holding the cloud.
    pub positions: Vec<Vec3>,
}

impl PointCloud {
    /// Creates a point cloud from explicit positions.
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    /// The number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the cloud has no point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The bounding box of the points, or `None` for an empty cloud.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (mins, maxs) = self
            .positions
            .iter()
            .fold((first, first), |(mins, maxs), p| (mins.min(*p), maxs.max(*p)));

        Some(Aabb { mins, maxs })
    }
}

/// Scatters `count` points uniformly inside an axis-aligned cube of side `spread` centered
/// on the origin.
///
/// Each coordinate is sampled as `(u - 0.5) * spread` with `u` uniform in `[0, 1)`.
pub fn random_cube<R: Rng + ?Sized>(count: usize, spread: f32, rng: &mut R) -> PointCloud {
    let positions = (0..count)
        .map(|_| {
            Vec3::new(
                (rng.random::<f32>() - 0.5) * spread,
                (rng.random::<f32>() - 0.5) * spread,
                (rng.random::<f32>() - 0.5) * spread,
            )
        })
        .collect();

    PointCloud { positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn points_stay_inside_the_cube() {
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = random_cube(1000, 30.0, &mut rng);
        assert_eq!(cloud.len(), 1000);

        let aabb = cloud.bounding_box().unwrap();
        assert!(aabb.mins.cmpge(Vec3::splat(-15.0)).all());
        assert!(aabb.maxs.cmple(Vec3::splat(15.0)).all());
        // A thousand uniform samples spread over most of the range.
        assert!(aabb.extents().cmpgt(Vec3::splat(25.0)).all());
    }

    #[test]
    fn same_seed_same_cloud() {
        let a = random_cube(10, 2.0, &mut StdRng::seed_from_u64(3));
        let b = random_cube(10, 2.0, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
