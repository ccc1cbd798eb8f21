//! A small analytic level: a brick room open on its +X side, an interior
//! wooden partition, and open ground outside.

use ambiscape::{ColliderId, LayerMask, RayHit, RayTracer, Vec3};

pub const PARTITION: ColliderId = ColliderId(20);

struct Slab {
    min: Vec3,
    max: Vec3,
    collider: ColliderId,
    material: &'static str,
}

impl Slab {
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            if d.abs() < 1e-8 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let a = (self.min[axis] - o) / d;
            let b = (self.max[axis] - o) / d;
            let (near, far) = if a < b { (a, b) } else { (b, a) };
            if near > t_enter {
                t_enter = near;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(far);
        }
        if t_enter < 0.0 || t_enter > t_exit || t_enter > max_distance {
            return None;
        }
        Some(
            RayHit::new(origin + direction * t_enter, normal, t_enter, self.collider)
                .with_material(self.material),
        )
    }
}

pub struct DemoScene {
    slabs: Vec<Slab>,
}

impl DemoScene {
    /// Room interior spans x,z in [-6, 6] and y in [0, 4].
    pub fn new() -> Self {
        let slab = |min: [f32; 3], max: [f32; 3], id: u64, material| Slab {
            min: Vec3::from(min),
            max: Vec3::from(max),
            collider: ColliderId(id),
            material,
        };
        let slabs = vec![
            slab([-200.0, -0.3, -200.0], [200.0, 0.0, 200.0], 1, "Default"),
            slab([-6.0, 4.0, -6.0], [6.0, 4.3, 6.0], 2, "Concrete"),
            slab([-6.3, 0.0, -6.0], [-6.0, 4.0, 6.0], 3, "Brick"),
            slab([-6.0, 0.0, -6.3], [6.0, 4.0, -6.0], 4, "Brick"),
            slab([-6.0, 0.0, 6.0], [6.0, 4.0, 6.3], 5, "Brick"),
            slab([-3.1, 0.0, -6.0], [-3.0, 4.0, 6.0], PARTITION.0, "Wood"),
        ];
        Self { slabs }
    }
}

impl RayTracer for DemoScene {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _layer_mask: LayerMask,
    ) -> Option<RayHit> {
        self.slabs
            .iter()
            .filter_map(|slab| slab.intersect(origin, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
