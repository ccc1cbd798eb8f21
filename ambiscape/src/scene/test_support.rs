//! Analytic scenes for unit tests.

use crate::math::Vec3;
use crate::scene::{ColliderId, LayerMask, RayHit, RayTracer};

/// A solid axis-aligned box. Rays starting inside it pass through unless
/// `inside_hits` is set, in which case they hit it at distance 0.
#[derive(Debug, Clone)]
pub(crate) struct SolidBox {
    pub min: Vec3,
    pub max: Vec3,
    pub collider: ColliderId,
    pub material: Option<&'static str>,
    pub inside_hits: bool,
}

impl SolidBox {
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let inv = Vec3::new(
            safe_recip(direction.x),
            safe_recip(direction.y),
            safe_recip(direction.z),
        );
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;
        let near = t1.min(t2);
        let far = t1.max(t2);
        let t_enter = near.max_element();
        let t_exit = far.min_element();

        if self.inside_hits && t_enter < 0.0 && t_exit >= 0.0 {
            return Some(self.hit(RayHit::new(origin, -direction, 0.0, self.collider)));
        }
        if t_enter < 0.0 || t_enter > t_exit || t_enter > max_distance {
            return None;
        }

        let normal = if near.x >= near.y && near.x >= near.z {
            Vec3::new(-direction.x.signum(), 0.0, 0.0)
        } else if near.y >= near.z {
            Vec3::new(0.0, -direction.y.signum(), 0.0)
        } else {
            Vec3::new(0.0, 0.0, -direction.z.signum())
        };

        let hit = RayHit::new(origin + direction * t_enter, normal, t_enter, self.collider);
        Some(self.hit(hit))
    }

    fn hit(&self, hit: RayHit) -> RayHit {
        match self.material {
            Some(name) => hit.with_material(name),
            None => hit,
        }
    }
}

fn safe_recip(v: f32) -> f32 {
    if v.abs() < f32::EPSILON {
        f32::INFINITY
    } else {
        1.0 / v
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TestScene {
    pub boxes: Vec<SolidBox>,
}

impl TestScene {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Six wall slabs enclosing the interior `[min, max]`, collider ids 1..=6.
    pub fn room(min: Vec3, max: Vec3, material: &'static str) -> Self {
        let t = 0.2;
        let mut scene = Self::empty();
        let slabs = [
            (Vec3::new(min.x - t, min.y, min.z), Vec3::new(min.x, max.y, max.z)),
            (Vec3::new(max.x, min.y, min.z), Vec3::new(max.x + t, max.y, max.z)),
            (Vec3::new(min.x, min.y - t, min.z), Vec3::new(max.x, min.y, max.z)),
            (Vec3::new(min.x, max.y, min.z), Vec3::new(max.x, max.y + t, max.z)),
            (Vec3::new(min.x, min.y, min.z - t), Vec3::new(max.x, max.y, min.z)),
            (Vec3::new(min.x, min.y, max.z), Vec3::new(max.x, max.y, max.z + t)),
        ];
        for (i, (lo, hi)) in slabs.into_iter().enumerate() {
            scene.boxes.push(SolidBox {
                min: lo,
                max: hi,
                collider: ColliderId(i as u64 + 1),
                material: Some(material),
                inside_hits: false,
            });
        }
        scene
    }

    /// A wall perpendicular to X occupying `x ∈ [x, x + thickness]`.
    pub fn with_wall(
        mut self,
        x: f32,
        thickness: f32,
        collider: ColliderId,
        material: Option<&'static str>,
    ) -> Self {
        self.boxes.push(SolidBox {
            min: Vec3::new(x, -100.0, -100.0),
            max: Vec3::new(x + thickness, 100.0, 100.0),
            collider,
            material,
            inside_hits: false,
        });
        self
    }

    /// A small cube centred on `center`, used as an emitter's own body.
    pub fn with_cube(mut self, center: Vec3, half: f32, collider: ColliderId) -> Self {
        self.boxes.push(SolidBox {
            min: center - Vec3::splat(half),
            max: center + Vec3::splat(half),
            collider,
            material: Some("Metal"),
            inside_hits: false,
        });
        self
    }

    /// Makes every box report a zero-distance hit to rays starting inside it,
    /// the way many physics engines do.
    pub fn reporting_inside_hits(mut self) -> Self {
        for b in &mut self.boxes {
            b.inside_hits = true;
        }
        self
    }
}

impl RayTracer for TestScene {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _layer_mask: LayerMask,
    ) -> Option<RayHit> {
        self.boxes
            .iter()
            .filter_map(|b| b.intersect(origin, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
