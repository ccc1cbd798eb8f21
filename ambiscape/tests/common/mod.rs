//! Shared scene and context builders for the scenario tests.

#![allow(dead_code)]

use ambiscape::backend::MemoryBackend;
use ambiscape::{
    AmbiscapeContext, AmbiscapeDesc, ColliderId, LayerMask, MaterialTable, RayHit, RayTracer, Vec3,
};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Solid axis-aligned slab. Rays that start inside it pass through.
#[derive(Debug, Clone)]
pub struct Slab {
    pub min: Vec3,
    pub max: Vec3,
    pub collider: ColliderId,
    pub material: &'static str,
}

impl Slab {
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);
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

#[derive(Debug, Clone, Default)]
pub struct SlabScene {
    pub slabs: Vec<Slab>,
}

impl SlabScene {
    /// Closed room with interior `[min, max]`, walls 0.25 thick.
    pub fn room(min: Vec3, max: Vec3, material: &'static str) -> Self {
        let t = 0.25;
        let mut scene = Self::default();
        for axis in 0..3 {
            let mut lo_min = min;
            let mut lo_max = max;
            lo_min[axis] = min[axis] - t;
            lo_max[axis] = min[axis];
            let mut hi_min = min;
            let mut hi_max = max;
            hi_min[axis] = max[axis];
            hi_max[axis] = max[axis] + t;
            let id = scene.slabs.len() as u64;
            scene.slabs.push(Slab {
                min: lo_min,
                max: lo_max,
                collider: ColliderId(100 + id),
                material,
            });
            scene.slabs.push(Slab {
                min: hi_min,
                max: hi_max,
                collider: ColliderId(101 + id),
                material,
            });
        }
        scene
    }

    /// Wall across the X axis covering `x ∈ [x, x + thickness]`.
    pub fn with_wall(mut self, x: f32, thickness: f32, collider: u64, material: &'static str) -> Self {
        self.slabs.push(Slab {
            min: Vec3::new(x, -50.0, -50.0),
            max: Vec3::new(x + thickness, 50.0, 50.0),
            collider: ColliderId(collider),
            material,
        });
        self
    }
}

impl RayTracer for SlabScene {
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

pub fn context(desc: AmbiscapeDesc, scene: SlabScene) -> AmbiscapeContext<MemoryBackend> {
    init_logging();
    AmbiscapeContext::new(
        desc,
        Arc::new(scene),
        MaterialTable::with_presets(),
        MemoryBackend::new(),
    )
    .expect("valid context")
}
