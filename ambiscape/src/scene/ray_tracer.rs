//! Ray intersection callback trait supplied by the host engine.
//!
//! The estimators never own scene geometry. They ask a [`RayTracer`] for
//! intersections and interpret the answers.

use crate::math::Vec3;
use std::collections::HashSet;

/// Opaque identity of a collider in the host scene.
///
/// Used to skip hits on an emitter's own geometry and to look up
/// per-surface material overrides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

impl std::fmt::Display for ColliderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ColliderId({})", self.0)
    }
}

/// Bitmask of collision layers a query should consider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub fn contains_layer(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A single ray intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    /// World-space hit point
    pub point: Vec3,

    /// Surface normal at the hit point (normalized)
    pub normal: Vec3,

    /// Distance from the ray origin to `point`
    pub distance: f32,

    /// Collider that was hit
    pub collider: ColliderId,

    /// Name of the surface's render/physics material, if the host knows it
    pub material: Option<String>,
}

impl RayHit {
    pub fn new(point: Vec3, normal: Vec3, distance: f32, collider: ColliderId) -> Self {
        Self {
            point,
            normal,
            distance,
            collider,
            material: None,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

/// Ray queries against the host scene.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a context can be moved to
/// whichever thread drives the frame loop.
///
/// # Example
///
/// ```
/// use ambiscape::math::Vec3;
/// use ambiscape::scene::{ColliderId, LayerMask, RayHit, RayTracer};
///
/// /// An infinite floor at y = 0.
/// struct Floor;
///
/// impl RayTracer for Floor {
///     fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, _mask: LayerMask)
///         -> Option<RayHit> {
///         if direction.y >= 0.0 || origin.y <= 0.0 {
///             return None;
///         }
///         let t = -origin.y / direction.y;
///         (t <= max_distance)
///             .then(|| RayHit::new(origin + direction * t, Vec3::Y, t, ColliderId(1)))
///     }
/// }
///
/// let hit = Floor.cast_ray(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0, LayerMask::ALL);
/// assert_eq!(hit.map(|h| h.distance), Some(2.0));
/// ```
pub trait RayTracer: Send + Sync {
    /// Closest intersection along the ray, or `None` for a miss.
    ///
    /// # Parameters
    ///
    /// * `origin` - Ray start in world space
    /// * `direction` - Unit direction
    /// * `max_distance` - Furthest distance to test
    /// * `layer_mask` - Layers to consider
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Option<RayHit>;

    /// Every collider along the segment, ordered by distance of first contact.
    ///
    /// Each collider appears at most once, even if the host reports further
    /// hits on it from inside. The default implementation repeatedly calls
    /// [`RayTracer::cast_ray`], restarting just past each hit and stepping
    /// out of colliders it has already reported. Override it if the host can
    /// enumerate hits natively.
    fn cast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Vec<RayHit> {
        const STEP: f32 = 1e-3;
        const MAX_HITS: usize = 64;
        const MAX_STEP: f32 = 0.05;
        const MAX_CASTS: usize = 256;

        let mut hits = Vec::new();
        let mut seen = HashSet::new();
        let mut travelled = 0.0;
        let mut step = STEP;
        for _ in 0..MAX_CASTS {
            if travelled >= max_distance || hits.len() >= MAX_HITS {
                break;
            }
            let start = origin + direction * travelled;
            let Some(mut hit) = self.cast_ray(start, direction, max_distance - travelled, layer_mask)
            else {
                break;
            };
            hit.distance += travelled;
            if seen.insert(hit.collider) {
                step = STEP;
                travelled = hit.distance + step;
                hits.push(hit);
            } else {
                // Still inside a reported collider; widen the step until we leave it.
                step = (step * 2.0).min(MAX_STEP);
                travelled = hit.distance.max(travelled) + step;
            }
        }
        hits
    }
}
