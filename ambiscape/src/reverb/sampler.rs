//! Spherical ray sweeps amortized across ticks.

use crate::math::Vec3;
use crate::scene::{LayerMask, RayTracer};

/// One ray of a sweep. Regenerated wholesale every sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayDescriptor {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub max_distance: f32,
}

impl RayDescriptor {
    /// Point at `max_distance` along the ray.
    pub fn endpoint(&self) -> Vec3 {
        self.origin + self.direction * self.max_distance
    }
}

/// Outcome of casting one [`RayDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySample {
    pub ray: RayDescriptor,
    /// Real hit point, `None` if the ray escaped
    pub hit: Option<Vec3>,
}

impl RaySample {
    /// The hit point, or the ray's endpoint for an open-area miss.
    pub fn point(&self) -> Vec3 {
        self.hit.unwrap_or_else(|| self.ray.endpoint())
    }

    pub fn is_open(&self) -> bool {
        self.hit.is_none()
    }
}

/// Unit directions for `vertical_layers` elevation bands spread evenly over
/// `vertical_fov_degrees`, each with `horizontal_rays` evenly spaced azimuths.
///
/// A single band lies on the horizon.
pub fn sweep_directions(
    horizontal_rays: usize,
    vertical_layers: usize,
    vertical_fov_degrees: f32,
) -> Vec<Vec3> {
    let half_fov = (vertical_fov_degrees * 0.5).to_radians();
    let mut directions = Vec::with_capacity(horizontal_rays * vertical_layers);

    for layer in 0..vertical_layers {
        let elevation = if vertical_layers > 1 {
            -half_fov + 2.0 * half_fov * layer as f32 / (vertical_layers - 1) as f32
        } else {
            0.0
        };
        let (sin_el, cos_el) = elevation.sin_cos();

        for ray in 0..horizontal_rays {
            let azimuth = std::f32::consts::TAU * ray as f32 / horizontal_rays as f32;
            let (sin_az, cos_az) = azimuth.sin_cos();
            directions.push(Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az).normalize());
        }
    }

    directions
}

/// Casts a sweep of rays in fixed-size batches.
///
/// The sampler holds a cursor into the current sweep's ray list; each
/// [`sample_batch`](Self::sample_batch) call advances it by at most `n` rays
/// and returns control to the caller.
#[derive(Debug, Clone)]
pub struct RaycastSampler {
    rays: Vec<RayDescriptor>,
    cursor: usize,
    points: Vec<Vec3>,
    layer_mask: LayerMask,
}

impl RaycastSampler {
    pub fn new(layer_mask: LayerMask) -> Self {
        Self {
            rays: Vec::new(),
            cursor: 0,
            points: Vec::new(),
            layer_mask,
        }
    }

    /// Replaces any sweep in progress with a fresh one from `origin`.
    pub fn generate(
        &mut self,
        origin: Vec3,
        horizontal_rays: usize,
        vertical_layers: usize,
        vertical_fov_degrees: f32,
        max_distance: f32,
    ) -> &[RayDescriptor] {
        self.rays = sweep_directions(horizontal_rays, vertical_layers, vertical_fov_degrees)
            .into_iter()
            .map(|direction| RayDescriptor {
                origin,
                direction,
                max_distance,
            })
            .collect();
        self.cursor = 0;
        self.points.clear();
        self.points.reserve(self.rays.len());
        &self.rays
    }

    /// Casts up to `n` of the remaining rays.
    pub fn sample_batch(&mut self, tracer: &dyn RayTracer, n: usize) -> Vec<RaySample> {
        let end = (self.cursor + n).min(self.rays.len());
        let mut samples = Vec::with_capacity(end - self.cursor);

        for ray in &self.rays[self.cursor..end] {
            let hit = tracer
                .cast_ray(ray.origin, ray.direction, ray.max_distance, self.layer_mask)
                .map(|hit| hit.point);
            let sample = RaySample { ray: *ray, hit };
            self.points.push(sample.point());
            samples.push(sample);
        }

        self.cursor = end;
        samples
    }

    /// A sweep exists and still has rays to cast.
    pub fn in_progress(&self) -> bool {
        self.cursor < self.rays.len()
    }

    /// A sweep exists and every ray has been cast.
    pub fn is_complete(&self) -> bool {
        !self.rays.is_empty() && self.cursor == self.rays.len()
    }

    /// Whether `origin` is more than `threshold` away from the current sweep's origin.
    ///
    /// Returns false when no sweep has been generated.
    pub fn has_moved(&self, origin: Vec3, threshold: f32) -> bool {
        self.origin()
            .is_some_and(|sweep_origin| sweep_origin.distance(origin) > threshold)
    }

    pub fn origin(&self) -> Option<Vec3> {
        self.rays.first().map(|ray| ray.origin)
    }

    /// Hand back the sweep's points and drop the sweep.
    pub fn finish(&mut self) -> Vec<Vec3> {
        self.rays.clear();
        self.cursor = 0;
        std::mem::take(&mut self.points)
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.rays.len() - self.cursor
    }

    /// Points collected so far in the current sweep
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::TestScene;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_direction_count_and_unit_length() {
        let directions = sweep_directions(16, 3, 60.0);
        assert_eq!(directions.len(), 48);
        for d in &directions {
            assert_abs_diff_eq!(d.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_elevation_bands_span_fov() {
        let directions = sweep_directions(4, 3, 60.0);
        let elevations: Vec<f32> = directions
            .iter()
            .step_by(4)
            .map(|d| d.y.asin().to_degrees())
            .collect();
        assert_abs_diff_eq!(elevations[0], -30.0, epsilon = 1e-3);
        assert_abs_diff_eq!(elevations[1], 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(elevations[2], 30.0, epsilon = 1e-3);
    }

    #[test]
    fn test_single_layer_on_horizon() {
        for d in sweep_directions(8, 1, 60.0) {
            assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sweep_completes_in_batches() {
        let scene = TestScene::empty();
        let mut sampler = RaycastSampler::new(LayerMask::ALL);
        sampler.generate(Vec3::ZERO, 16, 3, 60.0, 20.0);
        assert_eq!(sampler.len(), 48);

        let mut ticks = 0;
        while sampler.in_progress() {
            let batch = sampler.sample_batch(&scene, 4);
            assert_eq!(batch.len(), 4);
            ticks += 1;
        }
        assert_eq!(ticks, 12);
        assert!(sampler.is_complete());
        assert_eq!(sampler.points().len(), 48);
    }

    #[test]
    fn test_misses_become_open_area_points() {
        let scene = TestScene::empty();
        let mut sampler = RaycastSampler::new(LayerMask::ALL);
        sampler.generate(Vec3::new(1.0, 0.0, 0.0), 4, 1, 60.0, 10.0);
        let samples = sampler.sample_batch(&scene, 4);
        for sample in samples {
            assert!(sample.is_open());
            assert_abs_diff_eq!(sample.point().distance(Vec3::new(1.0, 0.0, 0.0)), 10.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_hits_record_real_points() {
        let scene = TestScene::room(Vec3::splat(-2.0), Vec3::splat(2.0), "Concrete");
        let mut sampler = RaycastSampler::new(LayerMask::ALL);
        sampler.generate(Vec3::ZERO, 4, 1, 60.0, 50.0);
        let samples = sampler.sample_batch(&scene, 10);
        assert_eq!(samples.len(), 4);
        for sample in samples {
            let hit = sample.hit.expect("room walls should be hit");
            assert_abs_diff_eq!(hit.length(), 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_regenerate_discards_progress() {
        let scene = TestScene::empty();
        let mut sampler = RaycastSampler::new(LayerMask::ALL);
        sampler.generate(Vec3::ZERO, 8, 2, 60.0, 10.0);
        sampler.sample_batch(&scene, 5);
        assert!(sampler.has_moved(Vec3::new(3.0, 0.0, 0.0), 1.0));
        assert!(!sampler.has_moved(Vec3::new(0.5, 0.0, 0.0), 1.0));

        sampler.generate(Vec3::new(3.0, 0.0, 0.0), 8, 2, 60.0, 10.0);
        assert_eq!(sampler.remaining(), 16);
        assert!(sampler.points().is_empty());
        assert_eq!(sampler.origin(), Some(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_finish_returns_points_and_goes_idle() {
        let scene = TestScene::empty();
        let mut sampler = RaycastSampler::new(LayerMask::ALL);
        assert!(!sampler.has_moved(Vec3::splat(100.0), 0.1));
        sampler.generate(Vec3::ZERO, 2, 1, 60.0, 10.0);
        sampler.sample_batch(&scene, 2);
        let points = sampler.finish();
        assert_eq!(points.len(), 2);
        assert!(sampler.is_empty());
        assert!(!sampler.in_progress());
        assert!(!sampler.is_complete());
    }
}
