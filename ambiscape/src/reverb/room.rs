//! Bounding-volume room estimate with frequency-normalized smoothing.

use crate::config::ReverbDesc;
use crate::curve::ResponseCurve;
use crate::math::{Vec3, clamp01, inverse_lerp, lerp};

/// Fewest points that can describe a volume
pub const MIN_SAMPLE_POINTS: usize = 3;

/// Current room estimate.
///
/// `raw_volume` is replaced on every completed sweep; `smoothed_volume`
/// chases it. Both stay within the configured volume range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomEstimate {
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub raw_volume: f32,
    pub smoothed_volume: f32,
}

impl RoomEstimate {
    pub fn size(&self) -> Vec3 {
        (self.bounds_max - self.bounds_min).max(Vec3::ZERO)
    }

    pub fn surface_area(&self) -> f32 {
        let s = self.size();
        2.0 * (s.x * s.y + s.x * s.z + s.y * s.z)
    }

    /// RT60 decay estimate in seconds (Sabine), clamped to `[0.1, 10]`.
    ///
    /// Falls back to a cube of the smoothed volume when the bounds are flat.
    pub fn decay_time(&self) -> f32 {
        let volume = self.smoothed_volume;
        let mut surface = self.surface_area();
        if surface <= f32::EPSILON {
            surface = 6.0 * volume.powf(2.0 / 3.0);
        }
        if surface <= f32::EPSILON {
            return 0.1;
        }
        (0.161 * volume / surface).clamp(0.1, 10.0)
    }
}

/// Turns a sweep's points into a smoothed, clamped room volume.
#[derive(Debug, Clone)]
pub struct RoomVolumeEstimator {
    min_room_volume: f32,
    max_room_volume: f32,
    default_volume: f32,
    smoothing_factor: f32,
    update_frequency: f32,
    curve: ResponseCurve,
    estimate: RoomEstimate,
}

impl RoomVolumeEstimator {
    pub fn new(desc: &ReverbDesc) -> Self {
        let default_volume = desc.default_volume;
        Self {
            min_room_volume: desc.min_room_volume,
            max_room_volume: desc.max_room_volume,
            default_volume,
            smoothing_factor: desc.smoothing_factor,
            update_frequency: desc.update_frequency,
            curve: desc.response_curve.clone(),
            estimate: RoomEstimate {
                bounds_min: Vec3::ZERO,
                bounds_max: Vec3::ZERO,
                raw_volume: default_volume,
                smoothed_volume: default_volume,
            },
        }
    }

    /// Clamps a volume into `[min_room_volume, max_room_volume]`.
    pub fn clamp_volume(&self, volume: f32) -> f32 {
        if volume.is_nan() {
            return self.min_room_volume;
        }
        volume.clamp(self.min_room_volume, self.max_room_volume)
    }

    /// Records a sweep and advances smoothing by `delta_time`.
    ///
    /// With fewer than [`MIN_SAMPLE_POINTS`] points the raw volume becomes the
    /// configured default and the bounds collapse to the origin.
    pub fn update(&mut self, hit_points: &[Vec3], delta_time: f32) -> RoomEstimate {
        self.observe(hit_points);
        self.relax(delta_time)
    }

    /// Replaces the raw volume from a completed sweep. Returns the new raw volume.
    pub fn observe(&mut self, hit_points: &[Vec3]) -> f32 {
        if hit_points.len() < MIN_SAMPLE_POINTS {
            self.estimate.bounds_min = Vec3::ZERO;
            self.estimate.bounds_max = Vec3::ZERO;
            self.estimate.raw_volume = self.default_volume;
            return self.default_volume;
        }

        let (min, max) = hit_points.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        let size = max - min;

        self.estimate.bounds_min = min;
        self.estimate.bounds_max = max;
        self.estimate.raw_volume = self.clamp_volume(size.x * size.y * size.z);
        self.estimate.raw_volume
    }

    /// Moves the smoothed volume toward the raw volume.
    ///
    /// The step is `smoothing_factor * delta_time * update_frequency`, so the
    /// perceived responsiveness does not change with the sweep rate.
    pub fn relax(&mut self, delta_time: f32) -> RoomEstimate {
        let t = clamp01(self.smoothing_factor * delta_time.max(0.0) * self.update_frequency);
        let smoothed = lerp(self.estimate.smoothed_volume, self.estimate.raw_volume, t);
        self.estimate.smoothed_volume = self.clamp_volume(smoothed);
        self.estimate
    }

    /// Smoothed volume mapped through the response curve.
    pub fn normalized(&self) -> f32 {
        self.curve.evaluate(inverse_lerp(
            self.min_room_volume,
            self.max_room_volume,
            self.estimate.smoothed_volume,
        ))
    }

    pub fn estimate(&self) -> RoomEstimate {
        self.estimate
    }

    pub fn default_volume(&self) -> f32 {
        self.default_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn estimator() -> RoomVolumeEstimator {
        RoomVolumeEstimator::new(&ReverbDesc::default())
    }

    fn cube_corners(half: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(-half, -half, -half),
            Vec3::new(half, half, half),
            Vec3::new(half, -half, half),
        ]
    }

    #[test]
    fn test_too_few_points_gives_default() {
        let mut est = estimator();
        for points in [vec![], vec![Vec3::ONE], vec![Vec3::ONE, Vec3::splat(30.0)]] {
            let estimate = est.update(&points, 0.1);
            assert_eq!(estimate.raw_volume, est.default_volume());
        }
    }

    #[test]
    fn test_short_sweep_clears_previous_bounds() {
        let mut est = estimator();
        est.update(&cube_corners(5.0), 100.0);

        let e = est.update(&[Vec3::ONE, Vec3::splat(2.0)], 100.0);
        assert_eq!(e.bounds_min, Vec3::ZERO);
        assert_eq!(e.bounds_max, Vec3::ZERO);
        assert_eq!(e.surface_area(), 0.0);
        assert_eq!(e.smoothed_volume, 100.0);
        // Cube of the default volume: 0.161 * V / (6 * V^(2/3))
        assert_abs_diff_eq!(e.decay_time(), 0.161 * 100.0_f32.cbrt() / 6.0, epsilon = 1e-4);
    }

    #[test]
    fn test_volume_from_bounds() {
        let mut est = estimator();
        let raw = est.observe(&cube_corners(5.0));
        assert_abs_diff_eq!(raw, 1000.0, epsilon = 1e-2);
        let e = est.estimate();
        assert_eq!(e.bounds_min, Vec3::splat(-5.0));
        assert_eq!(e.bounds_max, Vec3::splat(5.0));
        assert_abs_diff_eq!(e.surface_area(), 600.0, epsilon = 1e-3);
    }

    #[test]
    fn test_volume_is_clamped() {
        let est = estimator();
        for v in [-5.0, 0.0, 3.0, 10.0, 500.0, 10_000.0, 1e9, f32::NAN] {
            let c = est.clamp_volume(v);
            assert!((10.0..=10_000.0).contains(&c), "{} -> {}", v, c);
        }

        let mut est = estimator();
        let flat = [Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0), Vec3::new(5.0, 0.0, 0.0)];
        assert_eq!(est.observe(&flat), 10.0);
        let huge = [Vec3::splat(-1000.0), Vec3::splat(1000.0), Vec3::ZERO];
        assert_eq!(est.observe(&huge), 10_000.0);
    }

    #[test]
    fn test_smoothing_converges_monotonically() {
        let mut est = estimator();
        est.observe(&cube_corners(5.0));
        let mut previous = est.estimate().smoothed_volume;
        for _ in 0..200 {
            let e = est.relax(1.0 / 60.0);
            assert!(e.smoothed_volume >= previous);
            previous = e.smoothed_volume;
        }
        assert_abs_diff_eq!(previous, 1000.0, epsilon = 1.0);
    }

    #[test]
    fn test_smoothing_normalized_by_update_frequency() {
        let slow_desc = ReverbDesc {
            update_frequency: 1.0,
            ..Default::default()
        };
        let fast_desc = ReverbDesc {
            update_frequency: 4.0,
            ..Default::default()
        };
        let mut slow = RoomVolumeEstimator::new(&slow_desc);
        let mut fast = RoomVolumeEstimator::new(&fast_desc);
        slow.observe(&cube_corners(5.0));
        fast.observe(&cube_corners(5.0));

        let s = slow.relax(0.05).smoothed_volume;
        let f = fast.relax(0.05).smoothed_volume;
        assert!(f > s);
    }

    #[test]
    fn test_normalized_uses_curve() {
        let desc = ReverbDesc {
            response_curve: ResponseCurve::keyframes(vec![(0.0, 1.0), (1.0, 0.0)]).unwrap(),
            ..Default::default()
        };
        let mut est = RoomVolumeEstimator::new(&desc);
        est.observe(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]);
        est.relax(100.0);
        assert_abs_diff_eq!(est.normalized(), 1.0);
    }

    #[test]
    fn test_decay_time_bounds() {
        let mut est = estimator();
        est.observe(&cube_corners(5.0));
        let e = est.relax(100.0);
        let rt60 = e.decay_time();
        assert_abs_diff_eq!(rt60, 0.161 * 1000.0 / 600.0, epsilon = 1e-3);
        assert!((0.1..=10.0).contains(&rt60));
    }
}
