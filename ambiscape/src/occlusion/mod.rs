//! Line-of-sight sound occlusion.
//!
//! For every registered emitter the estimator casts a segment from the
//! listener to the emitter at a fixed rate, sums the blocking of every surface
//! it passes through, and relaxes the applied value toward that target every
//! frame. The applied value then drives an occlusion parameter, a volume
//! multiplier and a low-pass cutoff on the emitter's backend instance.

mod emitter;

pub use emitter::{
    EffectValues, EmitterCapabilities, EmitterId, EmitterRegistration, EmitterSource,
    EmitterTransform,
};

use crate::backend::{AudioBackend, ParameterWriter};
use crate::config::{OcclusionDesc, OcclusionEffects};
use crate::error::Result;
use crate::math::{Vec3, clamp01, exp_smoothing_factor, lerp};
use crate::scene::{MaterialTable, RayTracer};
use std::sync::{Arc, Weak};

/// What one occlusion tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcclusionPass {
    /// Targets were recomputed this tick
    pub recomputed: bool,
    /// Emitters dropped by their owner and removed from the registry
    pub pruned: Vec<EmitterId>,
}

/// Registry of occludable emitters.
pub struct OcclusionEstimator {
    desc: OcclusionDesc,
    registry: Vec<EmitterRegistration>,
    next_id: u64,
    since_compute: f32,
}

impl OcclusionEstimator {
    pub fn new(desc: OcclusionDesc) -> Self {
        // First tick computes immediately.
        let since_compute = 1.0 / desc.tick_rate;
        Self {
            desc,
            registry: Vec::new(),
            next_id: 0,
            since_compute,
        }
    }

    /// Adds an emitter to the registry. Only a weak reference is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `effects` is invalid.
    pub fn register_emitter<S: EmitterSource + 'static>(
        &mut self,
        source: &Arc<S>,
        effects: OcclusionEffects,
    ) -> Result<EmitterId> {
        effects.validate()?;

        let id = EmitterId(self.next_id);
        self.next_id += 1;

        let weak: Weak<S> = Arc::downgrade(source);
        let source: Weak<dyn EmitterSource> = weak;
        self.registry.push(EmitterRegistration {
            id,
            source,
            effects,
            capabilities: None,
            current_occlusion: 0.0,
            target_occlusion: 0.0,
        });
        log::info!("Registered occludable emitter {}", id);
        Ok(id)
    }

    /// Removes an emitter. It is not referenced by any later tick.
    pub fn unregister_emitter(&mut self, id: EmitterId) -> bool {
        let before = self.registry.len();
        self.registry.retain(|entry| entry.id != id);
        let removed = self.registry.len() != before;
        if removed {
            log::info!("Unregistered occludable emitter {}", id);
        }
        removed
    }

    /// Occlusion in `[0, 1]` between `listener` and `source`.
    ///
    /// Every surface along the segment contributes
    /// `multiplier * |cos(incidence)| * (1 - transmission)`; contributions are
    /// summed, then clamped. Emitters beyond `max_occlusion_distance` get 0.
    pub fn calculate_occlusion(
        &self,
        listener: Vec3,
        source: &dyn EmitterSource,
        tracer: &dyn RayTracer,
        materials: &MaterialTable,
    ) -> f32 {
        let to_emitter = source.position() - listener;
        let distance = to_emitter.length();
        if distance > self.desc.max_occlusion_distance || distance <= f32::EPSILON {
            return 0.0;
        }

        let direction = to_emitter / distance;
        let total: f32 = tracer
            .cast_all(listener, direction, distance, self.desc.layer_mask)
            .iter()
            .filter(|hit| !source.owns_collider(hit.collider))
            .map(|hit| {
                let profile = materials.resolve(hit.collider, hit.material.as_deref());
                let incidence = direction.dot(hit.normal.normalize_or_zero()).abs();
                profile.occlusion_multiplier * incidence * (1.0 - profile.transmission_factor)
            })
            .sum();

        clamp01(total)
    }

    /// Advances the estimator by one frame.
    ///
    /// Targets are recomputed at `tick_rate`; smoothing and backend writes
    /// happen every call. All targets are settled before the first write.
    pub fn tick(
        &mut self,
        delta_time: f32,
        listener: Vec3,
        tracer: &dyn RayTracer,
        materials: &MaterialTable,
        backend: &mut dyn AudioBackend,
        writer: &mut ParameterWriter,
    ) -> OcclusionPass {
        let mut pass = OcclusionPass::default();
        let interval = 1.0 / self.desc.tick_rate;
        self.since_compute += delta_time.max(0.0);

        if self.since_compute >= interval {
            self.since_compute = (self.since_compute - interval).min(interval);
            self.recompute_targets(listener, tracer, materials);
            pass.recomputed = true;
        }

        let factor = exp_smoothing_factor(self.desc.smoothing_speed, delta_time);
        for entry in &mut self.registry {
            let Some(source) = entry.source.upgrade() else {
                continue;
            };
            if !source.is_active() {
                continue;
            }

            let capabilities = *entry
                .capabilities
                .get_or_insert_with(|| EmitterCapabilities::probe(&*backend, entry.id, &entry.effects));

            entry.current_occlusion = clamp01(lerp(entry.current_occlusion, entry.target_occlusion, factor));
            let values = entry.effects.evaluate(entry.current_occlusion);

            if capabilities.occlusion_parameter {
                if let Some(name) = entry.effects.parameter_name.as_deref() {
                    writer.write_emitter(backend, entry.id, name, values.occlusion);
                }
            }
            if capabilities.volume {
                writer.write_emitter_volume(backend, entry.id, values.volume);
            }
            if capabilities.lowpass_parameter {
                writer.write_emitter(
                    backend,
                    entry.id,
                    &entry.effects.lowpass_parameter,
                    values.lowpass_cutoff,
                );
            }
        }

        self.registry.retain(|entry| {
            if entry.is_alive() {
                true
            } else {
                pass.pruned.push(entry.id);
                false
            }
        });
        if !pass.pruned.is_empty() {
            log::debug!("Pruned {} dropped emitters", pass.pruned.len());
        }

        pass
    }

    fn recompute_targets(&mut self, listener: Vec3, tracer: &dyn RayTracer, materials: &MaterialTable) {
        let mut targets = Vec::with_capacity(self.registry.len());
        for entry in &self.registry {
            let target = entry
                .source
                .upgrade()
                .filter(|source| source.is_active())
                .map(|source| self.calculate_occlusion(listener, &*source, tracer, materials));
            targets.push(target);
        }
        for (entry, target) in self.registry.iter_mut().zip(targets) {
            if let Some(target) = target {
                entry.target_occlusion = target;
            }
        }
    }

    /// Smoothed occlusion currently applied to an emitter
    pub fn occlusion(&self, id: EmitterId) -> Option<f32> {
        self.entry(id).map(EmitterRegistration::current_occlusion)
    }

    pub fn target_occlusion(&self, id: EmitterId) -> Option<f32> {
        self.entry(id).map(EmitterRegistration::target_occlusion)
    }

    pub fn capabilities(&self, id: EmitterId) -> Option<EmitterCapabilities> {
        self.entry(id).and_then(EmitterRegistration::capabilities)
    }

    pub fn contains(&self, id: EmitterId) -> bool {
        self.entry(id).is_some()
    }

    pub fn emitter_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registrations(&self) -> impl Iterator<Item = &EmitterRegistration> {
        self.registry.iter()
    }

    pub fn clear(&mut self) {
        self.registry.clear();
    }

    pub fn desc(&self) -> &OcclusionDesc {
        &self.desc
    }

    fn entry(&self, id: EmitterId) -> Option<&EmitterRegistration> {
        self.registry.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::scene::test_support::TestScene;
    use crate::scene::{ColliderId, LayerMask, RayHit};
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        estimator: OcclusionEstimator,
        materials: MaterialTable,
        backend: MemoryBackend,
        writer: ParameterWriter,
    }

    impl Harness {
        fn new(desc: OcclusionDesc) -> Self {
            Self {
                estimator: OcclusionEstimator::new(desc),
                materials: MaterialTable::with_presets(),
                backend: MemoryBackend::new(),
                writer: ParameterWriter::new(),
            }
        }

        fn tick(&mut self, listener: Vec3, tracer: &dyn RayTracer) -> OcclusionPass {
            self.estimator.tick(
                DT,
                listener,
                tracer,
                &self.materials,
                &mut self.backend,
                &mut self.writer,
            )
        }
    }

    fn wall_scene() -> TestScene {
        TestScene::empty().with_wall(5.0, 0.3, ColliderId(100), Some("Concrete"))
    }

    #[test]
    fn test_clear_line_of_sight_is_zero() {
        let harness = Harness::new(OcclusionDesc::default());
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let occlusion = harness.estimator.calculate_occlusion(
            Vec3::ZERO,
            &emitter,
            &TestScene::empty(),
            &harness.materials,
        );
        assert_eq!(occlusion, 0.0);
    }

    #[test]
    fn test_single_wall_head_on() {
        let harness = Harness::new(OcclusionDesc::default());
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let occlusion =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &wall_scene(), &harness.materials);
        assert_abs_diff_eq!(occlusion, 0.95, epsilon = 1e-4);
    }

    #[test]
    fn test_oblique_hit_contributes_less() {
        let harness = Harness::new(OcclusionDesc::default());
        let emitter = EmitterTransform::new(Vec3::new(10.0, 10.0, 0.0));
        let occlusion =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &wall_scene(), &harness.materials);
        assert_abs_diff_eq!(occlusion, 0.95 * std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_occluders_compound_and_clamp() {
        let harness = Harness::new(OcclusionDesc::default());
        let glass = TestScene::empty()
            .with_wall(3.0, 0.1, ColliderId(1), Some("Glass"))
            .with_wall(6.0, 0.1, ColliderId(2), Some("Glass"));
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let two_panes =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &glass, &harness.materials);
        assert_abs_diff_eq!(two_panes, 0.4, epsilon = 1e-4);

        let thick = wall_scene().with_wall(7.0, 0.3, ColliderId(101), Some("Concrete"));
        let two_walls =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &thick, &harness.materials);
        assert_eq!(two_walls, 1.0);
    }

    #[test]
    fn test_pane_counted_once_when_host_reports_inside_hits() {
        let harness = Harness::new(OcclusionDesc::default());
        let pane = TestScene::empty()
            .with_wall(5.0, 0.1, ColliderId(1), Some("Glass"))
            .reporting_inside_hits();
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let occlusion = harness
            .estimator
            .calculate_occlusion(Vec3::ZERO, &emitter, &pane, &harness.materials);
        // Glass: 0.4 * (1 - 0.5)
        assert_abs_diff_eq!(occlusion, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let harness = Harness::new(OcclusionDesc::default());
        let scene = wall_scene().with_wall(7.0, 0.2, ColliderId(7), Some("Wood"));
        let emitter = EmitterTransform::new(Vec3::new(9.0, 1.0, -2.0));
        let a = harness
            .estimator
            .calculate_occlusion(Vec3::ZERO, &emitter, &scene, &harness.materials);
        let b = harness
            .estimator
            .calculate_occlusion(Vec3::ZERO, &emitter, &scene, &harness.materials);
        assert_eq!(a, b);
    }

    #[test]
    fn test_beyond_max_distance_is_zero() {
        let desc = OcclusionDesc {
            max_occlusion_distance: 8.0,
            ..Default::default()
        };
        let harness = Harness::new(desc);
        let scene = wall_scene().with_wall(7.0, 0.3, ColliderId(101), Some("Concrete"));
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let occlusion =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &scene, &harness.materials);
        assert_eq!(occlusion, 0.0);
    }

    #[test]
    fn test_self_hits_are_skipped() {
        let harness = Harness::new(OcclusionDesc::default());
        let position = Vec3::new(10.0, 0.0, 0.0);
        let scene = TestScene::empty().with_cube(position, 0.5, ColliderId(50));

        let own = EmitterTransform::new(position).with_colliders([ColliderId(50)]);
        let foreign = EmitterTransform::new(position);
        let mats = &harness.materials;
        assert_eq!(harness.estimator.calculate_occlusion(Vec3::ZERO, &own, &scene, mats), 0.0);
        assert!(harness.estimator.calculate_occlusion(Vec3::ZERO, &foreign, &scene, mats) > 0.0);
    }

    #[test]
    fn test_unknown_material_uses_default() {
        let harness = Harness::new(OcclusionDesc::default());
        let scene = TestScene::empty().with_wall(5.0, 0.3, ColliderId(9), Some("Papier-mache"));
        let emitter = EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0));
        let occlusion =
            harness
                .estimator
                .calculate_occlusion(Vec3::ZERO, &emitter, &scene, &harness.materials);
        assert_abs_diff_eq!(occlusion, 0.5 * 0.7, epsilon = 1e-4);
    }

    #[test]
    fn test_applied_occlusion_relaxes_toward_target() {
        let mut harness = Harness::new(OcclusionDesc::default());
        let emitter = Arc::new(EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0)));
        let id = harness
            .estimator
            .register_emitter(&emitter, OcclusionEffects::default())
            .unwrap();
        let scene = wall_scene();

        harness.tick(Vec3::ZERO, &scene);
        let target = harness.estimator.target_occlusion(id).unwrap();
        let first = harness.estimator.occlusion(id).unwrap();
        assert_abs_diff_eq!(target, 0.95, epsilon = 1e-4);
        assert!(first > 0.0 && first < target);

        for _ in 0..300 {
            harness.tick(Vec3::ZERO, &scene);
        }
        let settled = harness.estimator.occlusion(id).unwrap();
        assert_abs_diff_eq!(settled, target, epsilon = 1e-3);

        let volume = harness.backend.emitter_volume(id).unwrap();
        assert_abs_diff_eq!(volume, lerp(1.0, 0.3, settled), epsilon = 1e-5);
        assert_eq!(harness.backend.emitter_parameter(id, "Occlusion"), Some(settled));
    }

    #[test]
    fn test_targets_recomputed_at_tick_rate() {
        let mut harness = Harness::new(OcclusionDesc {
            tick_rate: 10.0,
            ..Default::default()
        });
        let mut recomputes = 0;
        for _ in 0..60 {
            if harness.tick(Vec3::ZERO, &TestScene::empty()).recomputed {
                recomputes += 1;
            }
        }
        assert!((9..=11).contains(&recomputes), "{}", recomputes);
    }

    struct CountingTracer(AtomicUsize);

    impl RayTracer for CountingTracer {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            self.0.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    #[test]
    fn test_unregistered_before_first_tick_is_never_touched() {
        let mut harness = Harness::new(OcclusionDesc::default());
        let emitter = Arc::new(EmitterTransform::new(Vec3::new(3.0, 0.0, 0.0)));
        let id = harness
            .estimator
            .register_emitter(&emitter, OcclusionEffects::default())
            .unwrap();
        assert!(harness.estimator.unregister_emitter(id));
        assert!(!harness.estimator.unregister_emitter(id));

        let tracer = CountingTracer(AtomicUsize::new(0));
        for _ in 0..10 {
            harness.tick(Vec3::ZERO, &tracer);
        }
        assert_eq!(tracer.0.load(Ordering::Relaxed), 0);
        assert_eq!(harness.backend.write_count(), 0);
        assert_eq!(harness.estimator.occlusion(id), None);
    }

    #[test]
    fn test_dropped_emitters_are_pruned() {
        let mut harness = Harness::new(OcclusionDesc::default());
        let kept = Arc::new(EmitterTransform::new(Vec3::new(3.0, 0.0, 0.0)));
        let dropped = Arc::new(EmitterTransform::new(Vec3::new(4.0, 0.0, 0.0)));
        let kept_id = harness
            .estimator
            .register_emitter(&kept, OcclusionEffects::default())
            .unwrap();
        let dropped_id = harness
            .estimator
            .register_emitter(&dropped, OcclusionEffects::default())
            .unwrap();
        drop(dropped);

        let pass = harness.tick(Vec3::ZERO, &TestScene::empty());
        assert_eq!(pass.pruned, vec![dropped_id]);
        assert!(harness.estimator.contains(kept_id));
        assert_eq!(harness.estimator.emitter_count(), 1);
    }

    #[test]
    fn test_missing_lowpass_is_skipped() {
        let mut harness = Harness::new(OcclusionDesc::default());
        harness.backend = MemoryBackend::new().with_missing_parameter("LowpassCutoff");
        let emitter = Arc::new(EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0)));
        let id = harness
            .estimator
            .register_emitter(&emitter, OcclusionEffects::default())
            .unwrap();

        harness.tick(Vec3::ZERO, &wall_scene());
        let caps = harness.estimator.capabilities(id).unwrap();
        assert!(!caps.lowpass_parameter);
        assert_eq!(harness.backend.emitter_parameter(id, "LowpassCutoff"), None);
        assert!(harness.backend.emitter_parameter(id, "Occlusion").is_some());
        assert_eq!(harness.writer.failing_count(), 0);
    }

    #[test]
    fn test_inactive_emitter_holds_value() {
        let mut harness = Harness::new(OcclusionDesc::default());
        let emitter = Arc::new(EmitterTransform::new(Vec3::new(10.0, 0.0, 0.0)));
        let id = harness
            .estimator
            .register_emitter(&emitter, OcclusionEffects::default())
            .unwrap();
        emitter.set_active(false);
        for _ in 0..30 {
            harness.tick(Vec3::ZERO, &wall_scene());
        }
        assert_eq!(harness.estimator.occlusion(id), Some(0.0));
        assert_eq!(harness.estimator.target_occlusion(id), Some(0.0));
        assert_eq!(harness.backend.write_count(), 0);
    }

    #[test]
    fn test_rejects_invalid_effects() {
        let mut harness = Harness::new(OcclusionDesc::default());
        let emitter = Arc::new(EmitterTransform::new(Vec3::ZERO));
        let effects = OcclusionEffects {
            max_lowpass_amount: 2.0,
            ..Default::default()
        };
        assert!(harness.estimator.register_emitter(&emitter, effects).is_err());
        assert_eq!(harness.estimator.emitter_count(), 0);
    }
}
