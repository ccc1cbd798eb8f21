//! Named-scalar-parameter audio backend boundary.
//!
//! Ambiscape never talks to an audio runtime directly. Every computed value
//! leaves the engine through [`AudioBackend`], which a host implements on top
//! of its mixer (an FMOD studio system, a custom DSP graph, ...).

use crate::error::{AmbiscapeError, Result};
use crate::occlusion::EmitterId;
use std::collections::{HashMap, HashSet};

/// Audio backend trait for mixer abstraction
///
/// Writes are idempotent re-sends of current state, so a failed write is
/// simply retried by the next tick.
pub trait AudioBackend {
    /// Set a global (bus/system level) parameter
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<()>;

    /// Set a parameter on one emitter's playing instance
    fn set_emitter_parameter(&mut self, emitter: EmitterId, name: &str, value: f32) -> Result<()>;

    /// Whether the emitter's instance exposes a parameter called `name`
    ///
    /// Probed once per emitter, never per tick.
    fn has_emitter_parameter(&self, emitter: EmitterId, name: &str) -> bool;

    /// Set the volume multiplier of one emitter's instance
    fn set_emitter_volume(&mut self, emitter: EmitterId, volume: f32) -> Result<()>;

    /// Set the gain of a named ambience track
    fn set_track_volume(&mut self, track: &str, gain: f32) -> Result<()>;
}

/// Delivers writes to a backend, logging each failing key once.
///
/// A key that fails is warned about the first time, kept quiet while it keeps
/// failing, and logged at info when a write succeeds again.
#[derive(Debug, Default)]
pub struct ParameterWriter {
    failing: HashSet<String>,
}

impl ParameterWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_global(&mut self, backend: &mut dyn AudioBackend, name: &str, value: f32) -> bool {
        let result = backend.set_parameter(name, value);
        self.record(|| name.to_string(), result)
    }

    pub fn write_emitter(
        &mut self,
        backend: &mut dyn AudioBackend,
        emitter: EmitterId,
        name: &str,
        value: f32,
    ) -> bool {
        let result = backend.set_emitter_parameter(emitter, name, value);
        self.record(|| format!("{}/{}", emitter, name), result)
    }

    pub fn write_emitter_volume(
        &mut self,
        backend: &mut dyn AudioBackend,
        emitter: EmitterId,
        volume: f32,
    ) -> bool {
        let result = backend.set_emitter_volume(emitter, volume);
        self.record(|| format!("{}/volume", emitter), result)
    }

    pub fn write_track(&mut self, backend: &mut dyn AudioBackend, track: &str, gain: f32) -> bool {
        let result = backend.set_track_volume(track, gain);
        self.record(|| format!("track:{}", track), result)
    }

    /// Number of keys whose last write failed
    pub fn failing_count(&self) -> usize {
        self.failing.len()
    }

    fn record(&mut self, key: impl FnOnce() -> String, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                if !self.failing.is_empty() {
                    let key = key();
                    if self.failing.remove(&key) {
                        log::info!("Parameter write '{}' recovered", key);
                    }
                }
                true
            }
            Err(e) => {
                let key = key();
                if !self.failing.contains(&key) {
                    log::warn!("Parameter write '{}' failed, holding last value: {}", key, e);
                    self.failing.insert(key);
                }
                false
            }
        }
    }
}

/// In-process backend that records the latest value of every write.
///
/// Useful for tests, headless simulation and diagnostics. Parameters can be
/// marked missing (never exposed by emitters) or failing (writes rejected).
///
/// # Example
///
/// ```
/// use ambiscape::backend::{AudioBackend, MemoryBackend};
///
/// let mut backend = MemoryBackend::new();
/// backend.set_parameter("RoomSize", 0.4)?;
/// assert_eq!(backend.parameter("RoomSize"), Some(0.4));
/// # Ok::<(), ambiscape::AmbiscapeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    globals: HashMap<String, f32>,
    emitter_params: HashMap<(EmitterId, String), f32>,
    emitter_volumes: HashMap<EmitterId, f32>,
    tracks: HashMap<String, f32>,
    missing: HashSet<String>,
    failing: HashSet<String>,
    known_tracks: Option<HashSet<String>>,
    write_count: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitters will report no parameter called `name`.
    pub fn with_missing_parameter(mut self, name: &str) -> Self {
        self.missing.insert(name.to_string());
        self
    }

    /// Only these tracks exist; writes to any other track fail with
    /// [`AmbiscapeError::UnknownTrack`]. Without this every track is accepted.
    pub fn with_tracks<I, S>(mut self, tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_tracks = Some(tracks.into_iter().map(Into::into).collect());
        self
    }

    /// Writes to `name` (global, emitter or track) are rejected until healed.
    pub fn fail_parameter(&mut self, name: &str) {
        self.failing.insert(name.to_string());
    }

    pub fn heal_parameter(&mut self, name: &str) {
        self.failing.remove(name);
    }

    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.globals.get(name).copied()
    }

    pub fn emitter_parameter(&self, emitter: EmitterId, name: &str) -> Option<f32> {
        self.emitter_params.get(&(emitter, name.to_string())).copied()
    }

    pub fn emitter_volume(&self, emitter: EmitterId) -> Option<f32> {
        self.emitter_volumes.get(&emitter).copied()
    }

    pub fn track_volume(&self, track: &str) -> Option<f32> {
        self.tracks.get(track).copied()
    }

    /// Total successful writes since creation
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(AmbiscapeError::Backend(format!(
                "Write to '{}' rejected",
                name
            )));
        }
        Ok(())
    }
}

impl AudioBackend for MemoryBackend {
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        self.check(name)?;
        self.globals.insert(name.to_string(), value);
        self.write_count += 1;
        Ok(())
    }

    fn set_emitter_parameter(&mut self, emitter: EmitterId, name: &str, value: f32) -> Result<()> {
        if self.missing.contains(name) {
            return Err(AmbiscapeError::UnknownParameter(format!(
                "{} has no parameter '{}'",
                emitter, name
            )));
        }
        self.check(name)?;
        self.emitter_params.insert((emitter, name.to_string()), value);
        self.write_count += 1;
        Ok(())
    }

    fn has_emitter_parameter(&self, _emitter: EmitterId, name: &str) -> bool {
        !self.missing.contains(name)
    }

    fn set_emitter_volume(&mut self, emitter: EmitterId, volume: f32) -> Result<()> {
        self.check("volume")?;
        self.emitter_volumes.insert(emitter, volume);
        self.write_count += 1;
        Ok(())
    }

    fn set_track_volume(&mut self, track: &str, gain: f32) -> Result<()> {
        if self.known_tracks.as_ref().is_some_and(|known| !known.contains(track)) {
            return Err(AmbiscapeError::UnknownTrack(track.to_string()));
        }
        self.check(track)?;
        self.tracks.insert(track.to_string(), gain);
        self.write_count += 1;
        Ok(())
    }
}
