//! Acoustic material profiles used by occlusion.
//!
//! Every lookup resolves to some profile: a per-collider override first, then
//! the surface's material name, then the table's `Default` entry.

use crate::error::{AmbiscapeError, Result};
use crate::scene::ColliderId;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Name of the fallback profile every table carries.
pub const DEFAULT_MATERIAL: &str = "Default";

/// How strongly a surface blocks sound travelling through it.
///
/// # Example
///
/// ```
/// use ambiscape::scene::MaterialAcousticProfile;
///
/// let curtain = MaterialAcousticProfile::new("Curtain", 0.2, 0.8);
/// assert!(curtain.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAcousticProfile {
    /// Unique key within a [`MaterialTable`]
    pub name: String,

    /// Scales the blocking contribution of one hit (>= 0)
    pub occlusion_multiplier: f32,

    /// Fraction of energy let through the surface (0.0 - 1.0)
    ///
    /// 0.0 = solid wall, 1.0 = acoustically transparent
    pub transmission_factor: f32,
}

impl MaterialAcousticProfile {
    pub fn new(name: impl Into<String>, occlusion_multiplier: f32, transmission_factor: f32) -> Self {
        Self {
            name: name.into(),
            occlusion_multiplier,
            transmission_factor,
        }
    }

    pub fn default_profile() -> Self {
        Self::new(DEFAULT_MATERIAL, 0.5, 0.3)
    }

    pub fn concrete() -> Self {
        Self::new("Concrete", 1.0, 0.05)
    }

    pub fn brick() -> Self {
        Self::new("Brick", 0.9, 0.1)
    }

    pub fn wood() -> Self {
        Self::new("Wood", 0.6, 0.35)
    }

    pub fn glass() -> Self {
        Self::new("Glass", 0.4, 0.5)
    }

    pub fn metal() -> Self {
        Self::new("Metal", 0.8, 0.15)
    }

    pub fn fabric() -> Self {
        Self::new("Fabric", 0.3, 0.7)
    }

    pub fn water() -> Self {
        Self::new("Water", 0.5, 0.4)
    }

    /// Blocking weight of one hit before the incidence term.
    pub fn blocking(&self) -> f32 {
        self.occlusion_multiplier * (1.0 - self.transmission_factor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(AmbiscapeError::Configuration(
                "Material profile name must not be empty".into(),
            ));
        }
        if !self.occlusion_multiplier.is_finite() || self.occlusion_multiplier < 0.0 {
            return Err(AmbiscapeError::Configuration(format!(
                "Material '{}': occlusion multiplier must be a finite value >= 0",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.transmission_factor) {
            return Err(AmbiscapeError::Configuration(format!(
                "Material '{}': transmission factor must be between 0.0 and 1.0",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for MaterialAcousticProfile {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// Read-only-after-setup lookup of acoustic profiles.
///
/// # Example
///
/// ```
/// use ambiscape::scene::{ColliderId, MaterialAcousticProfile, MaterialTable};
///
/// let mut materials = MaterialTable::with_presets();
/// materials.set_override(ColliderId(7), "Glass")?;
///
/// assert_eq!(materials.resolve(ColliderId(7), Some("Concrete")).name, "Glass");
/// assert_eq!(materials.resolve(ColliderId(1), Some("Concrete")).name, "Concrete");
/// assert_eq!(materials.resolve(ColliderId(1), Some("Marshmallow")).name, "Default");
/// # Ok::<(), ambiscape::AmbiscapeError>(())
/// ```
#[derive(Debug)]
pub struct MaterialTable {
    profiles: HashMap<String, MaterialAcousticProfile>,
    overrides: HashMap<ColliderId, String>,
    fallback: MaterialAcousticProfile,
    // Names already reported as unknown, so each is warned about once.
    reported_unknown: Mutex<HashSet<String>>,
}

impl MaterialTable {
    /// Creates a table holding only the `Default` profile.
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            overrides: HashMap::new(),
            fallback: MaterialAcousticProfile::default_profile(),
            reported_unknown: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a table pre-loaded with the common presets.
    pub fn with_presets() -> Self {
        let mut table = Self::new();
        for profile in [
            MaterialAcousticProfile::concrete(),
            MaterialAcousticProfile::brick(),
            MaterialAcousticProfile::wood(),
            MaterialAcousticProfile::glass(),
            MaterialAcousticProfile::metal(),
            MaterialAcousticProfile::fabric(),
            MaterialAcousticProfile::water(),
        ] {
            table.profiles.insert(profile.name.clone(), profile);
        }
        table
    }

    /// Adds or replaces a profile. A profile named `Default` replaces the fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile's properties are invalid.
    pub fn add(&mut self, profile: MaterialAcousticProfile) -> Result<()> {
        profile.validate()?;
        if profile.name == DEFAULT_MATERIAL {
            self.fallback = profile;
        } else {
            self.profiles.insert(profile.name.clone(), profile);
        }
        Ok(())
    }

    /// Binds a collider to a named profile, taking precedence over its material name.
    ///
    /// # Errors
    ///
    /// Returns an error if no profile with that name exists.
    pub fn set_override(&mut self, collider: ColliderId, profile_name: &str) -> Result<()> {
        if profile_name != DEFAULT_MATERIAL && !self.profiles.contains_key(profile_name) {
            return Err(AmbiscapeError::Configuration(format!(
                "Cannot override {} with unknown material '{}'",
                collider, profile_name
            )));
        }
        self.overrides.insert(collider, profile_name.to_string());
        Ok(())
    }

    pub fn clear_override(&mut self, collider: ColliderId) {
        self.overrides.remove(&collider);
    }

    /// Looks up a profile by exact name, then case-insensitively.
    pub fn get(&self, name: &str) -> Option<&MaterialAcousticProfile> {
        if name == DEFAULT_MATERIAL {
            return Some(&self.fallback);
        }
        self.profiles.get(name).or_else(|| {
            self.profiles
                .values()
                .find(|profile| profile.name.eq_ignore_ascii_case(name))
        })
    }

    /// Resolves the profile for a hit. Never fails.
    pub fn resolve(&self, collider: ColliderId, material: Option<&str>) -> &MaterialAcousticProfile {
        if let Some(profile) = self
            .overrides
            .get(&collider)
            .and_then(|name| self.get(name))
        {
            return profile;
        }

        let Some(name) = material else {
            return &self.fallback;
        };

        match self.get(name) {
            Some(profile) => profile,
            None => {
                if let Ok(mut reported) = self.reported_unknown.lock() {
                    if reported.insert(name.to_string()) {
                        log::warn!(
                            "No acoustic profile for material '{}', using '{}'",
                            name,
                            DEFAULT_MATERIAL
                        );
                    }
                }
                &self.fallback
            }
        }
    }

    pub fn default_profile(&self) -> &MaterialAcousticProfile {
        &self.fallback
    }

    /// Number of profiles including `Default`
    pub fn len(&self) -> usize {
        self.profiles.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialAcousticProfile> {
        std::iter::once(&self.fallback).chain(self.profiles.values())
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::with_presets()
    }
}

impl Clone for MaterialTable {
    fn clone(&self) -> Self {
        Self {
            profiles: self.profiles.clone(),
            overrides: self.overrides.clone(),
            fallback: self.fallback.clone(),
            reported_unknown: Mutex::new(HashSet::new()),
        }
    }
}
