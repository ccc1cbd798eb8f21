//! Scene queries and acoustic materials.
//!
//! The host engine owns geometry. It plugs into Ambiscape through two pieces:
//!
//! 1. **RayTracer** - closest-hit and all-hits ray queries
//! 2. **MaterialTable** - acoustic profiles resolved from collider overrides and
//!    material names, always falling back to `Default`
//!
//! # Example
//!
//! ```rust,ignore
//! use ambiscape::scene::{MaterialTable, RayTracer, RayHit, LayerMask};
//! use ambiscape::math::Vec3;
//!
//! struct MyRayTracer {
//!     // Your scene data...
//! }
//!
//! impl RayTracer for MyRayTracer {
//!     fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
//!         -> Option<RayHit> {
//!         // Forward to the physics engine
//!         None
//!     }
//! }
//!
//! let context = AmbiscapeContext::new(desc, Arc::new(MyRayTracer {}), MaterialTable::with_presets(), backend)?;
//! ```

pub mod material;
pub mod ray_tracer;

#[cfg(test)]
pub(crate) mod test_support;

pub use material::{DEFAULT_MATERIAL, MaterialAcousticProfile, MaterialTable};
pub use ray_tracer::{ColliderId, LayerMask, RayHit, RayTracer};
