//! Rigid spheres falling into a pit of rectangles.

pub mod math;
pub use math::{uv, Angle, Mat4, Pose, PoseBuilder, Rotor3, Unit, Vec3};

pub mod config;
#[cfg(feature = "serde-types")]
pub use config::{Config, ConfigError};
pub use config::{GenerationParams, WorldParams};

pub mod scene;
pub use scene::{SceneError, SphereDef};

pub mod physics;
pub use physics::{
    body::{BodyRef, Mass, Proximity, Rectangle, Sphere},
    collision::{self, Collision},
    forcefield, BodyState, FrameReport, Velocity, World,
};
