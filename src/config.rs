//! Tunable parameters of the simulation and sphere generation.

use crate::math as m;

/// Parameters of the physics simulation.
///
/// With the `serde-types` feature this can be read from a RON file.
/// Missing fields take their default values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WorldParams {
    /// Acceleration applied to every sphere, in m/s².
    pub gravity: [f64; 3],
    /// Ratio of relative normal velocity after a collision to before it.
    /// Negative because the direction flips.
    pub coeff_of_restitution: f64,
    /// Longest time advanced by a single integration step.
    pub max_time_step: f64,
    /// Length of time interval at which the search for a collision's time stops.
    pub collision_time_tolerance: f64,
    /// Upper limit on bisection iterations in case the interval never gets below the tolerance.
    pub max_bisection_iterations: usize,
    /// Distance from a rectangle below which a slow sphere comes to rest on it.
    pub min_normal_distance: f64,
    /// Normal speed below which a sphere close to a rectangle comes to rest on it.
    pub min_normal_speed: f64,
    /// How far past a rectangle's edge a resting sphere can go before it's released.
    pub rectangle_edge_buffer: f64,
    /// Spheres below this height are removed.
    pub min_sphere_z: f64,
    /// Initial multiplier from wall clock time to simulated time.
    pub time_scale: f64,
    /// Number of sub-steps in a row that may end at a collision without advancing time
    /// before the rest of the frame is skipped.
    pub max_stalled_substeps: usize,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.8],
            coeff_of_restitution: -0.8,
            max_time_step: 0.001,
            collision_time_tolerance: 0.001,
            max_bisection_iterations: 64,
            min_normal_distance: 0.05,
            min_normal_speed: 0.05,
            rectangle_edge_buffer: 0.03,
            min_sphere_z: -5.0,
            time_scale: 0.5,
            max_stalled_substeps: 10_000,
        }
    }
}

impl WorldParams {
    #[inline]
    pub fn gravity(&self) -> m::Vec3 {
        m::Vec3::from(self.gravity)
    }
}

/// Parameters for placing random spheres when no sphere file is given.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GenerationParams {
    /// Number of spheres to try to place.
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Smallest allowed distance between the surfaces of two generated spheres.
    pub min_separation: f64,
    /// Lower corner of the box sphere centres are placed in.
    pub volume_min: [f64; 3],
    /// Upper corner of the box sphere centres are placed in.
    pub volume_max: [f64; 3],
    /// Placement attempts per sphere before giving up on it.
    pub max_attempts: usize,
    pub seed: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        let min_radius = 0.08;
        Self {
            count: 20,
            min_radius,
            max_radius: 0.12,
            min_separation: 0.1,
            volume_min: [-1.5 + min_radius, -1.0 + min_radius, 0.5],
            volume_max: [1.5 - min_radius, 1.0 - min_radius, 2.5],
            max_attempts: 10,
            seed: 23546234,
        }
    }
}

/// Full configuration file contents.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    pub world: WorldParams,
    pub generation: GenerationParams,
}

/// Error when reading a configuration file.
#[cfg(feature = "serde-types")]
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read the config file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Ron(#[from] ron::Error),
}

#[cfg(feature = "serde-types")]
impl Config {
    pub fn read_from_file(file: std::fs::File) -> Result<Self, ConfigError> {
        use std::io::Read;

        let mut reader = std::io::BufReader::new(file);
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::de::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}
