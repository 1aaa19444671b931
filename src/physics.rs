use crate::{
    config::{GenerationParams, WorldParams},
    math::{self as m, Angle},
    scene::{self, SceneError, SphereDef},
};

use std::path::Path;

//

pub mod body;
pub use body::{BodyRef, Mass, Proximity, Rectangle, Sphere};

pub mod collision;
pub use collision::{Collision, Detection};

pub mod constraint;

pub mod forcefield;
pub use forcefield::ForceField;

pub mod integrator;
pub use integrator::Step;

pub mod refiner;
pub use refiner::Contact;

pub mod solver;
pub use solver::Resolution;

//

/// Velocity of an object.
///
// Equivalent to a pair of Vec3s but with names for the translational and rotational part.
#[derive(Copy, Clone, Debug)]
pub struct Velocity {
    /// Linear velocity in metres per second.
    pub linear: m::Vec3,
    /// Angular velocity in radians per second around the vector's direction.
    pub angular: m::Vec3,
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity {
            linear: m::Vec3::zero(),
            angular: m::Vec3::zero(),
        }
    }
}

impl Velocity {
    /// Velocity with no angular part.
    pub fn linear(linear: m::Vec3) -> Self {
        Velocity {
            linear,
            angular: m::Vec3::zero(),
        }
    }

    pub fn apply_to_pose(&self, dt: f64, mut pose: m::Pose) -> m::Pose {
        let scaled = *self * dt;
        pose.append_translation(scaled.linear);
        let turn = scaled.angular.mag();
        if turn > 0.0 {
            pose.prepend_rotation(m::rotor_from_angle_axis(Angle::Rad(turn), scaled.angular));
        }
        pose
    }
}

impl std::ops::Add for Velocity {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}
impl std::ops::Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Self::Output {
        Velocity {
            linear: self.linear * rhs,
            angular: self.angular * rhs,
        }
    }
}

/// Everything about a body that changes over time.
#[derive(Copy, Clone, Debug)]
pub struct BodyState {
    /// Position and orientation.
    pub pose: m::Pose,
    pub velocity: Velocity,
}

impl BodyState {
    /// A body at `position`, unrotated and not moving.
    pub fn at_rest(position: m::Vec3) -> Self {
        BodyState {
            pose: m::Pose::new(position, m::Rotor3::identity()),
            velocity: Velocity::default(),
        }
    }

    #[inline]
    pub fn position(&self) -> m::Vec3 {
        self.pose.translation
    }

    #[inline]
    pub fn orientation(&self) -> m::Rotor3 {
        self.pose.rotation
    }
}

/// Read-only view of the bodies taking part in a step.
///
/// The state of spheres during a step lives in separate buffers,
/// so this is only used for the things that don't change: radii, rectangles
/// and which rectangles each sphere is resting on.
#[derive(Clone, Copy, Debug)]
pub struct Bodies<'a> {
    pub spheres: &'a [Sphere],
    pub rectangles: &'a [Rectangle],
}

/// Summary of what happened during a call to [`World::update_state`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Simulated seconds that passed.
    pub simulated: f64,
    /// Number of sub-steps taken.
    pub substeps: usize,
    /// Number of collisions resolved.
    pub collisions: usize,
    /// Number of spheres that fell below the floor and were removed.
    pub removed: usize,
}

/// The simulated world: spheres bouncing and rolling on a fixed set of rectangles.
pub struct World {
    pub params: WorldParams,
    spheres: Vec<Sphere>,
    rectangles: Vec<Rectangle>,
    /// Multiplier from wall clock time to simulated time.
    pub time_scale: f64,
    /// When paused, [`tick`][Self::tick] doesn't advance the simulation.
    pub paused: bool,
    /// Whether to track each sphere's nearest object for debug drawing.
    pub show_closest: bool,
}

impl World {
    /// Create a world with the given rectangles and spheres.
    pub fn new(
        params: WorldParams,
        rectangles: Vec<Rectangle>,
        spheres: impl IntoIterator<Item = SphereDef>,
    ) -> Self {
        World {
            time_scale: params.time_scale,
            params,
            spheres: spheres.into_iter().map(Sphere::from).collect(),
            rectangles,
            paused: false,
            show_closest: false,
        }
    }

    /// Create a world with the standard pit layout.
    pub fn pit(params: WorldParams, spheres: impl IntoIterator<Item = SphereDef>) -> Self {
        Self::new(params, scene::pit_rectangles(), spheres)
    }

    /// Create a pit world with spheres from a file, or random spheres if no file is given.
    ///
    /// A missing or malformed file is an error, and the world shouldn't be simulated.
    pub fn from_scene(
        params: WorldParams,
        sphere_file: Option<&Path>,
        generation: &GenerationParams,
    ) -> Result<Self, SceneError> {
        let spheres = match sphere_file {
            Some(path) => {
                let defs = scene::read_sphere_file(path)?;
                log::info!("Read {} spheres from {}", defs.len(), path.display());
                defs
            }
            None => scene::generate_spheres(generation),
        };
        Ok(Self::pit(params, spheres))
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn spheres_mut(&mut self) -> &mut [Sphere] {
        &mut self.spheres
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// The current spheres in the format used by scene files.
    pub fn sphere_defs(&self) -> Vec<SphereDef> {
        self.spheres
            .iter()
            .map(|s| SphereDef {
                radius: s.radius,
                centre: s.state.position(),
            })
            .collect()
    }

    /// Line segments from each sphere to the closest point on its nearest approaching object,
    /// for debug drawing. Empty unless `show_closest` is set.
    pub fn closest_segments(&self) -> Vec<[m::Vec3; 2]> {
        if !self.show_closest {
            return Vec::new();
        }
        self.spheres
            .iter()
            .filter_map(|s| Some([s.state.position(), s.proximity()?.point]))
            .collect()
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn speed_up(&mut self) {
        self.time_scale *= std::f64::consts::SQRT_2;
    }

    pub fn slow_down(&mut self) {
        self.time_scale /= std::f64::consts::SQRT_2;
    }

    /// Advance by `elapsed` seconds of wall clock time unless paused.
    pub fn tick(&mut self, elapsed: f64) -> FrameReport {
        if self.paused {
            return FrameReport::default();
        }
        self.update_state(elapsed)
    }

    /// Advance the simulation by `elapsed` seconds of wall clock time,
    /// scaled by `time_scale`, in sub-steps of at most `params.max_time_step`.
    ///
    /// Spheres that end up below `params.min_sphere_z` are removed afterwards.
    pub fn update_state(&mut self, elapsed: f64) -> FrameReport {
        let target = self.time_scale * elapsed;
        let mut report = FrameReport::default();
        let mut stalled = 0;

        while report.simulated < target {
            let dt = (target - report.simulated).min(self.params.max_time_step);
            let collisions_before = report.collisions;
            let advanced = self.step_counting(dt, &mut report.collisions);
            report.simulated += advanced;
            report.substeps += 1;

            if advanced <= 0.0 && report.collisions == collisions_before {
                // no progress and nothing resolved, can't get anywhere from here
                break;
            }
            if advanced > 0.0 {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled > self.params.max_stalled_substeps {
                    log::warn!(
                        "Gave up on {:.4}s of simulated time after {} sub-steps without progress",
                        target - report.simulated,
                        stalled
                    );
                    break;
                }
            }
        }

        let min_z = self.params.min_sphere_z;
        let count_before = self.spheres.len();
        self.spheres.retain(|s| s.state.position().z >= min_z);
        report.removed = count_before - self.spheres.len();
        if report.removed > 0 {
            log::debug!("Removed {} spheres below z = {}", report.removed, min_z);
        }

        report
    }

    /// Advance the state by `dt`, or up to just before the first collision in that time.
    ///
    /// If a collision happens, the spheres are left in the state just before it
    /// and the collision is resolved. Returns the amount of time actually simulated.
    pub fn update_state_by_delta_t(&mut self, dt: f64) -> f64 {
        let mut collisions = 0;
        self.step_counting(dt, &mut collisions)
    }

    fn step_counting(&mut self, dt: f64, collisions: &mut usize) -> f64 {
        if self.spheres.is_empty() {
            return dt;
        }

        constraint::enforce_resting_contacts(
            &mut self.spheres,
            &self.rectangles,
            self.params.rectangle_edge_buffer,
        );

        let gravity = forcefield::Gravity(self.params.gravity());
        let start: Vec<BodyState> = self.spheres.iter().map(|s| s.state).collect();
        let bodies = Bodies {
            spheres: &self.spheres,
            rectangles: &self.rectangles,
        };
        let step = integrator::integrate(bodies, &start, dt, &gravity);

        let (elapsed, states, proximities, collision) = match step.detection.collision {
            None => (dt, step.end, step.detection.proximities, None),
            Some(collision) => {
                let contact = refiner::refine_contact(
                    bodies,
                    &start,
                    dt,
                    collision,
                    &gravity,
                    &self.params,
                );
                (
                    contact.elapsed,
                    contact.state,
                    contact.proximities,
                    Some(contact.collision),
                )
            }
        };

        let track = self.show_closest;
        for (sphere, state, proximity) in
            itertools::izip!(&mut self.spheres, states, proximities)
        {
            sphere.state = state;
            sphere.proximity = if track { proximity } else { None };
        }

        if let Some(collision) = collision {
            let resolution =
                solver::resolve(&mut self.spheres, &self.rectangles, &collision, &self.params);
            log::debug!(
                "Collision s{:02}-{} after {:.4}s, normal speed {:.3} -> {:.3}",
                collision.sphere,
                collision.other,
                elapsed,
                resolution.speed_before,
                resolution.speed_after,
            );
            *collisions += 1;
        }

        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Rectangle {
        Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())
    }

    #[test]
    fn velocity_moves_pose() {
        let vel = Velocity::linear(m::Vec3::new(1.0, 2.0, -3.0));
        let pose = vel.apply_to_pose(0.5, m::Pose::identity());
        assert!((pose.translation - m::Vec3::new(0.5, 1.0, -1.5)).mag() < 1e-12);
        assert!((pose.rotation * m::Vec3::unit_x() - m::Vec3::unit_x()).mag() < 1e-12);
    }

    #[test]
    fn empty_world_still_advances() {
        let mut world = World::new(WorldParams::default(), vec![floor()], Vec::<SphereDef>::new());
        assert_eq!(world.update_state_by_delta_t(0.01), 0.01);
        let report = world.update_state(0.1);
        assert!((report.simulated - 0.1 * world.time_scale).abs() < 1e-9);
    }

    #[test]
    fn paused_world_does_not_move() {
        let mut world = World::new(
            WorldParams::default(),
            vec![floor()],
            [SphereDef {
                radius: 0.1,
                centre: m::Vec3::new(0.0, 0.0, 1.0),
            }],
        );
        world.toggle_pause();
        let report = world.tick(0.5);
        assert_eq!(report, FrameReport::default());
        assert_eq!(world.spheres()[0].state.position().z, 1.0);

        world.toggle_pause();
        world.tick(0.1);
        assert!(world.spheres()[0].state.position().z < 1.0);
    }

    #[test]
    fn time_scale_steps_by_root_two() {
        let mut world = World::new(WorldParams::default(), vec![], Vec::<SphereDef>::new());
        let start = world.time_scale;
        world.speed_up();
        world.speed_up();
        assert!((world.time_scale - 2.0 * start).abs() < 1e-12);
        world.slow_down();
        world.slow_down();
        assert!((world.time_scale - start).abs() < 1e-12);
    }

    #[test]
    fn spheres_below_the_floor_are_removed() {
        let params = WorldParams {
            min_sphere_z: -1.0,
            ..Default::default()
        };
        let mut world = World::new(
            params,
            vec![],
            [
                SphereDef {
                    radius: 0.1,
                    centre: m::Vec3::new(0.0, 0.0, -0.99),
                },
                SphereDef {
                    radius: 0.1,
                    centre: m::Vec3::new(1.0, 0.0, 5.0),
                },
            ],
        );
        world.time_scale = 1.0;
        let report = world.update_state(0.1);
        assert_eq!(report.removed, 1);
        assert_eq!(world.spheres().len(), 1);
        assert!(world.spheres()[0].state.position().x > 0.5);
    }

    #[test]
    fn separate_bounces_do_not_add_up_to_a_stall() {
        let params = WorldParams {
            max_stalled_substeps: 1,
            time_scale: 1.0,
            ..Default::default()
        };
        let mut world = World::new(
            params,
            vec![floor()],
            [SphereDef {
                radius: 0.1,
                centre: m::Vec3::new(0.0, 0.0, 0.3),
            }],
        );
        // every floor hit ends a sub-step without advancing time
        let report = world.update_state(1.0);
        assert!(report.collisions >= 2);
        assert!((report.simulated - 1.0).abs() < 1e-9);
    }

    #[test]
    fn closest_segments_only_when_enabled() {
        let mut world = World::new(
            WorldParams::default(),
            vec![floor()],
            [SphereDef {
                radius: 0.1,
                centre: m::Vec3::new(0.0, 0.0, 0.5),
            }],
        );
        world.time_scale = 1.0;
        world.update_state(0.02);
        assert!(world.closest_segments().is_empty());

        world.show_closest = true;
        world.update_state(0.02);
        let segments = world.closest_segments();
        assert_eq!(segments.len(), 1);
        // nearest point is straight below on the floor
        let [centre, point] = segments[0];
        assert!((point - m::Vec3::new(centre.x, centre.y, 0.0)).mag() < 1e-9);
    }
}
