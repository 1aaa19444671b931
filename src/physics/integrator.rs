//! Explicit Euler integration of sphere states.

use super::{
    collision::{self, BruteForce, Detection},
    Bodies, BodyState, ForceField, Velocity,
};

use itertools::izip;

/// Time derivative of a [`BodyState`].
#[derive(Clone, Copy, Debug)]
pub struct StateDerivative {
    /// Rate of change of the pose.
    pub velocity: Velocity,
    /// Rate of change of the velocity.
    pub acceleration: Velocity,
}

/// Position changes with velocity and velocity changes with the field's acceleration.
///
/// Nothing drives rotation, so the orientation and angular velocity
/// have zero derivatives.
pub fn derivative(state: &BodyState, field: &impl ForceField) -> StateDerivative {
    StateDerivative {
        velocity: Velocity::linear(state.velocity.linear),
        acceleration: Velocity::linear(field.value_at(state.position())),
    }
}

/// A single forward Euler step, `end = start + dt * derivative(start)`, for every body.
pub fn euler_step(start: &[BodyState], dt: f64, field: &impl ForceField) -> Vec<BodyState> {
    let derivatives: Vec<StateDerivative> = start.iter().map(|s| derivative(s, field)).collect();
    izip!(start, derivatives)
        .map(|(s, d)| BodyState {
            pose: d.velocity.apply_to_pose(dt, s.pose),
            velocity: s.velocity + d.acceleration * dt,
        })
        .collect()
}

/// Result of integrating over a time step.
#[derive(Clone, Debug)]
pub struct Step {
    /// Sphere states at the end of the step.
    pub end: Vec<BodyState>,
    /// Collision check done on the end states.
    pub detection: Detection,
}

/// Integrate sphere states over `dt` and check the result for collisions.
///
/// Collisions are only looked for at the end of the step, so a fast enough
/// sphere can pass through a thin object within one step.
pub fn integrate(
    bodies: Bodies<'_>,
    start: &[BodyState],
    dt: f64,
    field: &impl ForceField,
) -> Step {
    let end = euler_step(start, dt, field);
    let detection = collision::find_collisions::<BruteForce>(bodies, &end);
    Step { end, detection }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math as m;
    use crate::physics::{forcefield, Rectangle, Sphere};

    #[test]
    fn euler_step_uses_start_derivative() {
        let start = [BodyState {
            pose: m::Pose::new(m::Vec3::new(0.0, 0.0, 2.0), m::Rotor3::identity()),
            velocity: Velocity {
                linear: m::Vec3::new(1.0, 0.0, 0.0),
                angular: m::Vec3::new(0.0, 0.0, 3.0),
            },
        }];
        let gravity = forcefield::Gravity(m::Vec3::new(0.0, 0.0, -9.8));
        let end = euler_step(&start, 0.1, &gravity);

        assert!((end[0].position() - m::Vec3::new(0.1, 0.0, 2.0)).mag() < 1e-12);
        assert!((end[0].velocity.linear - m::Vec3::new(1.0, 0.0, -0.98)).mag() < 1e-12);
        // rotation isn't integrated
        assert_eq!(end[0].velocity.angular, m::Vec3::new(0.0, 0.0, 3.0));
        assert!((end[0].orientation() * m::Vec3::unit_x() - m::Vec3::unit_x()).mag() < 1e-12);
    }

    #[test]
    fn integrate_reports_collision_at_end() {
        let floor = vec![Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())];
        let spheres =
            vec![Sphere::new(0.1, m::Vec3::new(0.0, 0.0, 0.2)).with_velocity(-m::Vec3::unit_z())];
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &floor,
        };
        let start = [spheres[0].state];

        let step = integrate(bodies, &start, 0.05, &forcefield::NoneField);
        assert!(step.detection.collision.is_none());
        let step = integrate(bodies, &start, 0.15, &forcefield::NoneField);
        assert!(step.detection.collision.is_some());
        // the input buffer is left alone
        assert_eq!(start[0].position().z, 0.2);
    }
}
