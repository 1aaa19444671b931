//! Finding the time of first contact within a step by bisection.

use super::{
    collision::Collision, integrator, Bodies, BodyState, ForceField, Proximity,
};
use crate::config::WorldParams;

/// The state just before a collision.
#[derive(Clone, Debug)]
pub struct Contact {
    /// Time from the start of the step to `state`.
    pub elapsed: f64,
    /// Sphere states at `elapsed`, before the bodies touch.
    pub state: Vec<BodyState>,
    /// The collision found at the end of the final search interval.
    pub collision: Collision,
    /// Proximities seen from `state`, or none if the search never moved off the start state.
    pub proximities: Vec<Option<Proximity>>,
    pub iterations: usize,
    /// False if the iteration cap ran out before the interval got below tolerance.
    pub converged: bool,
}

/// Narrow down when a collision found at the end of a step of length `dt` first happens.
///
/// Bisects `[0, dt]` by integrating from `start` to the midpoint and checking for collisions,
/// until the interval is at most `params.collision_time_tolerance` long
/// or `params.max_bisection_iterations` run out. The result is the state at the start of
/// the final interval, where the bodies aren't yet in collision.
pub fn refine_contact(
    bodies: Bodies<'_>,
    start: &[BodyState],
    dt: f64,
    collision: Collision,
    field: &impl ForceField,
    params: &WorldParams,
) -> Contact {
    let mut lo = 0.0;
    let mut hi = dt;
    let mut lo_state = start.to_vec();
    let mut collision = collision;
    let mut proximities = Vec::new();
    let mut iterations = 0;

    while hi - lo > params.collision_time_tolerance
        && iterations < params.max_bisection_iterations
    {
        let mid = 0.5 * (lo + hi);
        let step = integrator::integrate(bodies, start, mid, field);
        match step.detection.collision {
            Some(c) => {
                hi = mid;
                collision = c;
            }
            None => {
                lo = mid;
                lo_state = step.end;
                proximities = step.detection.proximities;
            }
        }
        iterations += 1;
    }

    let converged = hi - lo <= params.collision_time_tolerance;
    if converged {
        log::trace!(
            "Contact at {:.5}s found in {} iterations",
            lo,
            iterations
        );
    } else {
        log::debug!(
            "Contact search stopped after {} iterations with interval [{}, {}]",
            iterations,
            lo,
            hi
        );
    }
    if proximities.is_empty() {
        proximities = vec![None; start.len()];
    }

    Contact {
        elapsed: lo,
        state: lo_state,
        collision,
        proximities,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math as m;
    use crate::physics::{collision, forcefield, Rectangle, Sphere};

    fn falling(height: f64, speed: f64) -> (Vec<Sphere>, Vec<Rectangle>) {
        (
            vec![Sphere::new(0.1, m::Vec3::new(0.0, 0.0, height))
                .with_velocity(m::Vec3::new(0.0, 0.0, -speed))],
            vec![Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())],
        )
    }

    #[test]
    fn bisection_finds_time_of_contact() {
        let (spheres, rects) = falling(0.5, 2.0);
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &rects,
        };
        let start = [spheres[0].state];
        let field = forcefield::Gravity(m::Vec3::new(0.0, 0.0, -9.8));
        let params = WorldParams::default();

        // ends the step 0.04 into the floor
        let dt = 0.22;
        let step = integrator::integrate(bodies, &start, dt, &field);
        let collision = step.detection.collision.expect("reaches the floor");
        let contact = refine_contact(bodies, &start, dt, collision, &field, &params);

        // within one Euler step the position only depends on the starting velocity
        let expected = (0.5 - 0.1) / 2.0;
        assert!(contact.converged);
        assert!(contact.elapsed <= expected);
        assert!(expected - contact.elapsed <= params.collision_time_tolerance);
        assert!(contact.state[0].position().z > 0.1);
        assert_eq!(contact.collision.other, crate::physics::BodyRef::Rectangle(0));

        // proximities describe the returned state, not a rejected midpoint
        let p = contact.proximities[0].expect("approaching the floor");
        assert!((p.distance - (contact.state[0].position().z - 0.1)).abs() < 1e-12);
        assert!(p.distance > 0.0);

        // the returned state is free of collisions
        let det = collision::find_collisions::<collision::BruteForce>(bodies, &contact.state);
        assert!(det.collision.is_none());
    }

    #[test]
    fn iteration_cap_stops_search() {
        let (spheres, rects) = falling(0.5, 2.0);
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &rects,
        };
        let start = [spheres[0].state];
        let params = WorldParams {
            max_bisection_iterations: 3,
            ..Default::default()
        };
        let step = integrator::integrate(bodies, &start, 0.22, &forcefield::NoneField);
        let collision = step.detection.collision.expect("collides");
        let contact =
            refine_contact(bodies, &start, 0.22, collision, &forcefield::NoneField, &params);

        assert!(!contact.converged);
        assert_eq!(contact.iterations, 3);
        // still a state from before the collision
        assert!(contact.elapsed <= 0.2);
        assert!(contact.state[0].position().z >= 0.1);
    }
}
