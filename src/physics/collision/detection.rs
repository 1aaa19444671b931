use super::{distance, BroadPhase};
use crate::math as m;
use crate::physics::{Bodies, BodyRef, BodyState, Proximity};

/// A sphere touching or overlapping another body while the two are approaching each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// Index of the sphere.
    pub sphere: usize,
    pub other: BodyRef,
    /// Distance between the surfaces at the time of detection, zero or negative.
    pub separation: f64,
}

/// Result of a collision check.
#[derive(Clone, Debug)]
pub struct Detection {
    /// The approaching pair with the smallest separation, if that separation is `<= 0`.
    pub collision: Option<Collision>,
    /// For each sphere, the nearest approaching object, if any.
    pub proximities: Vec<Option<Proximity>>,
}

/// Find the closest pair of approaching bodies in the given sphere states.
///
/// Only pairs that are moving towards each other count. Pairs separating
/// from each other are ignored even if they overlap, so that a collision that
/// has already been resolved isn't found again.
///
/// Ties go to the pair found first, scanning sphere-sphere pairs in the order
/// the broad phase produces them before sphere-rectangle pairs.
pub fn find_collisions<B: BroadPhase>(bodies: Bodies<'_>, states: &[BodyState]) -> Detection {
    debug_assert_eq!(bodies.spheres.len(), states.len());

    let mut proximities: Vec<Option<Proximity>> = vec![None; states.len()];
    let mut closest: Option<Collision> = None;
    let mut min_separation = f64::MAX;

    fn track(slot: &mut Option<Proximity>, distance: f64, point: m::Vec3) {
        match slot {
            Some(p) if p.distance <= distance => (),
            _ => *slot = Some(Proximity { distance, point }),
        }
    }

    //
    // sphere <-> sphere
    //

    for [i, j] in B::sphere_pairs(bodies.spheres) {
        let (si, sj) = (&states[i], &states[j]);
        let centre_to_centre = sj.position() - si.position();
        let separation = distance::sphere_sphere(
            si.position(),
            bodies.spheres[i].radius,
            sj.position(),
            bodies.spheres[j].radius,
        );

        // negative when the spheres are coming together
        let approach = (sj.velocity.linear - si.velocity.linear).dot(centre_to_centre);
        if approach < 0.0 {
            if separation < min_separation {
                min_separation = separation;
                closest = Some(Collision {
                    sphere: i,
                    other: BodyRef::Sphere(j),
                    separation,
                });
            }
            track(
                &mut proximities[i],
                separation,
                si.position() + 0.5 * centre_to_centre,
            );
        }
    }

    //
    // sphere <-> rectangle
    //

    for [i, r] in B::sphere_rectangle_pairs(bodies.spheres, bodies.rectangles) {
        let state = &states[i];
        let rect = &bodies.rectangles[r];
        let dist = distance::sphere_rectangle(state.position(), bodies.spheres[i].radius, rect);

        // velocity along the normal, pointing away from the side the sphere is on
        let normal = *rect.normal();
        let approach = (rect.height_above(state.position()) * normal).dot(state.velocity.linear);
        if approach < 0.0 {
            if dist.distance < min_separation {
                min_separation = dist.distance;
                closest = Some(Collision {
                    sphere: i,
                    other: BodyRef::Rectangle(r),
                    separation: dist.distance,
                });
            }
            track(&mut proximities[i], dist.distance, dist.closest);
        }
    }

    Detection {
        collision: closest.filter(|c| c.separation <= 0.0),
        proximities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{collision::BruteForce, Rectangle, Sphere};

    fn states(spheres: &[Sphere]) -> Vec<BodyState> {
        spheres.iter().map(|s| s.state).collect()
    }

    #[test]
    fn only_approaching_pairs_collide() {
        let floor = vec![Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())];
        let spheres = vec![
            Sphere::new(0.1, m::Vec3::new(0.0, 0.0, 0.05)).with_velocity(m::Vec3::new(0.0, 0.0, 1.0)),
            Sphere::new(0.1, m::Vec3::new(1.0, 0.0, 0.05)).with_velocity(m::Vec3::new(0.0, 0.0, -1.0)),
        ];
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &floor,
        };
        let det = find_collisions::<BruteForce>(bodies, &states(&spheres));
        let c = det.collision.expect("sphere 1 is sinking into the floor");
        assert_eq!((c.sphere, c.other), (1, BodyRef::Rectangle(0)));
        assert!((c.separation + 0.05).abs() < 1e-12);
        // the sphere moving up is overlapping but leaving
        assert!(det.proximities[0].is_none());
        assert!(det.proximities[1].is_some());
    }

    #[test]
    fn closest_pair_wins_and_ties_go_to_scan_order() {
        let spheres = vec![
            Sphere::new(0.1, m::Vec3::new(0.0, 0.0, 0.0)).with_velocity(m::Vec3::unit_x()),
            Sphere::new(0.1, m::Vec3::new(0.125, 0.0, 0.0)),
            Sphere::new(0.1, m::Vec3::new(4.0, 0.0, 0.0)).with_velocity(m::Vec3::unit_x()),
            Sphere::new(0.1, m::Vec3::new(4.125, 0.0, 0.0)),
        ];
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &[],
        };
        let det = find_collisions::<BruteForce>(bodies, &states(&spheres));
        let c = det.collision.expect("spheres overlap");
        // both pairs overlap by exactly the same amount
        assert_eq!((c.sphere, c.other), (0, BodyRef::Sphere(1)));

        // make the second pair overlap more, and it takes over
        let mut spheres = spheres;
        spheres[3].state.pose.translation.x = 4.1;
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &[],
        };
        let det = find_collisions::<BruteForce>(bodies, &states(&spheres));
        let c = det.collision.expect("spheres overlap");
        assert_eq!((c.sphere, c.other), (2, BodyRef::Sphere(3)));
    }

    #[test]
    fn separated_bodies_do_not_collide() {
        let floor = vec![Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())];
        let spheres =
            vec![Sphere::new(0.1, m::Vec3::new(0.0, 0.0, 1.0)).with_velocity(-m::Vec3::unit_z())];
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &floor,
        };
        let det = find_collisions::<BruteForce>(bodies, &states(&spheres));
        assert!(det.collision.is_none());
        let p = det.proximities[0].expect("approaching the floor");
        assert!((p.distance - 0.9).abs() < 1e-12);
    }

    #[test]
    fn resting_rectangles_are_ignored() {
        let floor = vec![Rectangle::new(10.0, 10.0, m::Vec3::unit_z(), m::Vec3::zero())];
        let mut spheres =
            vec![Sphere::new(0.1, m::Vec3::new(0.0, 0.0, 0.09)).with_velocity(-m::Vec3::unit_z())];
        spheres[0].rest_on(0);
        let bodies = Bodies {
            spheres: &spheres,
            rectangles: &floor,
        };
        let det = find_collisions::<BruteForce>(bodies, &states(&spheres));
        assert!(det.collision.is_none());
    }
}
