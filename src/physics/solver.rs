//! Impulse-based collision response.

use super::{
    collision::{distance, Collision, RectangleRegion},
    BodyRef, Mass, Rectangle, Sphere,
};
use crate::config::WorldParams;
use crate::math::{self as m, Unit};

/// What resolving a collision did.
#[derive(Clone, Copy, Debug)]
pub struct Resolution {
    /// Contact normal, pointing from the other body towards the sphere for rectangles
    /// and from the first sphere to the second for sphere pairs.
    pub normal: Unit<m::Vec3>,
    /// Velocity of the colliding sphere along the normal before the collision.
    pub speed_before: f64,
    /// Velocity of the colliding sphere along the normal after the collision.
    pub speed_after: f64,
    /// Whether the sphere started resting on the rectangle it hit.
    pub came_to_rest: bool,
}

/// One-dimensional impulse exchange between two bodies.
///
/// Solves the velocities after the collision from conservation of momentum and
/// `v2a - v1a = coeff * (v2b - v1b)`, where `coeff` is the negative coefficient of restitution.
pub fn exchange(m1: Mass, v1b: f64, m2: Mass, v2b: f64, coeff: f64) -> (f64, f64) {
    // momentum balance divided through by m1 * m2
    let (inv1, inv2) = (m1.inv(), m2.inv());
    let v1a = (inv2 * v1b + inv1 * v2b - inv1 * coeff * (v2b - v1b)) / (inv1 + inv2);
    let v2a = v1a + coeff * (v2b - v1b);
    (v1a, v2a)
}

/// Change sphere velocities to respond to a collision.
///
/// Only velocity along the contact normal changes. For rectangles, the sphere may also
/// start resting on the rectangle if it ends up slow and close enough to it.
pub fn resolve(
    spheres: &mut [Sphere],
    rectangles: &[Rectangle],
    collision: &Collision,
    params: &WorldParams,
) -> Resolution {
    match collision.other {
        BodyRef::Sphere(other) => resolve_spheres(spheres, collision.sphere, other, params),
        BodyRef::Rectangle(rect) => resolve_rectangle(
            &mut spheres[collision.sphere],
            collision.sphere,
            &rectangles[rect],
            rect,
            params,
        ),
    }
}

fn resolve_spheres(spheres: &mut [Sphere], i: usize, j: usize, params: &WorldParams) -> Resolution {
    let (si, sj) = (&spheres[i], &spheres[j]);
    let normal = m::normalize_or(sj.state.position() - si.state.position(), Unit::unit_z());
    let n = *normal;

    let v1b = si.state.velocity.linear.dot(n);
    let v2b = sj.state.velocity.linear.dot(n);
    let (v1a, v2a) = exchange(
        si.mass(),
        v1b,
        sj.mass(),
        v2b,
        params.coeff_of_restitution,
    );

    spheres[i].state.velocity.linear += (v1a - v1b) * n;
    spheres[j].state.velocity.linear += (v2a - v2b) * n;

    Resolution {
        normal,
        speed_before: v1b,
        speed_after: v1a,
        came_to_rest: false,
    }
}

fn resolve_rectangle(
    sphere: &mut Sphere,
    sphere_idx: usize,
    rect: &Rectangle,
    rect_idx: usize,
    params: &WorldParams,
) -> Resolution {
    let centre = sphere.state.position();
    let closest = distance::sphere_rectangle(centre, sphere.radius, rect);
    let normal = match closest.region {
        RectangleRegion::Face => rect.normal(),
        RectangleRegion::Boundary => m::normalize_or(centre - closest.closest, rect.normal()),
    };
    let n = *normal;

    let v1b = sphere.state.velocity.linear.dot(n);
    // the edge normal can differ from the direction detection checked for closing
    let separating = closest.region == RectangleRegion::Boundary && v1b >= 0.0;
    let v1a = if separating {
        v1b
    } else {
        exchange(sphere.mass(), v1b, rect.mass(), 0.0, params.coeff_of_restitution).0
    };
    sphere.state.velocity.linear += (v1a - v1b) * n;

    let height = rect.height_above(sphere.state.position()) - sphere.radius;
    let came_to_rest = height.abs() < params.min_normal_distance
        && v1a.abs() < params.min_normal_speed
        && sphere.rest_on(rect_idx);
    if came_to_rest {
        log::debug!("s{:02} came to rest on r{:02}", sphere_idx, rect_idx);
    }

    Resolution {
        normal,
        speed_before: v1b,
        speed_after: v1a,
        came_to_rest,
    }
}
