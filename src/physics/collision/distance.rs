//! Distances between the surfaces of bodies.

use crate::math as m;
use crate::physics::Rectangle;

use itertools::Itertools;

/// Which part of a rectangle is closest to a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectangleRegion {
    /// The point projects onto the inside of the rectangle.
    Face,
    /// The point projects outside, so the closest point is on an edge or corner.
    Boundary,
}

/// Result of a sphere-rectangle distance query.
#[derive(Clone, Copy, Debug)]
pub struct RectangleDistance {
    /// Distance from the sphere surface to the rectangle. Negative when overlapping.
    pub distance: f64,
    /// Closest point on the rectangle, in world space.
    pub closest: m::Vec3,
    pub region: RectangleRegion,
}

/// Distance between the surfaces of two spheres.
#[inline]
pub fn sphere_sphere(centre1: m::Vec3, r1: f64, centre2: m::Vec3, r2: f64) -> f64 {
    (centre2 - centre1).mag() - r1 - r2
}

/// Distance between the surface of a sphere and a rectangle.
pub fn sphere_rectangle(centre: m::Vec3, radius: f64, rect: &Rectangle) -> RectangleDistance {
    let pose = rect.pose();
    let local = m::to_local(&pose, centre);
    let hx = rect.x_dim / 2.0;
    let hy = rect.y_dim / 2.0;

    if (-hx..=hx).contains(&local.x) && (-hy..=hy).contains(&local.y) {
        return RectangleDistance {
            distance: local.z.abs() - radius,
            closest: m::to_world(&pose, m::Vec3::new(local.x, local.y, 0.0)),
            region: RectangleRegion::Face,
        };
    }

    // outside the bounds, the closest point is on one of the edges.
    // clamped edge projections take care of corners too
    let corners = [
        m::Vec3::new(-hx, -hy, 0.0),
        m::Vec3::new(hx, -hy, 0.0),
        m::Vec3::new(hx, hy, 0.0),
        m::Vec3::new(-hx, hy, 0.0),
    ];
    let (edge_dist, closest_local) = corners
        .iter()
        .circular_tuple_windows()
        .map(|(tail, head)| m::point_to_edge_distance(local, *tail, *head))
        .fold((f64::MAX, m::Vec3::zero()), |best, candidate| {
            if candidate.0 < best.0 {
                candidate
            } else {
                best
            }
        });

    RectangleDistance {
        distance: edge_dist - radius,
        closest: m::to_world(&pose, closest_local),
        region: RectangleRegion::Boundary,
    }
}
