//! Resting contacts between spheres and rectangles.
//!
//! A sphere that has come to rest on a rectangle is held against its plane
//! instead of bouncing on it every step. The contact breaks when the sphere rolls
//! past the rectangle's edges.

use super::{Rectangle, Sphere};
use crate::math as m;

/// Hold spheres on the rectangles they're resting on, and release them from the ones
/// they've moved off of.
///
/// For each resting contact the sphere's velocity along the rectangle normal is removed
/// and it's moved along the normal so its surface touches the plane.
/// A contact is released when the sphere's centre projects further than `edge_buffer`
/// outside the rectangle's bounds.
pub fn enforce_resting_contacts(spheres: &mut [Sphere], rectangles: &[Rectangle], edge_buffer: f64) {
    for (sphere_idx, sphere) in spheres.iter_mut().enumerate() {
        if !sphere.is_constrained() {
            continue;
        }

        let state = &mut sphere.state;
        let radius = sphere.radius;
        sphere.constraints.retain(|&rect_idx| {
            let Some(rect) = rectangles.get(rect_idx) else {
                return false;
            };
            let local = m::to_local(&rect.pose(), state.position());
            if !rect.contains_local(local, edge_buffer) {
                log::debug!("s{:02} rolled off r{:02}", sphere_idx, rect_idx);
                return false;
            }

            let n = *rect.normal();
            let normal_speed = state.velocity.linear.dot(n);
            state.velocity.linear -= normal_speed * n;
            let gap = rect.height_above(state.position()) - radius;
            state.pose.translation -= gap * n;
            true
        });
    }
}
