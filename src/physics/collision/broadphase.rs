//! Broad phase collision detection algorithms
//! are responsible for detecting pairs of possibly intersecting objects
//! for further, more accurate distance checks.

use crate::physics::{Rectangle, Sphere};

/// A broad phase algorithm.
pub trait BroadPhase {
    /// Returns ordered pairs `[i, j]` of sphere indices that might be touching.
    fn sphere_pairs(spheres: &[Sphere]) -> Vec<[usize; 2]>;

    /// Returns pairs `[sphere, rectangle]` that might be touching.
    /// Rectangles that a sphere is resting on must not be paired with it.
    fn sphere_rectangle_pairs(spheres: &[Sphere], rectangles: &[Rectangle]) -> Vec<[usize; 2]>;
}

/// The simplest possible broad phase algorithm,
/// which pairs every object with every other object.
/// Very inefficient, but can work for small systems.
///
/// Pairs come out in lexicographic order, which the collision detector relies on
/// to break ties between equally close pairs.
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn sphere_pairs(spheres: &[Sphere]) -> Vec<[usize; 2]> {
        let count = spheres.len();
        let mut pairs = Vec::with_capacity(count * count.saturating_sub(1));
        for i in 0..count {
            for j in (0..count).filter(|&j| j != i) {
                pairs.push([i, j]);
            }
        }
        pairs
    }

    fn sphere_rectangle_pairs(spheres: &[Sphere], rectangles: &[Rectangle]) -> Vec<[usize; 2]> {
        let mut pairs = Vec::new();
        for (i, sphere) in spheres.iter().enumerate() {
            for r in (0..rectangles.len()).filter(|&r| !sphere.is_constrained_to(r)) {
                pairs.push([i, r]);
            }
        }
        pairs
    }
}
