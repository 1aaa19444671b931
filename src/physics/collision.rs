pub mod broadphase;
pub use broadphase::{BroadPhase, BruteForce};

pub mod distance;
pub use distance::{RectangleDistance, RectangleRegion};

pub mod detection;
pub use detection::{find_collisions, Collision, Detection};
