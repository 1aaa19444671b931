//! Types, aliases and helper operations for doing math with `ultraviolet`.
use std::f64::consts::PI;
pub use ultraviolet as uv;

/// A Pose has a rotation and a translation, no scaling.
///
/// Every body in the simulation is placed with a Pose. Renderers turn it into a matrix
/// with [`pose_matrix`][self::pose_matrix].
pub type Pose = uv::DIsometry3;
pub type Vec3 = uv::DVec3;
/// Rotors are unit quaternions in geometric algebra clothing;
/// composing two of them with `*` is the Hamilton product.
pub type Rotor3 = uv::DRotor3;
pub type Mat4 = uv::DMat4;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}
impl Angle {
    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f64 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }
}
impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug)]
pub struct Unit<T>(T);

impl Unit<Vec3> {
    pub fn unit_z() -> Self {
        Unit(Vec3::unit_z())
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Vectors shorter than this are considered to have no direction.
pub const DEGENERATE_LENGTH: f64 = 1e-9;

/// Normalize a vector, substituting `fallback` if it's too short to have a direction.
///
/// Coincident sphere centres and spheres centred exactly on a rectangle edge
/// produce zero vectors here, and normalizing those would put NaNs into velocities.
#[inline]
pub fn normalize_or(v: Vec3, fallback: Unit<Vec3>) -> Unit<Vec3> {
    let mag = v.mag();
    if mag < DEGENERATE_LENGTH {
        fallback
    } else {
        Unit(v / mag)
    }
}

//
// rotor utils
//

/// Construct a rotation of `angle` around `axis`. The axis doesn't need to be normalized.
///
/// A zero-length axis gives the identity rotation.
pub fn rotor_from_angle_axis(angle: Angle, axis: Vec3) -> Rotor3 {
    if axis.mag() < DEGENERATE_LENGTH {
        return Rotor3::identity();
    }
    Rotor3::from_angle_plane(
        angle.rad(),
        uv::DBivec3::from_normalized_axis(axis.normalized()),
    )
}

/// The shortest rotation taking direction `from` to direction `to`.
///
/// Unlike `Rotor3::from_rotation_between`, this handles opposite directions
/// by turning halfway around an axis perpendicular to `from`.
pub fn rotor_between(from: Vec3, to: Vec3) -> Rotor3 {
    let from = from.normalized();
    let to = to.normalized();
    if from.dot(to) < -1.0 + 1e-9 {
        let helper = if from.x.abs() < 0.9 {
            Vec3::unit_x()
        } else {
            Vec3::unit_y()
        };
        return rotor_from_angle_axis(Angle::Rad(PI), from.cross(helper));
    }
    Rotor3::from_rotation_between(from, to)
}

//
// pose utils
//

/// A builder to create [`Pose`][self::Pose]s.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PoseBuilder {
    position: [f64; 3],
    rotation: Angle,
    axis: [f64; 3],
}
impl PoseBuilder {
    pub fn new() -> Self {
        PoseBuilder {
            position: [0.0, 0.0, 0.0],
            rotation: Angle::default(),
            axis: [1.0, 0.0, 0.0],
        }
    }
    #[inline]
    pub fn with_position(mut self, pos: impl Into<[f64; 3]>) -> Self {
        self.position = pos.into();
        self
    }
    #[inline]
    pub fn with_rotation(mut self, angle: Angle, axis: impl Into<[f64; 3]>) -> Self {
        self.rotation = angle;
        self.axis = axis.into();
        self
    }
    #[inline]
    pub fn build(self) -> Pose {
        Pose::new(
            Vec3::from(self.position),
            rotor_from_angle_axis(self.rotation, Vec3::from(self.axis)),
        )
    }
}
impl Default for PoseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl From<PoseBuilder> for Pose {
    fn from(builder: PoseBuilder) -> Pose {
        builder.build()
    }
}
impl From<Vec3> for PoseBuilder {
    fn from(vec: Vec3) -> Self {
        PoseBuilder::new().with_position(vec)
    }
}

/// Convert a pose to a 4x4 homogeneous matrix, ready to be composed
/// with view and projection matrices.
#[inline]
pub fn pose_matrix(p: &Pose) -> Mat4 {
    p.into_homogeneous_matrix()
}

/// A homogeneous matrix scaling each axis separately.
pub fn scale_matrix(scale: Vec3) -> Mat4 {
    Mat4::new(
        uv::DVec4::new(scale.x, 0.0, 0.0, 0.0),
        uv::DVec4::new(0.0, scale.y, 0.0, 0.0),
        uv::DVec4::new(0.0, 0.0, scale.z, 0.0),
        uv::DVec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

/// Move a world-space point into the local frame of `pose`.
#[inline]
pub fn to_local(pose: &Pose, point: Vec3) -> Vec3 {
    pose.inversed().transform_vec(point)
}

/// Move a point in the local frame of `pose` into world space.
#[inline]
pub fn to_world(pose: &Pose, point: Vec3) -> Vec3 {
    pose.transform_vec(point)
}

//
// edges
//

/// Distance from `point` to the line segment going from `tail` to `head`,
/// along with the point on the segment that's closest.
///
/// The projection is clamped to the segment, so points beyond either end
/// are measured against the endpoint. A degenerate edge is treated as its tail point.
pub fn point_to_edge_distance(point: Vec3, tail: Vec3, head: Vec3) -> (f64, Vec3) {
    let edge = head - tail;
    let len_sq = edge.mag_sq();
    let closest = if len_sq < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
        tail
    } else {
        let t = ((point - tail).dot(edge) / len_sq).clamp(0.0, 1.0);
        tail + t * edge
    };
    ((point - closest).mag(), closest)
}
