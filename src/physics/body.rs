use super::{collision::distance, BodyState};
use crate::math::{self as m, Unit};
use crate::scene::SphereDef;

/// Density of every sphere in kg/m³.
pub const SPHERE_DENSITY: f64 = 1.0;

/// Mass of a rectangle.
///
/// Rectangles don't move, but they still take part in the same impulse exchange as spheres.
/// Giving them a huge finite mass makes the exchange leave them (practically) unchanged
/// while keeping the division in the impulse formula well-defined,
/// which a true infinity wouldn't. It is an approximation, not infinite mass.
pub const RECTANGLE_MASS: f64 = 99_999.0;

/// Colour for drawing a sphere that's moving freely.
pub const FREE_COLOUR: [f32; 3] = [0.984, 0.322, 0.220];
/// Colour for drawing a sphere that's resting on at least one rectangle.
pub const RESTING_COLOUR: [f32; 3] = [0.105, 0.700, 0.305];

/// Mass of a body, stored along with its inverse.
///
/// The impulse exchange works in inverse masses so that [`RECTANGLE_MASS`]
/// contributes a near-zero term instead of dominating a sum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mass {
    mass: f64,
    inverse: f64,
}

impl From<f64> for Mass {
    #[inline]
    fn from(mass: f64) -> Self {
        Mass {
            mass,
            inverse: 1.0 / mass,
        }
    }
}

impl Mass {
    #[inline]
    pub fn get(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn inv(&self) -> f64 {
        self.inverse
    }
}

/// Identifies a body in a [`World`][super::World].
///
/// Spheres and rectangles are stored separately, and the index is into the respective list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Sphere(usize),
    Rectangle(usize),
}

impl std::fmt::Display for BodyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyRef::Sphere(idx) => write!(f, "s{:02}", idx),
            BodyRef::Rectangle(idx) => write!(f, "r{:02}", idx),
        }
    }
}

/// The nearest approaching object seen from a sphere during the last collision check.
#[derive(Clone, Copy, Debug)]
pub struct Proximity {
    /// Distance between surfaces. Negative when overlapping.
    pub distance: f64,
    /// Closest point on the other object.
    pub point: m::Vec3,
}

/// A moving sphere.
#[derive(Clone, Debug)]
pub struct Sphere {
    pub radius: f64,
    pub state: BodyState,
    /// Indices of the rectangles this sphere is resting on.
    pub(crate) constraints: Vec<usize>,
    pub(crate) proximity: Option<Proximity>,
}

impl From<SphereDef> for Sphere {
    fn from(def: SphereDef) -> Self {
        Sphere::new(def.radius, def.centre)
    }
}

impl Sphere {
    /// A sphere at rest at the given position.
    pub fn new(radius: f64, centre: m::Vec3) -> Self {
        Sphere {
            radius,
            state: BodyState::at_rest(centre),
            constraints: Vec::new(),
            proximity: None,
        }
    }

    /// Set the linear velocity in a builder-like chain.
    pub fn with_velocity(mut self, linear: m::Vec3) -> Self {
        self.state.velocity.linear = linear;
        self
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        Mass::from(SPHERE_DENSITY * 4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3))
    }

    #[inline]
    pub fn pose(&self) -> m::Pose {
        self.state.pose
    }

    /// Model matrix for a unit sphere mesh.
    pub fn render_matrix(&self) -> m::Mat4 {
        m::pose_matrix(&self.state.pose) * m::scale_matrix(m::Vec3::broadcast(self.radius))
    }

    /// Indices of the rectangles this sphere is resting on.
    pub fn constraint_rectangles(&self) -> &[usize] {
        &self.constraints
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
    }

    pub fn is_constrained_to(&self, rectangle: usize) -> bool {
        self.constraints.contains(&rectangle)
    }

    /// Make the sphere rest on a rectangle. Returns false if it already did.
    pub fn rest_on(&mut self, rectangle: usize) -> bool {
        if self.is_constrained_to(rectangle) {
            return false;
        }
        self.constraints.push(rectangle);
        true
    }

    pub fn colour(&self) -> [f32; 3] {
        if self.is_constrained() {
            RESTING_COLOUR
        } else {
            FREE_COLOUR
        }
    }

    /// The nearest approaching object found in the last collision check,
    /// if proximity tracking is on and anything was approaching.
    pub fn proximity(&self) -> Option<Proximity> {
        self.proximity
    }

    /// Distance between the surfaces of two spheres. Negative when overlapping.
    pub fn dist_to_sphere(&self, other: &Sphere) -> f64 {
        distance::sphere_sphere(
            self.state.position(),
            self.radius,
            other.state.position(),
            other.radius,
        )
    }

    /// Distance between this sphere's surface and a rectangle,
    /// along with the point on the rectangle closest to the sphere.
    pub fn dist_to_rectangle(&self, rectangle: &Rectangle) -> (f64, m::Vec3) {
        let d = distance::sphere_rectangle(self.state.position(), self.radius, rectangle);
        (d.distance, d.closest)
    }
}

/// An immovable flat rectangle.
///
/// In its own frame the rectangle is centred at the origin, lies on the xy-plane
/// and faces +z.
#[derive(Clone, Debug)]
pub struct Rectangle {
    pub x_dim: f64,
    pub y_dim: f64,
    normal: Unit<m::Vec3>,
    state: BodyState,
}

impl Rectangle {
    /// Create a rectangle with side lengths `x_dim` and `y_dim`.
    /// Its orientation is the one that turns +z to `normal`.
    pub fn new(x_dim: f64, y_dim: f64, normal: m::Vec3, centre: m::Vec3) -> Self {
        let normal = m::normalize_or(normal, Unit::unit_z());
        let rotation = m::rotor_between(m::Vec3::unit_z(), *normal);
        Rectangle {
            x_dim,
            y_dim,
            normal,
            state: BodyState {
                pose: m::Pose::new(centre, rotation),
                velocity: Default::default(),
            },
        }
    }

    #[inline]
    pub fn normal(&self) -> Unit<m::Vec3> {
        self.normal
    }

    #[inline]
    pub fn centre(&self) -> m::Vec3 {
        self.state.position()
    }

    #[inline]
    pub fn pose(&self) -> m::Pose {
        self.state.pose
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        Mass::from(RECTANGLE_MASS)
    }

    /// Model matrix for a unit square mesh on the xy-plane.
    pub fn render_matrix(&self) -> m::Mat4 {
        m::pose_matrix(&self.state.pose)
            * m::scale_matrix(m::Vec3::new(self.x_dim, self.y_dim, 1.0))
    }

    /// Signed distance from the plane of the rectangle, positive on the side the normal faces.
    #[inline]
    pub fn height_above(&self, point: m::Vec3) -> f64 {
        (point - self.centre()).dot(*self.normal)
    }

    /// Check whether a point in the rectangle's local frame projects
    /// within `margin` of the rectangle's bounds.
    pub fn contains_local(&self, local: m::Vec3, margin: f64) -> bool {
        local.x.abs() <= self.x_dim / 2.0 + margin && local.y.abs() <= self.y_dim / 2.0 + margin
    }
}
