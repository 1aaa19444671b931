use crate::math as m;

/// A (possibly) position-dependent acceleration that is
/// fed to the integrator and applied to every sphere each step.
pub trait ForceField {
    fn value_at(&self, position: m::Vec3) -> m::Vec3;
}

/// No acceleration anywhere.
pub struct NoneField;
impl ForceField for NoneField {
    fn value_at(&self, _: m::Vec3) -> m::Vec3 {
        m::Vec3::zero()
    }
}

/// Constant gravity field over all of space.
pub struct Gravity(pub m::Vec3);
impl ForceField for Gravity {
    fn value_at(&self, _pos: m::Vec3) -> m::Vec3 {
        self.0
    }
}
