use crate::math::Vec3;

/// Axis-aligned bounding box in model space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max).scale(0.5)
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: Vec3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vec3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}
