//! Math utilities and types
//!
//! Provides the vector, rotation and transform types used by movement and collision.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Forward axis of an entity in local space
pub const FORWARD: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Up axis used when orienting along a direction
pub const UP: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Position and orientation of a simulation entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// World-space forward direction
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// Rotate a local-space vector into world space
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }
}

/// Rotation that points the local forward axis along `direction`
///
/// Returns `None` for a (near) zero direction.
pub fn rotation_along(direction: &Vec3) -> Option<Quat> {
    let dir = direction.try_normalize(1.0e-6)?;
    Quat::rotation_between(&FORWARD, &dir).or_else(|| {
        // Exactly opposite to forward: any half turn about up works
        Some(Quat::from_axis_angle(&Unit::new_normalize(UP), std::f32::consts::PI))
    })
}
