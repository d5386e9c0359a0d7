//! Collision volumes and hit events
//!
//! The physics step is a host collaborator; this module only describes what it
//! delivers to an entity and the sphere volume projectiles carry.

use crate::foundation::math::Vec3;
use crate::pool::EntityId;

/// Identifier of a static collider owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u32);

/// What a projectile ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Static level geometry
    Collider(ColliderId),
    /// Another pooled entity
    Entity(EntityId),
}

/// Contact details of a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Contact point in world space
    pub location: Vec3,
    /// Surface normal at the contact, pointing away from the surface hit
    pub normal: Vec3,
    /// How far the volumes overlapped
    pub penetration: f32,
}

/// Collision event delivered by the physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    /// Entity being notified
    pub entity: EntityId,
    /// What it hit
    pub other: HitTarget,
    /// Impulse along the contact normal
    pub normal_impulse: Vec3,
    /// Contact details
    pub hit: HitResult,
}

/// Receiver of collision callbacks
///
/// Called on the simulation thread, between tick passes.
pub trait CollisionListener {
    /// React to a hit
    fn on_hit(&mut self, event: &HitEvent);
}

/// Sphere volume in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Contact of this (moving) sphere against `surface`, if they overlap
    ///
    /// The contact point lies on `surface` and the normal points from it toward
    /// this sphere's center.
    pub fn contact_with(&self, surface: &Self) -> Option<HitResult> {
        if !self.intersects(surface) {
            return None;
        }
        let offset = self.center - surface.center;
        let distance = offset.magnitude();
        let normal = offset.try_normalize(1.0e-6).unwrap_or_else(Vec3::z);
        Some(HitResult {
            location: surface.center + normal * surface.radius,
            normal,
            penetration: (self.radius + surface.radius - distance).max(0.0),
        })
    }
}

/// Static sphere collider placed in the world by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    /// Collider identifier
    pub id: ColliderId,
    /// World-space volume
    pub volume: BoundingSphere,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_intersection() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contact_point_and_normal() {
        let projectile = BoundingSphere::new(Vec3::new(0.0, 0.0, 9.5), 1.0);
        let ground = BoundingSphere::new(Vec3::zeros(), 9.0);

        let hit = projectile.contact_with(&ground).unwrap();
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(hit.location, Vec3::new(0.0, 0.0, 9.0), epsilon = 1e-6);
        assert_relative_eq!(hit.penetration, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_no_contact_when_apart() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(a.contact_with(&b).is_none());
    }
}
