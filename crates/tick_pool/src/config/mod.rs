//! Configuration system
//!
//! Simulation settings load from TOML or RON, chosen by file extension.
//!
//! ```toml
//! [tick]
//! group = "PrePhysics"
//! invariant_policy = "Warn"
//!
//! [pool]
//! prewarm = 32
//!
//! [projectile]
//! name = "MagicProjectile"
//! life_span = 5.0
//!
//! [projectile.movement]
//! initial_speed = 8000.0
//! ```

pub use serde::{Deserialize, Serialize};

pub use crate::error::ConfigError;
use crate::error::InvariantPolicy;
use crate::foundation::math::Vec3;
use crate::movement::MovementParams;
use crate::tick::TickGroup;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Managed tick settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TickConfig {
    /// Phase the managed registry runs in
    pub group: TickGroup,
    /// How double registration and double release are surfaced
    pub invariant_policy: InvariantPolicy,
}

/// Entity pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PoolConfig {
    /// Dormant instances constructed up front
    pub prewarm: usize,
}

/// Projectile archetype settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Archetype name
    pub name: String,
    /// Collision sphere radius
    pub collision_radius: f32,
    /// Seconds before expiry (0 = never)
    pub life_span: f32,
    /// Full-strength camera shake radius
    pub impact_shake_inner_radius: f32,
    /// Camera shake fade-out radius
    pub impact_shake_outer_radius: f32,
    /// Impact emitter asset
    pub impact_effect: Option<String>,
    /// Impact sound asset
    pub impact_sound: Option<String>,
    /// Impact camera shake asset
    pub impact_shake: Option<String>,
    /// Looping flight particles
    pub flight_effect: Option<String>,
    /// Looping flight audio
    pub flight_sound: Option<String>,
    /// Motion parameters
    pub movement: MovementParams,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            name: "Projectile".to_string(),
            collision_radius: 20.0,
            life_span: 5.0,
            impact_shake_inner_radius: 0.0,
            impact_shake_outer_radius: 1500.0,
            impact_effect: Some("impact_vfx".to_string()),
            impact_sound: Some("impact_sound".to_string()),
            impact_shake: Some("impact_shake".to_string()),
            flight_effect: Some("flight_vfx".to_string()),
            flight_sound: Some("flight_loop".to_string()),
            movement: MovementParams::default(),
        }
    }
}

/// World settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Gravity acceleration in units per second squared
    pub gravity: Vec3,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -980.0),
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Managed tick settings
    pub tick: TickConfig,
    /// Pool settings
    pub pool: PoolConfig,
    /// Default projectile archetype
    pub projectile: ProjectileConfig,
    /// World settings
    pub world: WorldConfig,
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let projectile = &self.projectile;
        let non_negative = [
            ("projectile.collision_radius", projectile.collision_radius),
            ("projectile.life_span", projectile.life_span),
            ("projectile.impact_shake_inner_radius", projectile.impact_shake_inner_radius),
            ("projectile.impact_shake_outer_radius", projectile.impact_shake_outer_radius),
            ("projectile.movement.initial_speed", projectile.movement.initial_speed),
            ("projectile.movement.max_speed", projectile.movement.max_speed),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }

        if projectile.impact_shake_inner_radius > projectile.impact_shake_outer_radius {
            return Err(ConfigError::Invalid {
                field: "projectile.impact_shake_inner_radius",
                reason: format!(
                    "inner radius {} exceeds outer radius {}",
                    projectile.impact_shake_inner_radius, projectile.impact_shake_outer_radius
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick.group, TickGroup::PrePhysics);
        assert_eq!(config.projectile.movement.initial_speed, 8000.0);
        assert_eq!(config.projectile.movement.gravity_scale, 0.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            [tick]
            group = "PostPhysics"
            invariant_policy = "Warn"

            [projectile]
            life_span = 2.5

            [projectile.movement]
            initial_speed = 1200.0
        "#;
        let config: SimulationConfig = toml::from_str(text).unwrap();
        assert_eq!(config.tick.group, TickGroup::PostPhysics);
        assert_eq!(config.tick.invariant_policy, InvariantPolicy::Warn);
        assert_eq!(config.projectile.life_span, 2.5);
        assert_eq!(config.projectile.movement.initial_speed, 1200.0);
        assert!(config.projectile.movement.rotation_follows_velocity);
        assert_eq!(config.projectile.collision_radius, 20.0);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("tick_pool_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let mut config = SimulationConfig::default();
        config.pool.prewarm = 16;
        config.save_to_file(&path).unwrap();
        let loaded = SimulationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SimulationConfig::default().save_to_file("config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_shake_radii() {
        let mut config = SimulationConfig::default();
        config.projectile.impact_shake_inner_radius = 2000.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_lifespan() {
        let mut config = SimulationConfig::default();
        config.projectile.life_span = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("projectile.life_span"));
    }
}
