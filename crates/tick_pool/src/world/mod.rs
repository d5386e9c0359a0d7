//! Projectile world
//!
//! Host-side frame driver around the core. It owns the managed tick registry,
//! the projectile pool and the collaborators injected into every projectile, and
//! runs one frame as:
//!
//! 1. managed registry, when its group runs before physics
//! 2. default dispatch path, for units not moved into the registry
//! 3. physics step (sphere contacts against static colliders, `on_hit` delivery)
//! 4. managed registry, when its group runs after physics
//! 5. lifespan countdown and expiry
//! 6. release requests drained into the pool

pub mod lifespan;

pub use lifespan::Lifespan;

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SecondaryMap;

use crate::collision::{BoundingSphere, ColliderId, CollisionListener, HitEvent, HitTarget, StaticCollider};
use crate::config::SimulationConfig;
use crate::effects::{EffectSink, LoggingEffectSink};
use crate::error::{InvariantPolicy, SimError, SimResult, TickError};
use crate::foundation::math::{Transform, Vec3};
use crate::pool::{EntityId, EntityPoolManager, PoolStats, ReleaseRequests, SlotState};
use crate::projectile::{ArchetypeId, Projectile, ProjectileDescriptor, ProjectileServices, ProjectileState};
use crate::telemetry::ActiveCounter;
use crate::tick::{FrameStats, TickRegistry, TickStatus};

/// What happened during one [`ProjectileWorld::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Managed registry pass
    pub managed: FrameStats,
    /// Units ticked by the default dispatch path
    pub default_ticked: usize,
    /// Hits delivered by the physics step
    pub hits: usize,
    /// Lives ended by lifespan expiry
    pub expired: usize,
    /// Projectiles returned to the pool
    pub released: usize,
}

/// Simulation host for pooled projectiles
pub struct ProjectileWorld {
    config: SimulationConfig,
    registry: TickRegistry,
    pool: EntityPoolManager<Projectile>,
    archetypes: HashMap<ArchetypeId, Rc<ProjectileDescriptor>>,
    next_archetype: u32,
    lifespans: SecondaryMap<EntityId, Lifespan>,
    colliders: Vec<StaticCollider>,
    counter: Rc<ActiveCounter>,
    releases: ReleaseRequests,
    services: ProjectileServices,
    policy: InvariantPolicy,
    frame: u64,
    shut_down: bool,
}

impl ProjectileWorld {
    /// Archetype built from `config.projectile`
    pub const DEFAULT_ARCHETYPE: ArchetypeId = ArchetypeId(0);

    /// Create a world whose effects are logged
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        Self::with_effects(config, Rc::new(LoggingEffectSink))
    }

    /// Create a world that plays effects through `effects`
    pub fn with_effects(config: SimulationConfig, effects: Rc<dyn EffectSink>) -> SimResult<Self> {
        config.validate()?;

        let counter = Rc::new(ActiveCounter::default());
        let releases = ReleaseRequests::new();
        let services = ProjectileServices {
            counter: counter.clone(),
            effects,
            releases: releases.clone(),
        };

        let mut world = Self {
            registry: TickRegistry::new(config.tick.group),
            pool: EntityPoolManager::new(),
            archetypes: HashMap::new(),
            next_archetype: 0,
            lifespans: SecondaryMap::new(),
            colliders: Vec::new(),
            counter,
            releases,
            services,
            policy: config.tick.invariant_policy,
            frame: 0,
            shut_down: false,
            config,
        };

        let default = ProjectileDescriptor::from_config(Self::DEFAULT_ARCHETYPE, &world.config.projectile);
        world.register_archetype(default);
        world.prewarm(Self::DEFAULT_ARCHETYPE, world.config.pool.prewarm)?;

        log::info!(
            "Projectile world ready: managed ticks in {:?}, {} prewarmed",
            world.registry.group(),
            world.config.pool.prewarm
        );
        Ok(world)
    }

    /// Add a projectile archetype; the descriptor's own id is replaced
    pub fn register_archetype(&mut self, mut descriptor: ProjectileDescriptor) -> ArchetypeId {
        let archetype = ArchetypeId(self.next_archetype);
        self.next_archetype += 1;
        descriptor.archetype = archetype;
        log::debug!("Registered archetype {archetype:?} ({})", descriptor.name);
        self.archetypes.insert(archetype, Rc::new(descriptor));
        archetype
    }

    /// Construct `count` dormant instances of `archetype`
    pub fn prewarm(&mut self, archetype: ArchetypeId, count: usize) -> SimResult<()> {
        let descriptor = self.descriptor(archetype)?;
        let registry = &mut self.registry;
        let services = &self.services;
        self.pool.prewarm(count, |id| {
            Projectile::new(id, descriptor.clone(), registry.create_tick_function(id), services.clone())
        })?;
        Ok(())
    }

    /// Spawn a projectile of the default archetype
    pub fn spawn_projectile(&mut self, spawn: Transform) -> SimResult<EntityId> {
        self.spawn(Self::DEFAULT_ARCHETYPE, spawn)
    }

    /// Spawn a projectile, reusing a dormant instance when one exists
    pub fn spawn(&mut self, archetype: ArchetypeId, spawn: Transform) -> SimResult<EntityId> {
        let descriptor = self.descriptor(archetype)?;
        let life_span = descriptor.life_span;

        let registry = &mut self.registry;
        let services = &self.services;
        let acquired = self.pool.acquire_with(archetype, |id| {
            Projectile::new(id, descriptor, registry.create_tick_function(id), services.clone())
        })?;
        let id = acquired.id;

        let projectile = self.pool.get_active_mut(id)?;
        if let Err(err) = projectile.begin_play(spawn, &mut self.registry) {
            self.policy.report("spawn", &err);
            self.pool.release(id)?;
            return Err(err.into());
        }

        if life_span > 0.0 {
            self.lifespans.insert(id, Lifespan::new(life_span));
        } else {
            self.lifespans.remove(id);
        }
        Ok(id)
    }

    /// End a projectile's life and park it in the pool
    ///
    /// Returns `false` when the request violated an invariant (unknown or already
    /// dormant entity) and was ignored under [`InvariantPolicy::Warn`].
    pub fn release_projectile(&mut self, id: EntityId) -> bool {
        let projectile = match self.pool.get_active_mut(id) {
            Ok(projectile) => projectile,
            Err(err) => {
                self.policy.report("release_projectile", &err);
                return false;
            }
        };

        if let Err(err) = projectile.end_play(&mut self.registry) {
            self.policy.report("release_projectile", &err);
        }
        self.lifespans.remove(id);
        // A hit or expiry earlier this frame may have filed a request too
        self.releases.cancel(id);

        match self.pool.release(id) {
            Ok(()) => true,
            Err(err) => {
                self.policy.report("release_projectile", &err);
                false
            }
        }
    }

    /// Deliver a collision event from an external physics source
    pub fn deliver_hit(&mut self, event: &HitEvent) -> bool {
        match self.pool.get_active_mut(event.entity) {
            Ok(projectile) => {
                projectile.on_hit(event);
                true
            }
            Err(err) => {
                log::debug!("Dropping hit for {:?}: {err}", event.entity);
                false
            }
        }
    }

    /// Place a static sphere collider
    pub fn add_collider(&mut self, center: Vec3, radius: f32) -> ColliderId {
        let id = ColliderId(u32::try_from(self.colliders.len()).unwrap_or(u32::MAX));
        self.colliders.push(StaticCollider {
            id,
            volume: BoundingSphere::new(center, radius),
        });
        id
    }

    /// Run one frame
    pub fn step(&mut self, delta_time: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if self.shut_down {
            log::warn!("step() after shutdown; ignoring");
            return report;
        }

        let before_physics = self.registry.group().runs_before_physics();
        if before_physics {
            report.managed = self.run_managed(delta_time);
        }
        report.default_ticked = self.run_default_path(delta_time);
        report.hits = self.physics_step();
        if !before_physics {
            report.managed = self.run_managed(delta_time);
        }
        report.expired = self.advance_lifespans(delta_time);
        report.released = self.process_releases();

        self.frame += 1;
        report
    }

    /// Destroy every pooled projectile; the world is unusable afterwards
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.process_releases();

        let registry = &mut self.registry;
        self.pool.teardown(|id, mut projectile, state| {
            if state == SlotState::Active && projectile.state() != ProjectileState::Dormant {
                if let Err(err) = projectile.end_play(registry) {
                    log::warn!("Ending {id:?} at teardown failed: {err}");
                }
            }
        });
        self.lifespans.clear();
        self.shut_down = true;
        log::info!("Projectile world shut down after {} frames", self.frame);
    }

    /// Projectile by handle, active or dormant
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.pool.get(id)
    }

    /// Whether `id` is currently in play
    pub fn is_active(&self, id: EntityId) -> bool {
        self.pool.is_active(id)
    }

    /// Managed tick registry
    pub fn registry(&self) -> &TickRegistry {
        &self.registry
    }

    /// Pool statistics
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Dormant instances of `archetype`
    pub fn dormant_count(&self, archetype: ArchetypeId) -> usize {
        self.pool.dormant_count(archetype)
    }

    /// Live projectile counter
    pub fn active_counter(&self) -> &ActiveCounter {
        &self.counter
    }

    /// Remaining lifespan of an active projectile
    pub fn lifespan(&self, id: EntityId) -> Option<&Lifespan> {
        self.lifespans.get(id)
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether [`shutdown`](Self::shutdown) already ran
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn descriptor(&self, archetype: ArchetypeId) -> SimResult<Rc<ProjectileDescriptor>> {
        self.archetypes
            .get(&archetype)
            .cloned()
            .ok_or(SimError::UnknownArchetype(archetype))
    }

    fn run_managed(&mut self, delta_time: f32) -> FrameStats {
        let pool = &mut self.pool;
        let gravity = self.config.world.gravity;
        self.registry.execute_frame(delta_time, |entry, ctx| {
            // Dormant owners are still reachable: a queued removal ticks once more
            let projectile = pool.get_mut(entry.owner).ok_or_else(|| TickError::UnitFailed {
                id: entry.id,
                reason: format!("owner {:?} is no longer pooled", entry.owner),
            })?;
            if !projectile.movement().tick_function().is_enabled() {
                return Ok(TickStatus::Skipped);
            }
            projectile.tick(ctx.delta_time(), &gravity);
            Ok(TickStatus::Ticked)
        })
    }

    fn run_default_path(&mut self, delta_time: f32) -> usize {
        let gravity = self.config.world.gravity;
        let mut ticked = 0;
        for (_, projectile) in self.pool.iter_active_mut() {
            let tick = projectile.movement().tick_function();
            if tick.on_default_path() && tick.is_enabled() {
                projectile.tick(delta_time, &gravity);
                ticked += 1;
            }
        }
        ticked
    }

    fn physics_step(&mut self) -> usize {
        let mut hits = Vec::new();
        for (id, projectile) in self.pool.iter_active_mut() {
            if !projectile.is_alive() {
                continue;
            }
            let volume = projectile.collision_volume();
            let speed = projectile.movement().velocity().magnitude();
            let contact = self
                .colliders
                .iter()
                .find_map(|collider| volume.contact_with(&collider.volume).map(|hit| (collider.id, hit)));
            if let Some((collider, hit)) = contact {
                hits.push(HitEvent {
                    entity: id,
                    other: HitTarget::Collider(collider),
                    normal_impulse: hit.normal * speed,
                    hit,
                });
            }
        }

        for event in &hits {
            self.deliver_hit(event);
        }
        hits.len()
    }

    fn advance_lifespans(&mut self, delta_time: f32) -> usize {
        let mut expired = Vec::new();
        for (id, lifespan) in &mut self.lifespans {
            if self.pool.is_active(id) && lifespan.advance(delta_time) {
                expired.push(id);
            }
        }

        let mut count = 0;
        for id in expired {
            if let Ok(projectile) = self.pool.get_active_mut(id) {
                if projectile.life_span_expired() {
                    count += 1;
                }
            }
        }
        count
    }

    fn process_releases(&mut self) -> usize {
        let mut released = 0;
        for id in self.releases.drain() {
            let ending = self
                .pool
                .get(id)
                .is_some_and(|projectile| matches!(projectile.state(), ProjectileState::Ending(_)));
            if !ending {
                log::debug!("Dropping release request for {id:?}: its life already ended");
                continue;
            }
            if self.release_projectile(id) {
                released += 1;
            }
        }
        released
    }
}

impl Drop for ProjectileWorld {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ProjectileWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectileWorld")
            .field("frame", &self.frame)
            .field("registered", &self.registry.len())
            .field("pool", &self.pool.stats())
            .field("active_counter", &self.counter.current())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}
