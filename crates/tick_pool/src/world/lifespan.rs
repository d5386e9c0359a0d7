//! Lifespan countdown
//!
//! Host-side timer that ends an entity's life when it has been alive long enough.

/// Lifespan of one entity life
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifespan {
    /// How long the entity should live (in seconds, 0 = forever)
    pub duration: f32,
    /// Time alive so far (in seconds)
    pub elapsed: f32,
}

impl Lifespan {
    /// Create a new lifespan starting now
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `delta_time`; returns `true` only on the frame the lifespan runs out
    pub fn advance(&mut self, delta_time: f32) -> bool {
        let was_expired = self.is_expired();
        self.elapsed += delta_time;
        !was_expired && self.is_expired()
    }

    /// Check if this lifespan has run out
    pub fn is_expired(&self) -> bool {
        if self.duration <= 0.0 {
            false // Infinite lifespan
        } else {
            self.elapsed >= self.duration
        }
    }

    /// Get remaining lifespan in seconds
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }
}
