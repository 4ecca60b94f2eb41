//! A single mobile agent: where it is, how it moves, and where it is in the course of infection.
use std::ops::{Add, AddAssign, Sub};

use rand::Rng;
use serde::Serialize;

use crate::parameters::Parameters;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HealthState {
    Susceptible,
    Infected,
    Recovered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    position: Vec2,
    velocity: Vec2,
    health_state: HealthState,
    infection_timer: u32,
}

impl Agent {
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2, health_state: HealthState) -> Self {
        Agent {
            position,
            velocity,
            health_state,
            infection_timer: 0,
        }
    }

    /// Places an agent on a whole-number coordinate inside the arena, at least one radius from
    /// each wall, with velocity components drawn uniformly from `[-max_speed, max_speed]`.
    pub fn random<R: Rng + ?Sized>(
        parameters: &Parameters,
        health_state: HealthState,
        rng: &mut R,
    ) -> Self {
        let radius = parameters.agent_radius;
        let x = whole_coordinate(rng, radius, parameters.width);
        let y = whole_coordinate(rng, radius, parameters.height);
        let vx = rng.random_range(-parameters.max_speed..=parameters.max_speed);
        let vy = rng.random_range(-parameters.max_speed..=parameters.max_speed);
        Agent::new(Vec2::new(x, y), Vec2::new(vx, vy), health_state)
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        self.health_state
    }

    /// Ticks spent infected. Only meaningful while the agent is infected.
    #[must_use]
    pub fn infection_timer(&self) -> u32 {
        self.infection_timer
    }

    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.health_state == HealthState::Susceptible
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.health_state == HealthState::Infected
    }

    pub fn advance_position(&mut self) {
        self.position += self.velocity;
    }

    /// Reverses each velocity component whose coordinate has reached or passed a wall.
    ///
    /// The position itself is left where it is, so an agent may sit outside the arena by up to
    /// one step until the next move carries it back.
    pub fn reflect_at_boundaries(&mut self, width: f64, height: f64) {
        if self.position.x <= 0.0 || self.position.x >= width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y <= 0.0 || self.position.y >= height {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Advances the course of infection by one tick. Susceptible and recovered agents are
    /// unaffected.
    pub fn advance_health(&mut self, recovery_threshold: u32) {
        if self.health_state == HealthState::Infected {
            self.infection_timer += 1;
            if self.infection_timer > recovery_threshold {
                self.health_state = HealthState::Recovered;
            }
        }
    }

    /// Infects a susceptible agent, starting its timer at zero. Returns whether the agent's
    /// state changed.
    pub fn infect(&mut self) -> bool {
        if self.health_state != HealthState::Susceptible {
            return false;
        }
        self.health_state = HealthState::Infected;
        self.infection_timer = 0;
        true
    }

    /// Puts the agent into the infected state regardless of its current state. Only used to
    /// seed patient zero.
    pub(crate) fn force_infect(&mut self) {
        self.health_state = HealthState::Infected;
        self.infection_timer = 0;
    }
}

/// A whole number in `[radius, extent - radius]`, or the midpoint when no whole number fits.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_coordinate<R: Rng + ?Sized>(rng: &mut R, radius: f64, extent: f64) -> f64 {
    let low = radius.ceil() as i64;
    let high = (extent - radius).floor() as i64;
    if low <= high {
        rng.random_range(low..=high) as f64
    } else {
        extent / 2.0
    }
}
