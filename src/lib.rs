//! An agent-based SIR epidemic simulator
//!
//! A fixed population of point agents moves through a bounded 2D arena. Agents are
//! Susceptible, Infected or Recovered; an infected agent that comes within two radii of a
//! susceptible one infects it with a fixed probability, and recovers after a fixed number of
//! ticks. The simulator runs a set of scenarios that differ only in how much of the population
//! starts out vaccinated, and records how many agents are in each state after every tick.
//!
//! The crate is organized from the leaves up:
//! * [`agent`]: the state and per-tick motion and health updates of a single agent.
//! * [`population`]: building the initial population for a scenario (vaccination and
//!   patient zero).
//! * [`engine`]: advancing a population by one tick and tallying the result.
//! * [`runner`]: driving the engine for each scenario until the infection dies out, drawing
//!   every tick onto a [`canvas`] (a native window, or nothing in headless runs), and writing
//!   the [`report`] and [`plot`] afterwards.
//!
//! The engine does no I/O and draws all of its randomness from a generator passed in by the
//! caller, so a run is fully determined by its [`parameters`] and seed:
//!
//! ```rust
//! use flusim::prelude::*;
//! use rand::SeedableRng;
//!
//! let parameters = Parameters::default();
//! let mut rng = SmallRng::seed_from_u64(42);
//! let population = Population::new(&parameters, 0.5, &mut rng);
//! let mut engine = Engine::new(parameters, population);
//! let counts = engine.tick(&mut rng);
//! assert_eq!(counts.total(), 150);
//! ```
pub mod agent;
pub mod canvas;
pub mod engine;
pub mod error;
pub mod log;
pub mod pacing;
pub mod parameters;
pub mod plot;
pub mod population;
pub mod progress;
pub mod report;
pub mod runner;
pub mod time_series;
#[cfg(feature = "window")]
pub mod window;

pub mod prelude {
    pub use crate::agent::{Agent, HealthState, Vec2};
    pub use crate::engine::{Engine, TickCounts};
    pub use crate::error::SimError;
    pub use crate::parameters::{
        Parameters, ParametersBuilder, Scenario, SimulationConfig, TransmissionMode,
    };
    pub use crate::population::Population;
    pub use crate::time_series::TimeSeries;
    pub use rand::rngs::SmallRng;
}

// Re-export for use in doctests and downstream models
pub use rand;
