//! Simulation parameters and scenario definitions.
//!
//! Every constant the simulation depends on lives in an immutable [`Parameters`] value that is
//! handed to the population and the engine when they are built. Scenarios differ only by their
//! vaccination fraction, so several scenarios can run from the same parameters without
//! touching one another.
//!
//! Parameters can be built in code with [`ParametersBuilder`] or loaded from a JSON file with
//! [`SimulationConfig::load`]. Fields missing from the file take their default values:
//!
//! ```json
//! {
//!     "parameters": { "population": 300, "transmission_probability": 0.2 },
//!     "scenarios": [
//!         { "label": "A", "name": "Flu (No Vaccine)", "vaccination_fraction": 0.0 }
//!     ]
//! }
//! ```
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use derive_builder::Builder;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameter, SimError};

/// How infections found during a tick become visible to the rest of that tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionMode {
    /// Agents are moved, updated and scanned one at a time. An agent infected earlier in the
    /// pass is tallied and transmits when the pass reaches it, within the same tick.
    #[default]
    Cascading,
    /// Every agent moves and updates first; transmission is then resolved against those
    /// positions and new infections are applied once the scan is complete.
    Snapshot,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(default)]
#[serde(default)]
pub struct Parameters {
    /// Arena width. Also the width of the display canvas.
    pub width: f64,

    /// Arena height. Also the height of the display canvas.
    pub height: f64,

    /// Number of agents in every scenario.
    pub population: usize,

    /// Agents closer than twice this radius are in contact.
    pub agent_radius: f64,

    /// Velocity components are drawn uniformly from `[-max_speed, max_speed]`.
    pub max_speed: f64,

    /// Probability that a single contact check between an infected and a susceptible agent
    /// results in an infection.
    pub transmission_probability: f64,

    /// An infected agent recovers on the first tick its infection timer exceeds this value.
    pub recovery_threshold: u32,

    /// Frames per second cap for the display loop; `0` runs uncapped.
    pub frame_rate: u32,

    pub transmission_mode: TransmissionMode,

    /// Optional hard stop for a scenario, counted in ticks.
    pub max_ticks: Option<usize>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            width: 800.0,
            height: 600.0,
            population: 150,
            agent_radius: 5.0,
            max_speed: 2.0,
            transmission_probability: 0.15,
            recovery_threshold: 180,
            frame_rate: 60,
            transmission_mode: TransmissionMode::Cascading,
            max_ticks: None,
        }
    }
}

impl Parameters {
    /// Checks every value the simulation relies on.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range parameter found.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(InvalidParameter::new("width", self.width, "a positive number"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(InvalidParameter::new(
                "height",
                self.height,
                "a positive number",
            ));
        }
        if self.population == 0 {
            return Err(InvalidParameter::new(
                "population",
                0.0,
                "at least one agent",
            ));
        }
        if !(self.agent_radius.is_finite() && self.agent_radius > 0.0) {
            return Err(InvalidParameter::new(
                "agent_radius",
                self.agent_radius,
                "a positive number",
            ));
        }
        if 2.0 * self.agent_radius > self.width.min(self.height) {
            return Err(InvalidParameter::new(
                "agent_radius",
                self.agent_radius,
                "an agent diameter no larger than the arena",
            ));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(InvalidParameter::new(
                "max_speed",
                self.max_speed,
                "a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.transmission_probability) {
            return Err(InvalidParameter::new(
                "transmission_probability",
                self.transmission_probability,
                "a value in [0, 1]",
            ));
        }
        if self.max_ticks == Some(0) {
            return Err(InvalidParameter::new(
                "max_ticks",
                0.0,
                "at least one tick",
            ));
        }
        Ok(())
    }
}

/// One run of the simulation, distinguished by how much of the population starts immune.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Short identifier used in reports and plot titles, e.g. `"A"`.
    pub label: String,
    /// Human readable name shown in the display caption.
    pub name: String,
    /// Fraction of the population created already recovered.
    pub vaccination_fraction: f64,
}

impl Scenario {
    #[must_use]
    pub fn new(label: &str, name: &str, vaccination_fraction: f64) -> Self {
        Scenario {
            label: label.to_string(),
            name: name.to_string(),
            vaccination_fraction,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the vaccination fraction is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        if !(0.0..=1.0).contains(&self.vaccination_fraction) {
            return Err(InvalidParameter::new(
                "vaccination_fraction",
                self.vaccination_fraction,
                "a value in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Caption for the display while this scenario runs.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("Scenario: {}", self.name)
    }

    /// Title for this scenario's epidemic curve.
    #[must_use]
    pub fn title(&self) -> String {
        if self.vaccination_fraction == 0.0 {
            format!("Scenario {}: No Vaccine", self.label)
        } else {
            format!(
                "Scenario {}: {}% Vaccine",
                self.label,
                (self.vaccination_fraction * 100.0).round()
            )
        }
    }

    /// The two reference scenarios: no vaccination and half the population vaccinated.
    #[must_use]
    pub fn reference_scenarios() -> Vec<Scenario> {
        vec![
            Scenario::new("A", "Flu (No Vaccine)", 0.0),
            Scenario::new("B", "Flu (50% Vaccinated)", 0.5),
        ]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub parameters: Parameters,
    pub scenarios: Vec<Scenario>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            parameters: Parameters::default(),
            scenarios: Scenario::reference_scenarios(),
        }
    }
}

impl SimulationConfig {
    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it holds invalid values.
    pub fn load(path: &Path) -> Result<SimulationConfig, SimError> {
        trace!("loading simulation config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the parameters or any scenario are invalid, or if there are no
    /// scenarios to run.
    pub fn validate(&self) -> Result<(), SimError> {
        self.parameters.validate()?;
        if self.scenarios.is_empty() {
            return Err(SimError::SimError(
                "configuration must define at least one scenario".to_string(),
            ));
        }
        for scenario in &self.scenarios {
            scenario.validate()?;
        }
        Ok(())
    }
}
