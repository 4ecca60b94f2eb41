use std::ops::Index;

use log::debug;
use rand::Rng;

use crate::agent::{Agent, HealthState};
use crate::engine::TickCounts;
use crate::parameters::Parameters;

/// The fixed, ordered set of agents for one scenario run.
#[derive(Clone, Debug)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Creates `parameters.population` agents. The first `floor(n * vaccination_fraction)`
    /// start recovered and the rest susceptible; the last agent is then made patient zero,
    /// even if it was among the vaccinated.
    ///
    /// Inputs are assumed to have been validated.
    pub fn new<R: Rng + ?Sized>(
        parameters: &Parameters,
        vaccination_fraction: f64,
        rng: &mut R,
    ) -> Population {
        let size = parameters.population;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_vaccinated = (size as f64 * vaccination_fraction).floor() as usize;

        let mut agents = Vec::with_capacity(size);
        for index in 0..size {
            let health_state = if index < num_vaccinated {
                HealthState::Recovered
            } else {
                HealthState::Susceptible
            };
            agents.push(Agent::random(parameters, health_state, rng));
        }

        if let Some(patient_zero) = agents.last_mut() {
            patient_zero.force_infect();
        }

        debug!(
            "created population of {} with {} vaccinated",
            size, num_vaccinated
        );
        Population { agents }
    }

    #[must_use]
    pub fn from_agents(agents: Vec<Agent>) -> Population {
        Population { agents }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Counts agents in each health state without advancing anything.
    #[must_use]
    pub fn counts(&self) -> TickCounts {
        let mut counts = TickCounts::default();
        for agent in &self.agents {
            counts.tally(agent.health_state());
        }
        counts
    }
}

impl Index<usize> for Population {
    type Output = Agent;

    fn index(&self, index: usize) -> &Agent {
        &self.agents[index]
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Agent;
    type IntoIter = std::slice::Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
