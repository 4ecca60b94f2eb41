//! The simulation engine advances a population one discrete tick at a time.
//!
//! A tick moves every agent, advances every infection, and checks every infected agent against
//! every susceptible agent for transmission. The engine does no I/O and has no notion of when
//! a run should stop; that belongs to the [`runner`](crate::runner).
//!
//! The order of work inside a tick is controlled by [`TransmissionMode`]. In the default
//! cascading mode each agent is moved, updated, counted and (if infected) scanned against the
//! whole population before the next agent is touched. Contacts are therefore measured against
//! whatever position each agent holds at that moment: agents earlier in the order have already
//! moved this tick, later ones have not. An agent infected during the pass is counted as
//! infected and starts transmitting as soon as the pass reaches it.
use log::trace;
use rand::Rng;
use serde::Serialize;

use crate::agent::HealthState;
use crate::parameters::{Parameters, TransmissionMode};
use crate::population::Population;

/// Number of agents in each health state at the end of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

impl TickCounts {
    pub fn tally(&mut self, health_state: HealthState) {
        match health_state {
            HealthState::Susceptible => self.susceptible += 1,
            HealthState::Infected => self.infected += 1,
            HealthState::Recovered => self.recovered += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

pub struct Engine {
    parameters: Parameters,
    population: Population,
    ticks: usize,
}

impl Engine {
    #[must_use]
    pub fn new(parameters: Parameters, population: Population) -> Engine {
        Engine {
            parameters,
            population,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of ticks executed so far.
    #[must_use]
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Advances the population by one tick and returns the counts tallied during it.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickCounts {
        let counts = match self.parameters.transmission_mode {
            TransmissionMode::Cascading => self.tick_cascading(rng),
            TransmissionMode::Snapshot => self.tick_snapshot(rng),
        };
        self.ticks += 1;
        trace!(
            "tick {}: S={} I={} R={}",
            self.ticks,
            counts.susceptible,
            counts.infected,
            counts.recovered
        );
        counts
    }

    fn tick_cascading<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickCounts {
        let Parameters {
            width,
            height,
            recovery_threshold,
            ..
        } = self.parameters;
        let contact_distance = self.contact_distance();
        let transmission_probability = self.parameters.transmission_probability;
        let agents = self.population.agents_mut();

        let mut counts = TickCounts::default();
        for index in 0..agents.len() {
            let agent = &mut agents[index];
            agent.advance_position();
            agent.reflect_at_boundaries(width, height);
            agent.advance_health(recovery_threshold);
            counts.tally(agent.health_state());

            if agent.is_infected() {
                let source = agent.position();
                for other in agents.iter_mut() {
                    if other.is_susceptible()
                        && source.distance(other.position()) < contact_distance
                        && rng.random::<f64>() < transmission_probability
                    {
                        other.infect();
                    }
                }
            }
        }
        counts
    }

    fn tick_snapshot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickCounts {
        let Parameters {
            width,
            height,
            recovery_threshold,
            ..
        } = self.parameters;
        let contact_distance = self.contact_distance();
        let transmission_probability = self.parameters.transmission_probability;
        let agents = self.population.agents_mut();

        let mut counts = TickCounts::default();
        for agent in agents.iter_mut() {
            agent.advance_position();
            agent.reflect_at_boundaries(width, height);
            agent.advance_health(recovery_threshold);
            counts.tally(agent.health_state());
        }

        let mut newly_infected = Vec::new();
        for source in agents.iter().filter(|agent| agent.is_infected()) {
            for (index, other) in agents.iter().enumerate() {
                if other.is_susceptible()
                    && source.position().distance(other.position()) < contact_distance
                    && rng.random::<f64>() < transmission_probability
                {
                    newly_infected.push(index);
                }
            }
        }
        for index in newly_infected {
            agents[index].infect();
        }
        counts
    }

    fn contact_distance(&self) -> f64 {
        2.0 * self.parameters.agent_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, Vec2};
    use crate::parameters::ParametersBuilder;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn still(x: f64, y: f64, health_state: HealthState) -> Agent {
        Agent::new(Vec2::new(x, y), Vec2::default(), health_state)
    }

    fn certain_transmission(mode: TransmissionMode) -> Parameters {
        ParametersBuilder::default()
            .transmission_probability(1.0)
            .transmission_mode(mode)
            .build()
            .unwrap()
    }

    #[test]
    fn counts_are_conserved() {
        let parameters = Parameters::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let population = Population::new(&parameters, 0.0, &mut rng);
        let mut engine = Engine::new(parameters, population);
        for _ in 0..500 {
            assert_eq!(engine.tick(&mut rng).total(), 150);
        }
        assert_eq!(engine.ticks(), 500);
    }

    #[test]
    fn first_tick_counts_only_patient_zero() {
        let parameters = Parameters::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let population = Population::new(&parameters, 0.0, &mut rng);
        let mut engine = Engine::new(parameters, population);
        let counts = engine.tick(&mut rng);
        assert_eq!(counts.infected, 1);
        assert_eq!(counts.susceptible, 149);
    }

    #[test]
    fn contact_requires_distance_below_two_radii() {
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            still(109.9, 100.0, HealthState::Susceptible),
            still(100.0, 110.0, HealthState::Susceptible),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Cascading),
            population,
        );
        engine.tick(&mut SmallRng::seed_from_u64(0));
        let agents = engine.population().agents();
        assert!(agents[1].is_infected());
        assert!(agents[2].is_susceptible());
    }

    #[test]
    fn recovered_agents_are_never_infected() {
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            still(101.0, 100.0, HealthState::Recovered),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Cascading),
            population,
        );
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..10 {
            engine.tick(&mut rng);
        }
        assert_eq!(
            engine.population()[1].health_state(),
            HealthState::Recovered
        );
    }

    #[test]
    fn cascading_infects_and_counts_later_agents_in_the_same_tick() {
        // 0 infects 1, which is visited next and in turn infects 2.
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            still(108.0, 100.0, HealthState::Susceptible),
            still(116.0, 100.0, HealthState::Susceptible),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Cascading),
            population,
        );
        let counts = engine.tick(&mut SmallRng::seed_from_u64(0));
        assert_eq!(counts.infected, 3);
        let agents = engine.population().agents();
        assert!(agents.iter().all(Agent::is_infected));
        // Infected this tick, then advanced once when visited.
        assert_eq!(agents[1].infection_timer(), 1);
        assert_eq!(agents[2].infection_timer(), 1);
    }

    #[test]
    fn cascading_does_not_recount_earlier_agents() {
        // The last agent infects the first one, which has already been counted.
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Susceptible),
            still(105.0, 100.0, HealthState::Infected),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Cascading),
            population,
        );
        let counts = engine.tick(&mut SmallRng::seed_from_u64(0));
        assert_eq!(counts.susceptible, 1);
        assert_eq!(counts.infected, 1);
        assert!(engine.population()[0].is_infected());
        assert_eq!(engine.population()[0].infection_timer(), 0);
    }

    #[test]
    fn cascading_uses_positions_held_during_the_scan() {
        // Agent 1 starts in contact but moves away when visited; agent 0 is scanned first and
        // sees the old position.
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            Agent::new(
                Vec2::new(105.0, 100.0),
                Vec2::new(20.0, 0.0),
                HealthState::Susceptible,
            ),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Cascading),
            population,
        );
        engine.tick(&mut SmallRng::seed_from_u64(0));
        assert!(engine.population()[1].is_infected());
    }

    #[test]
    fn snapshot_defers_new_infections() {
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            still(108.0, 100.0, HealthState::Susceptible),
            still(116.0, 100.0, HealthState::Susceptible),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Snapshot),
            population,
        );
        let mut rng = SmallRng::seed_from_u64(0);
        let counts = engine.tick(&mut rng);
        assert_eq!(counts.infected, 1);
        assert!(engine.population()[1].is_infected());
        assert!(engine.population()[2].is_susceptible());

        let counts = engine.tick(&mut rng);
        assert_eq!(counts.infected, 2);
        assert!(engine.population()[2].is_infected());
    }

    #[test]
    fn snapshot_uses_moved_positions() {
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            Agent::new(
                Vec2::new(105.0, 100.0),
                Vec2::new(20.0, 0.0),
                HealthState::Susceptible,
            ),
        ]);
        let mut engine = Engine::new(
            certain_transmission(TransmissionMode::Snapshot),
            population,
        );
        engine.tick(&mut SmallRng::seed_from_u64(0));
        assert!(engine.population()[1].is_susceptible());
    }

    #[test]
    fn zero_probability_never_transmits() {
        let parameters = ParametersBuilder::default()
            .transmission_probability(0.0)
            .build()
            .unwrap();
        let population = Population::from_agents(vec![
            still(100.0, 100.0, HealthState::Infected),
            still(101.0, 100.0, HealthState::Susceptible),
        ]);
        let mut engine = Engine::new(parameters, population);
        let mut rng = SmallRng::seed_from_u64(0);
        for tick in 1..=181 {
            let counts = engine.tick(&mut rng);
            assert_eq!(counts.susceptible, 1);
            if tick <= 180 {
                assert_eq!(counts.infected, 1);
            } else {
                assert_eq!(counts.infected, 0);
                assert_eq!(counts.recovered, 1);
            }
        }
    }

    #[test]
    fn states_only_move_forward() {
        fn rank(state: HealthState) -> u8 {
            match state {
                HealthState::Susceptible => 0,
                HealthState::Infected => 1,
                HealthState::Recovered => 2,
            }
        }

        let parameters = ParametersBuilder::default()
            .population(80)
            .width(200.0)
            .height(200.0)
            .build()
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let population = Population::new(&parameters, 0.2, &mut rng);
        let mut engine = Engine::new(parameters, population);
        let mut previous: Vec<(HealthState, u32)> = engine
            .population()
            .iter()
            .map(|agent| (agent.health_state(), agent.infection_timer()))
            .collect();
        for _ in 0..600 {
            engine.tick(&mut rng);
            for (agent, (state, timer)) in engine.population().iter().zip(&previous) {
                assert!(rank(agent.health_state()) >= rank(*state));
                if *state == HealthState::Infected && agent.is_infected() {
                    assert_eq!(agent.infection_timer(), timer + 1);
                }
                if *state == HealthState::Infected && !agent.is_infected() {
                    assert_eq!(agent.infection_timer(), 181);
                }
            }
            previous = engine
                .population()
                .iter()
                .map(|agent| (agent.health_state(), agent.infection_timer()))
                .collect();
        }
    }

    #[test]
    fn agents_stay_near_the_arena() {
        let parameters = Parameters::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let population = Population::new(&parameters, 0.0, &mut rng);
        let mut engine = Engine::new(parameters, population);
        for _ in 0..2_000 {
            engine.tick(&mut rng);
            for agent in engine.population() {
                let Vec2 { x, y } = agent.position();
                assert!((-2.0..=802.0).contains(&x));
                assert!((-2.0..=602.0).contains(&y));
            }
        }
    }

    #[test]
    fn same_seed_same_tallies() {
        let run = |seed: u64| {
            let parameters = Parameters::default();
            let mut rng = SmallRng::seed_from_u64(seed);
            let population = Population::new(&parameters, 0.0, &mut rng);
            let mut engine = Engine::new(parameters, population);
            (0..400).map(|_| engine.tick(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(21), run(21));
    }
}
