use serde::Serialize;

use crate::engine::TickCounts;

/// Per-tick susceptible, infected and recovered counts for one scenario run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeSeries {
    susceptible: Vec<usize>,
    infected: Vec<usize>,
    recovered: Vec<usize>,
}

impl TimeSeries {
    #[must_use]
    pub fn new() -> Self {
        TimeSeries::default()
    }

    pub fn record(&mut self, counts: TickCounts) {
        self.susceptible.push(counts.susceptible);
        self.infected.push(counts.infected);
        self.recovered.push(counts.recovered);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.infected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infected.is_empty()
    }

    #[must_use]
    pub fn susceptible(&self) -> &[usize] {
        &self.susceptible
    }

    #[must_use]
    pub fn infected(&self) -> &[usize] {
        &self.infected
    }

    #[must_use]
    pub fn recovered(&self) -> &[usize] {
        &self.recovered
    }

    /// Counts recorded at `tick` (zero based).
    #[must_use]
    pub fn get(&self, tick: usize) -> Option<TickCounts> {
        Some(TickCounts {
            susceptible: *self.susceptible.get(tick)?,
            infected: *self.infected.get(tick)?,
            recovered: *self.recovered.get(tick)?,
        })
    }

    #[must_use]
    pub fn last(&self) -> Option<TickCounts> {
        self.len().checked_sub(1).and_then(|tick| self.get(tick))
    }

    pub fn iter(&self) -> impl Iterator<Item = TickCounts> + '_ {
        (0..self.len()).filter_map(|tick| self.get(tick))
    }

    /// Highest infected count and the first tick it was reached.
    #[must_use]
    pub fn peak_infected(&self) -> Option<(usize, usize)> {
        self.infected
            .iter()
            .enumerate()
            .fold(None, |peak, (tick, &count)| match peak {
                Some((_, best)) if best >= count => peak,
                _ => Some((tick, count)),
            })
    }

    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        let last = self.last()?;
        let (peak_tick, peak_infected) = self.peak_infected()?;
        Some(Summary {
            duration: self.len(),
            peak_infected,
            peak_tick,
            final_susceptible: last.susceptible,
            final_infected: last.infected,
            final_recovered: last.recovered,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of ticks recorded.
    pub duration: usize,
    pub peak_infected: usize,
    pub peak_tick: usize,
    pub final_susceptible: usize,
    pub final_infected: usize,
    pub final_recovered: usize,
}
