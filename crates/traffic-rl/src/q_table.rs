//! Dense Q-table over discretized intersection states

use ndarray::{Array2, ArrayView1};

use traffic_core::{Direction, Result, TrafficError};

use crate::state::{NUM_ACTIONS, NUM_STATES};

/// Q-values indexed by `[state, action]`, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array2<f64>,
}

impl QTable {
    /// Zero-initialized table of `NUM_STATES x NUM_ACTIONS`
    pub fn new() -> Self {
        Self {
            values: Array2::zeros((NUM_STATES, NUM_ACTIONS)),
        }
    }

    /// Rebuild a table from the output of [`QTable::flatten`]
    pub fn from_flat(values: Vec<f64>) -> Result<Self> {
        let len = values.len();
        let values = Array2::from_shape_vec((NUM_STATES, NUM_ACTIONS), values).map_err(|_| {
            TrafficError::InvalidArgument(format!(
                "expected {} Q-values, got {len}",
                NUM_STATES * NUM_ACTIONS
            ))
        })?;
        Ok(Self { values })
    }

    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, state: usize, action: Direction) -> f64 {
        self.values[[state, action.index()]]
    }

    pub fn set(&mut self, state: usize, action: Direction, value: f64) {
        self.values[[state, action.index()]] = value;
    }

    /// Action values for one state, in N, S, E, W order
    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.values.row(state)
    }

    /// Largest action value in a state
    pub fn max_value(&self, state: usize) -> f64 {
        self.row(state).fold(f64::NEG_INFINITY, |acc, &q| acc.max(q))
    }

    /// Highest-valued action; ties go to the lowest action index
    pub fn best_action(&self, state: usize) -> Direction {
        let row = self.row(state);
        let mut best = 0;
        for (action, &q) in row.iter().enumerate().skip(1) {
            if q > row[best] {
                best = action;
            }
        }
        Direction::ALL[best]
    }

    /// All values, state-major: state 0 actions 0..4, state 1 actions 0..4, ...
    pub fn flatten(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Number of entries that have moved away from zero
    pub fn visited_entries(&self) -> usize {
        self.values.iter().filter(|&&q| q != 0.0).count()
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}
