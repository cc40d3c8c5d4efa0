//! Tabular Q-Learning signal controller

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use traffic_core::{Direction, QueueState, Result, TrafficError};

use crate::q_table::QTable;
use crate::state::{state_index, NUM_ACTIONS};

/// Agent hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size α of the TD update
    pub learning_rate: f64,
    /// Weight γ of future reward
    pub discount_factor: f64,
    /// Initial exploration probability
    pub epsilon: f64,
    /// Multiplicative decay applied once per episode
    pub epsilon_decay: f64,
    /// Exploration floor
    pub epsilon_min: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 0.1,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(TrafficError::InvalidArgument(format!(
                    "{name} must be in [0, 1], got {value}"
                )))
            }
        };
        unit("learning_rate", self.learning_rate)?;
        unit("discount_factor", self.discount_factor)?;
        unit("epsilon", self.epsilon)?;
        unit("epsilon_min", self.epsilon_min)?;

        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(TrafficError::InvalidArgument(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        if self.epsilon_min > self.epsilon {
            return Err(TrafficError::InvalidArgument(format!(
                "epsilon_min ({}) must not exceed epsilon ({})",
                self.epsilon_min, self.epsilon
            )));
        }
        Ok(())
    }
}

/// Q-Learning agent choosing which approach gets green.
///
/// Owns its Q-table exclusively; `update` is the only way the table changes.
/// Exploration draws come from the agent's own generator so a seeded agent
/// makes the same choices on every run.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: AgentConfig,
    epsilon: f64,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create an agent with a zeroed Q-table and an entropy-seeded generator
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            epsilon: config.epsilon,
            config,
            rng: StdRng::from_entropy(),
        })
    }

    /// Make exploration reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Resume from a previously trained table
    pub fn with_q_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    pub fn num_states(&self) -> usize {
        self.q_table.num_states()
    }

    pub fn num_actions(&self) -> usize {
        self.q_table.num_actions()
    }

    /// Current exploration probability
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Q-table row for a queue snapshot
    pub fn discretize(&self, state: &QueueState) -> usize {
        state_index(state)
    }

    /// Best known action, ignoring exploration
    pub fn greedy_action(&self, state: &QueueState) -> Direction {
        self.q_table.best_action(self.discretize(state))
    }

    /// Epsilon-greedy action selection
    pub fn select_action(&mut self, state: &QueueState) -> Direction {
        if self.rng.gen::<f64>() < self.epsilon {
            let index = self.rng.gen_range(0..NUM_ACTIONS);
            Direction::ALL[index]
        } else {
            self.greedy_action(state)
        }
    }

    /// Apply the TD update
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the TD error.
    pub fn update(
        &mut self,
        state: &QueueState,
        action: Direction,
        reward: f64,
        next_state: &QueueState,
    ) -> f64 {
        let s = self.discretize(state);
        let s_next = self.discretize(next_state);

        let current_q = self.q_table.get(s, action);
        let target = reward + self.config.discount_factor * self.q_table.max_value(s_next);
        let td_error = target - current_q;

        self.q_table
            .set(s, action, current_q + self.config.learning_rate * td_error);

        trace!(state = s, action = %action, reward, td_error, "Q-value updated");
        td_error
    }

    /// Shrink exploration after a finished episode, never below the floor
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    /// Q-table as 1024 values, state-major
    pub fn flatten_q_table(&self) -> Vec<f64> {
        self.q_table.flatten()
    }

    /// Hyperparameters and live exploration rate as JSON
    pub fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "learning_rate": self.config.learning_rate,
            "discount_factor": self.config.discount_factor,
            "epsilon": self.epsilon,
            "epsilon_decay": self.config.epsilon_decay,
            "epsilon_min": self.config.epsilon_min,
            "visited_entries": self.q_table.visited_entries()
        })
    }
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self {
            q_table: QTable::new(),
            epsilon: AgentConfig::default().epsilon,
            config: AgentConfig::default(),
            rng: StdRng::from_entropy(),
        }
    }
}
