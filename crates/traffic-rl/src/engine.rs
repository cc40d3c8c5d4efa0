//! Simulation engine - drives either control policy through episodes

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use traffic_core::{
    validate_episodes, Algorithm, Direction, QueueState, Result, SimulationResult, StepRecord,
    TrafficError, NUM_DIRECTIONS, STEPS_PER_EPISODE,
};

use crate::agent::{AgentConfig, QLearningAgent};
use crate::dynamics::{DynamicsConfig, TrafficDynamics};
use crate::reward::reward;

/// Mixed into the run seed to give the agent its own exploration stream
const AGENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything needed to build a runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent: AgentConfig,
    pub dynamics: DynamicsConfig,
    /// Fixed seed for reproducible runs; entropy when unset
    pub seed: Option<u64>,
}

/// Signal control policy
#[derive(Debug, Clone)]
pub enum Policy {
    /// Q-Learning agent picks each phase
    Learned(Box<QLearningAgent>),
    /// Round-robin over N, S, E, W regardless of queues
    FixedCycle,
}

impl Policy {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Policy::Learned(_) => Algorithm::Rl,
            Policy::FixedCycle => Algorithm::Fixed,
        }
    }

    /// Phase for this step. `run_step` counts from the start of the run.
    fn choose(&mut self, state: &QueueState, run_step: u64) -> Direction {
        match self {
            Policy::Learned(agent) => agent.select_action(state),
            Policy::FixedCycle => Direction::ALL[(run_step % NUM_DIRECTIONS as u64) as usize],
        }
    }

    fn learn(&mut self, state: &QueueState, action: Direction, reward: f64, next: &QueueState) {
        if let Policy::Learned(agent) = self {
            agent.update(state, action, reward, next);
        }
    }

    fn end_episode(&mut self) {
        if let Policy::Learned(agent) = self {
            agent.decay_epsilon();
        }
    }

    fn agent(&self) -> Option<&QLearningAgent> {
        match self {
            Policy::Learned(agent) => Some(&**agent),
            Policy::FixedCycle => None,
        }
    }
}

/// Where a runner is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    Running { episode: u32, step: u32 },
    Completed,
}

/// Runs one simulation with one policy.
///
/// Each runner owns its generator and (for RL) its agent, so separate
/// runners can execute on separate threads.
pub struct SimulationRunner {
    policy: Policy,
    dynamics: TrafficDynamics,
    rng: StdRng,
    phase: RunPhase,
}

impl SimulationRunner {
    /// Build a runner for `algorithm`
    pub fn new(algorithm: Algorithm, config: &SimulationConfig) -> Result<Self> {
        let dynamics = TrafficDynamics::new(config.dynamics.clone())?;

        let policy = match algorithm {
            Algorithm::Rl => {
                let mut agent = QLearningAgent::new(config.agent.clone())?;
                if let Some(seed) = config.seed {
                    agent = agent.with_seed(seed ^ AGENT_SEED_SALT);
                }
                Policy::Learned(Box::new(agent))
            }
            Algorithm::Fixed => Policy::FixedCycle,
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            policy,
            dynamics,
            rng,
            phase: RunPhase::Idle,
        })
    }

    /// Build a runner around an existing agent, e.g. one restored from a
    /// persisted Q-table
    pub fn with_agent(agent: QLearningAgent, dynamics: TrafficDynamics, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            policy: Policy::Learned(Box::new(agent)),
            dynamics,
            rng,
            phase: RunPhase::Idle,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.policy.algorithm()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The learning agent, if this is an RL run
    pub fn agent(&self) -> Option<&QLearningAgent> {
        self.policy.agent()
    }

    /// Execute `episodes` episodes of `STEPS_PER_EPISODE` steps each
    pub fn run(&mut self, episodes: u32) -> Result<SimulationResult> {
        if self.phase != RunPhase::Idle {
            return Err(TrafficError::InvalidState(format!(
                "runner is {:?}, only an idle runner can start",
                self.phase
            )));
        }
        validate_episodes(episodes)?;

        let algorithm = self.algorithm();
        info!(%algorithm, episodes, "Starting simulation run");

        let capacity = episodes as usize * STEPS_PER_EPISODE as usize;
        let mut states = Vec::with_capacity(capacity);
        let mut total_reward = 0.0;
        let mut wait_sum = 0.0;
        let mut served_sum: u64 = 0;
        let mut run_step: u64 = 0;

        for episode in 0..episodes {
            let mut current = self.dynamics.initial_state(&mut self.rng);
            let mut episode_reward = 0.0;

            for step in 0..STEPS_PER_EPISODE {
                self.phase = RunPhase::Running { episode, step };

                let action = self.policy.choose(&current, run_step);
                let outcome = self.dynamics.step(&current, action, &mut self.rng);
                let next = outcome.next_state;
                let r = reward(&current, &next);

                self.policy.learn(&current, action, r, &next);

                trace!(episode, step, %action, reward = r, served = outcome.served, "Step");
                states.push(StepRecord::new(episode, step, &next, action, r));

                total_reward += r;
                episode_reward += r;
                wait_sum += next.average();
                served_sum += u64::from(outcome.served);

                current = next;
                run_step += 1;
            }

            self.policy.end_episode();
            debug!(
                episode,
                episode_reward,
                epsilon = self.agent().map(QLearningAgent::epsilon),
                "Episode complete"
            );
        }

        self.phase = RunPhase::Completed;

        let step_count = states.len() as f64;
        let result = SimulationResult {
            episodes,
            avg_wait_time: wait_sum / step_count,
            avg_throughput: served_sum as f64 / step_count,
            total_reward: self.agent().map(|_| total_reward),
            q_values: self.agent().map(QLearningAgent::flatten_q_table),
            states,
        };

        info!(
            %algorithm,
            avg_wait_time = result.avg_wait_time,
            avg_throughput = result.avg_throughput,
            total_reward = result.total_reward,
            "Simulation run complete"
        );

        Ok(result)
    }
}

/// Run `episodes` episodes of the named policy with default settings.
///
/// `algorithm` must be `"RL"` or `"Fixed"`; anything else fails before any
/// simulation work starts.
pub fn dispatch(algorithm: &str, episodes: u32) -> Result<SimulationResult> {
    dispatch_with(&SimulationConfig::default(), algorithm, episodes)
}

/// [`dispatch`] with explicit settings
pub fn dispatch_with(
    config: &SimulationConfig,
    algorithm: &str,
    episodes: u32,
) -> Result<SimulationResult> {
    let algorithm: Algorithm = algorithm.parse()?;
    validate_episodes(episodes)?;

    SimulationRunner::new(algorithm, config)?.run(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_runner_starts_idle() {
        let runner = SimulationRunner::new(Algorithm::Rl, &seeded(1)).unwrap();
        assert_eq!(runner.phase(), RunPhase::Idle);
        assert_eq!(runner.algorithm(), Algorithm::Rl);
        assert!(runner.agent().is_some());
    }

    #[test]
    fn test_runner_completes_once() {
        let mut runner = SimulationRunner::new(Algorithm::Fixed, &seeded(2)).unwrap();
        runner.run(1).unwrap();
        assert_eq!(runner.phase(), RunPhase::Completed);

        assert!(matches!(runner.run(1), Err(TrafficError::InvalidState(_))));
    }

    #[test]
    fn test_rejected_episode_count_leaves_runner_idle() {
        let mut runner = SimulationRunner::new(Algorithm::Rl, &seeded(3)).unwrap();
        assert!(matches!(runner.run(0), Err(TrafficError::InvalidArgument(_))));
        assert_eq!(runner.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_fixed_policy_cycles_across_episodes() {
        let mut runner = SimulationRunner::new(Algorithm::Fixed, &seeded(4)).unwrap();
        let result = runner.run(3).unwrap();

        for (i, record) in result.states.iter().enumerate() {
            assert_eq!(usize::from(record.action), i % 4);
        }
    }

    #[test]
    fn test_step_records_indexing() {
        let mut runner = SimulationRunner::new(Algorithm::Rl, &seeded(5)).unwrap();
        let result = runner.run(2).unwrap();

        assert_eq!(result.states.len(), 40);
        assert_eq!(result.states[0].episode, 0);
        assert_eq!(result.states[0].step, 0);
        assert_eq!(result.states[39].episode, 1);
        assert_eq!(result.states[39].step, 19);
    }

    #[test]
    fn test_epsilon_decays_once_per_episode() {
        let mut runner = SimulationRunner::new(Algorithm::Rl, &seeded(6)).unwrap();
        runner.run(3).unwrap();

        let epsilon = runner.agent().unwrap().epsilon();
        assert!((epsilon - 0.1 * 0.995_f64.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn test_total_reward_matches_records() {
        let mut runner = SimulationRunner::new(Algorithm::Rl, &seeded(7)).unwrap();
        let result = runner.run(4).unwrap();

        let summed: f64 = result.states.iter().map(|s| s.reward).sum();
        assert!((result.total_reward.unwrap() - summed).abs() < 1e-9);
    }

    #[test]
    fn test_avg_wait_time_matches_records() {
        let mut runner = SimulationRunner::new(Algorithm::Fixed, &seeded(8)).unwrap();
        let result = runner.run(2).unwrap();

        let mean: f64 = result
            .states
            .iter()
            .map(|s| s.queue_state().unwrap().average())
            .sum::<f64>()
            / result.states.len() as f64;
        assert!((result.avg_wait_time - mean).abs() < 1e-9);
        assert!(result.avg_throughput >= 0.0 && result.avg_throughput <= 4.0);
    }

    #[test]
    fn test_dispatch_rejects_unknown_algorithm() {
        assert!(matches!(
            dispatch("Unknown", 2),
            Err(TrafficError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dispatch_rejects_out_of_range_episodes() {
        assert!(dispatch("RL", 0).is_err());
        assert!(dispatch("Fixed", 1001).is_err());
    }
}
