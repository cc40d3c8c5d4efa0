//! Vehicle arrivals and phase-dependent service at the intersection

use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use traffic_core::{Direction, QueueState, Result, TrafficError, MAX_QUEUE, NUM_DIRECTIONS};

/// Mean vehicles arriving per approach per step
pub const ARRIVAL_RATE: f64 = 2.0;

/// Vehicles released from the green approach per step
pub const BASE_SERVICE_RATE: u32 = 3;

/// Extra release on top of the base rate when green
pub const BONUS_SERVICE_RATE: u32 = 1;

/// Inclusive range of queue lengths at the start of an episode
pub const INITIAL_QUEUE_RANGE: std::ops::RangeInclusive<u32> = 3..=18;

/// Tunable arrival and service rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub arrival_rate: f64,
    pub base_service_rate: u32,
    pub bonus_service_rate: u32,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            arrival_rate: ARRIVAL_RATE,
            base_service_rate: BASE_SERVICE_RATE,
            bonus_service_rate: BONUS_SERVICE_RATE,
        }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(TrafficError::InvalidArgument(format!(
                "arrival_rate must be finite and non-negative, got {}",
                self.arrival_rate
            )));
        }

        // Serving more than a full queue in one step is meaningless
        match self.base_service_rate.checked_add(self.bonus_service_rate) {
            Some(capacity) if capacity <= MAX_QUEUE => Ok(()),
            _ => Err(TrafficError::InvalidArgument(format!(
                "base_service_rate + bonus_service_rate must not exceed {MAX_QUEUE}, got {} + {}",
                self.base_service_rate, self.bonus_service_rate
            ))),
        }
    }
}

/// Result of applying one step of dynamics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub next_state: QueueState,
    /// Vehicles actually released from the green approach
    pub served: u32,
}

/// Stateless transition model. Randomness comes only from the generator
/// passed in, so a seeded generator gives identical trajectories.
#[derive(Debug, Clone)]
pub struct TrafficDynamics {
    config: DynamicsConfig,
    /// `None` when the arrival rate is zero
    arrivals: Option<Poisson<f64>>,
}

impl Default for TrafficDynamics {
    fn default() -> Self {
        Self::from_valid(DynamicsConfig::default())
    }
}

impl TrafficDynamics {
    pub fn new(config: DynamicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: DynamicsConfig) -> Self {
        // Poisson rejects only a zero mean once the config has validated
        let arrivals = Poisson::new(config.arrival_rate).ok();
        Self { config, arrivals }
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    /// Most vehicles the green approach can release in one step
    pub fn service_capacity(&self) -> u32 {
        self.config
            .base_service_rate
            .saturating_add(self.config.bonus_service_rate)
    }

    /// Vehicles arriving on one approach during one step
    pub fn sample_arrivals<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.arrivals
            .as_ref()
            .map_or(0, |poisson| poisson.sample(rng) as u32)
    }

    /// Starting queues, each uniform over `INITIAL_QUEUE_RANGE`
    pub fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> QueueState {
        let mut queues = [0; NUM_DIRECTIONS];
        for queue in &mut queues {
            *queue = rng.gen_range(INITIAL_QUEUE_RANGE);
        }
        QueueState::from_queues(queues)
    }

    /// Arrivals on every approach, then service on `green`, then clamp
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: &QueueState,
        green: Direction,
        rng: &mut R,
    ) -> StepOutcome {
        let mut queues = state.queues();
        let mut served = 0;

        for direction in Direction::ALL {
            let queue = &mut queues[direction.index()];
            *queue = queue.saturating_add(self.sample_arrivals(rng));

            if direction == green {
                served = (*queue).min(self.service_capacity());
                *queue -= served;
            }
            *queue = (*queue).min(MAX_QUEUE);
        }

        StepOutcome {
            next_state: QueueState::from_queues(queues),
            served,
        }
    }

    /// Next queue snapshot after one step with `green` given right of way
    pub fn advance<R: Rng + ?Sized>(
        &self,
        state: &QueueState,
        green: Direction,
        rng: &mut R,
    ) -> QueueState {
        self.step(state, green, rng).next_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_dynamics() -> TrafficDynamics {
        TrafficDynamics::new(DynamicsConfig {
            arrival_rate: 0.0,
            ..DynamicsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_initial_state_range() {
        let dynamics = TrafficDynamics::default();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..500 {
            let state = dynamics.initial_state(&mut rng);
            for q in state.queues() {
                assert!((3..=18).contains(&q));
            }
        }
    }

    #[test]
    fn test_service_only_on_green() {
        let dynamics = quiet_dynamics();
        let mut rng = StdRng::seed_from_u64(2);
        let state = QueueState::new(10, 10, 10, 10);

        let outcome = dynamics.step(&state, Direction::East, &mut rng);

        assert_eq!(outcome.next_state, QueueState::new(10, 10, 6, 10));
        assert_eq!(outcome.served, 4);
    }

    #[test]
    fn test_service_never_below_zero() {
        let dynamics = quiet_dynamics();
        let mut rng = StdRng::seed_from_u64(3);
        let state = QueueState::new(2, 0, 0, 0);

        let outcome = dynamics.step(&state, Direction::North, &mut rng);
        assert_eq!(outcome.next_state.north(), 0);
        assert_eq!(outcome.served, 2);

        let outcome = dynamics.step(&state, Direction::West, &mut rng);
        assert_eq!(outcome.served, 0);
        assert_eq!(outcome.next_state, state);
    }

    #[test]
    fn test_queues_stay_clamped() {
        let dynamics = TrafficDynamics::new(DynamicsConfig {
            arrival_rate: 25.0,
            ..DynamicsConfig::default()
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = QueueState::new(30, 30, 30, 30);

        for i in 0..100 {
            state = dynamics.advance(&state, Direction::ALL[i % 4], &mut rng);
            assert!(state.max_queue() <= MAX_QUEUE);
        }
    }

    #[test]
    fn test_advance_deterministic_with_seed() {
        let dynamics = TrafficDynamics::default();
        let state = QueueState::new(9, 14, 3, 21);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut current = state;
            let mut trajectory = Vec::new();
            for i in 0..50 {
                current = dynamics.advance(&current, Direction::ALL[i % 4], &mut rng);
                trajectory.push(current);
            }
            trajectory
        };

        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_arrival_mean() {
        let dynamics = TrafficDynamics::default();
        let mut rng = StdRng::seed_from_u64(5);
        let samples = 20_000;
        let total: u64 = (0..samples)
            .map(|_| u64::from(dynamics.sample_arrivals(&mut rng)))
            .sum();
        let mean = total as f64 / f64::from(samples);

        assert!((mean - ARRIVAL_RATE).abs() < 0.1, "sample mean {mean}");
    }

    #[test]
    fn test_zero_arrival_rate() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(quiet_dynamics().sample_arrivals(&mut rng), 0);
    }

    #[test]
    fn test_heavy_arrivals_saturate_at_max_queue() {
        let dynamics = TrafficDynamics::new(DynamicsConfig {
            arrival_rate: 1_000.0,
            ..DynamicsConfig::default()
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(8);

        let outcome = dynamics.step(&QueueState::new(30, 30, 30, 30), Direction::South, &mut rng);
        assert_eq!(outcome.next_state, QueueState::new(30, 30, 30, 30));
        assert_eq!(outcome.served, 4);
    }

    #[test]
    fn test_config_validation() {
        assert!(DynamicsConfig::default().validate().is_ok());

        let negative = DynamicsConfig {
            arrival_rate: -1.0,
            ..DynamicsConfig::default()
        };
        assert!(TrafficDynamics::new(negative).is_err());

        let nan = DynamicsConfig {
            arrival_rate: f64::NAN,
            ..DynamicsConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_service_rates_validated() {
        let overflow = DynamicsConfig {
            base_service_rate: u32::MAX,
            ..DynamicsConfig::default()
        };
        assert!(matches!(
            TrafficDynamics::new(overflow),
            Err(TrafficError::InvalidArgument(_))
        ));

        let too_fast = DynamicsConfig {
            base_service_rate: 20,
            bonus_service_rate: 11,
            ..DynamicsConfig::default()
        };
        assert!(too_fast.validate().is_err());

        let full_queue = DynamicsConfig {
            base_service_rate: 20,
            bonus_service_rate: 10,
            ..DynamicsConfig::default()
        };
        let dynamics = TrafficDynamics::new(full_queue).unwrap();
        assert_eq!(dynamics.service_capacity(), MAX_QUEUE);

        let mut rng = StdRng::seed_from_u64(9);
        let outcome = quiet_dynamics().step(&QueueState::new(0, 0, 0, 30), Direction::West, &mut rng);
        assert_eq!(outcome.served, 4);

        let drained = TrafficDynamics::new(DynamicsConfig {
            arrival_rate: 0.0,
            base_service_rate: 20,
            bonus_service_rate: 10,
        })
        .unwrap()
        .step(&QueueState::new(0, 0, 0, 30), Direction::West, &mut rng);
        assert_eq!(drained.next_state.west(), 0);
        assert_eq!(drained.served, 30);
    }
}
