//! Reward signal for a single signal decision

use serde::Serialize;

use traffic_core::QueueState;

/// Penalty per vehicle still waiting after the step
pub const QUEUE_PENALTY_WEIGHT: f64 = 0.1;

/// Bonus per vehicle of net queue reduction
pub const IMPROVEMENT_WEIGHT: f64 = 0.5;

/// Flat bonus when every queue is short
pub const BALANCE_BONUS: f64 = 2.0;

/// Every queue must be strictly below this for the balance bonus
pub const BALANCE_THRESHOLD: u32 = 10;

/// The three terms that make up a reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub queue_penalty: f64,
    pub improvement_bonus: f64,
    pub balance_bonus: f64,
}

impl RewardBreakdown {
    pub fn total(&self) -> f64 {
        self.queue_penalty + self.improvement_bonus + self.balance_bonus
    }
}

/// Per-term reward for moving from `old` to `new`
pub fn reward_breakdown(old: &QueueState, new: &QueueState) -> RewardBreakdown {
    let old_total = f64::from(old.total());
    let new_total = f64::from(new.total());

    RewardBreakdown {
        queue_penalty: -QUEUE_PENALTY_WEIGHT * new_total,
        improvement_bonus: IMPROVEMENT_WEIGHT * (old_total - new_total),
        balance_bonus: if new.max_queue() < BALANCE_THRESHOLD {
            BALANCE_BONUS
        } else {
            0.0
        },
    }
}

/// Scalar reward for moving from `old` to `new`
pub fn reward(old: &QueueState, new: &QueueState) -> f64 {
    reward_breakdown(old, new).total()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_when_queues_shrink() {
        let old = QueueState::new(20, 20, 20, 20);
        let new = QueueState::new(10, 10, 10, 10);

        let breakdown = reward_breakdown(&old, &new);
        assert!((breakdown.queue_penalty - -4.0).abs() < 1e-12);
        assert!((breakdown.improvement_bonus - 20.0).abs() < 1e-12);
        assert_eq!(breakdown.balance_bonus, 0.0);
        assert!((reward(&old, &new) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_balance_bonus_threshold() {
        let old = QueueState::new(9, 9, 9, 9);

        let short = QueueState::new(9, 9, 9, 9);
        assert_eq!(reward_breakdown(&old, &short).balance_bonus, 2.0);

        let one_long = QueueState::new(9, 9, 10, 9);
        assert_eq!(reward_breakdown(&old, &one_long).balance_bonus, 0.0);
    }

    #[test]
    fn test_reward_when_queues_grow() {
        let old = QueueState::new(0, 0, 0, 0);
        let new = QueueState::new(2, 2, 2, 2);

        // -0.8 penalty, -4.0 improvement, +2.0 balance
        assert!((reward(&old, &new) - -2.8).abs() < 1e-12);
    }

    #[test]
    fn test_reward_is_reproducible() {
        let old = QueueState::new(13, 7, 22, 4);
        let new = QueueState::new(15, 9, 19, 6);

        assert_eq!(reward(&old, &new).to_bits(), reward(&old, &new).to_bits());
    }

    #[test]
    fn test_empty_intersection_reward() {
        let empty = QueueState::empty();
        assert_eq!(reward(&empty, &empty), 2.0);
    }
}
