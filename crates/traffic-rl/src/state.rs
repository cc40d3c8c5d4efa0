//! Discretization of queue snapshots into Q-table rows

use traffic_core::{QueueState, MAX_QUEUE, NUM_DIRECTIONS};

/// Discrete levels per approach
pub const NUM_LEVELS: usize = 4;

/// Rows in the Q-table: one per combination of approach levels
pub const NUM_STATES: usize = NUM_LEVELS * NUM_LEVELS * NUM_LEVELS * NUM_LEVELS;

/// Columns in the Q-table: one per signal phase
pub const NUM_ACTIONS: usize = NUM_DIRECTIONS;

/// Map a queue length into one of four equal-width buckets over
/// `[0, MAX_QUEUE]`. 0 maps to level 0 and `MAX_QUEUE` to level 3.
pub fn queue_level(queue: u32) -> usize {
    let level = (queue as usize * NUM_LEVELS) / (MAX_QUEUE as usize + 1);
    level.min(NUM_LEVELS - 1)
}

/// Row index for a queue snapshot.
///
/// Levels are weighted positionally as `north*64 + south*16 + east*4 + west`.
/// The Q-table layout depends on this ordering.
pub fn state_index(state: &QueueState) -> usize {
    state
        .queues()
        .iter()
        .fold(0, |index, &queue| index * NUM_LEVELS + queue_level(queue))
}
