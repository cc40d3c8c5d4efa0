//! Approach queues at a four-way intersection

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrafficError};

/// Largest number of vehicles a single approach can hold
pub const MAX_QUEUE: u32 = 30;

/// Number of approaches (and signal phases) at the intersection
pub const NUM_DIRECTIONS: usize = 4;

/// One approach of the intersection. Doubles as the signal phase that
/// gives that approach green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Position of this direction in N, S, E, W order
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    /// Direction for an index, `None` outside 0..4
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::East => write!(f, "east"),
            Direction::West => write!(f, "west"),
        }
    }
}

/// Snapshot of the four approach queues.
///
/// Values are immutable once built; every simulation step produces a new
/// snapshot. Each queue lies in `[0, MAX_QUEUE]`, deserialized values
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQueueState")]
pub struct QueueState {
    north: u32,
    south: u32,
    east: u32,
    west: u32,
}

/// Unchecked wire form of `QueueState`
#[derive(Deserialize)]
struct RawQueueState {
    north: u32,
    south: u32,
    east: u32,
    west: u32,
}

impl TryFrom<RawQueueState> for QueueState {
    type Error = TrafficError;

    fn try_from(raw: RawQueueState) -> Result<Self> {
        Self::try_new(raw.north, raw.south, raw.east, raw.west)
    }
}

impl QueueState {
    /// Build a snapshot from the four queue lengths.
    ///
    /// # Panics
    /// Panics if any queue exceeds `MAX_QUEUE`. Dynamics always clamp before
    /// building a state, so an out-of-range value here is a bug upstream.
    pub fn new(north: u32, south: u32, east: u32, west: u32) -> Self {
        for queue in [north, south, east, west] {
            assert!(
                queue <= MAX_QUEUE,
                "queue length {queue} exceeds MAX_QUEUE ({MAX_QUEUE})"
            );
        }
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Checked constructor for values that did not come from the dynamics
    pub fn try_new(north: u32, south: u32, east: u32, west: u32) -> Result<Self> {
        let queues = [north, south, east, west];
        if let Some(bad) = queues.iter().find(|&&q| q > MAX_QUEUE) {
            return Err(TrafficError::InvalidArgument(format!(
                "queue length {bad} outside [0, {MAX_QUEUE}]"
            )));
        }
        Ok(Self::new(north, south, east, west))
    }

    /// Build from queues in N, S, E, W order
    pub fn from_queues(queues: [u32; NUM_DIRECTIONS]) -> Self {
        Self::new(queues[0], queues[1], queues[2], queues[3])
    }

    /// Empty intersection
    pub fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn north(&self) -> u32 {
        self.north
    }

    pub fn south(&self) -> u32 {
        self.south
    }

    pub fn east(&self) -> u32 {
        self.east
    }

    pub fn west(&self) -> u32 {
        self.west
    }

    /// Queues in N, S, E, W order
    pub fn queues(&self) -> [u32; NUM_DIRECTIONS] {
        [self.north, self.south, self.east, self.west]
    }

    /// Queue length for one approach
    pub fn queue(&self, direction: Direction) -> u32 {
        self.queues()[direction.index()]
    }

    /// Total vehicles waiting across all approaches
    pub fn total(&self) -> u32 {
        self.queues().iter().sum()
    }

    /// Mean queue length per approach
    pub fn average(&self) -> f64 {
        f64::from(self.total()) / NUM_DIRECTIONS as f64
    }

    /// Longest queue; ties go to the first in N, S, E, W order
    pub fn dominant_direction(&self) -> Direction {
        let queues = self.queues();
        let mut best = 0;
        for (i, &q) in queues.iter().enumerate().skip(1) {
            if q > queues[best] {
                best = i;
            }
        }
        Direction::ALL[best]
    }

    pub fn max_queue(&self) -> u32 {
        self.queues().into_iter().max().unwrap_or(0)
    }

    pub fn min_queue(&self) -> u32 {
        self.queues().into_iter().min().unwrap_or(0)
    }

    /// Spread between the longest and shortest queue
    pub fn imbalance(&self) -> u32 {
        self.max_queue() - self.min_queue()
    }
}

impl Default for QueueState {
    fn default() -> Self {
        Self::empty()
    }
}
