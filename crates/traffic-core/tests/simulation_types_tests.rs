//! Integration tests for queue and run types
//! Complements the inline unit tests in src/queue.rs and src/simulation.rs

use std::collections::HashSet;

use traffic_core::{
    Algorithm, Direction, QueueState, SimulationResult, SimulationRun, SimulationRunId, StepRecord,
    MAX_QUEUE,
};

fn sample_result() -> SimulationResult {
    let state = QueueState::new(5, 6, 7, 8);
    SimulationResult {
        episodes: 1,
        avg_wait_time: state.average(),
        avg_throughput: 4.0,
        total_reward: Some(-2.6),
        q_values: Some(vec![0.0; 1024]),
        states: vec![StepRecord::new(0, 0, &state, Direction::South, -2.6)],
    }
}

#[test]
fn test_run_id_uniqueness_stress() {
    let mut ids = HashSet::new();
    for _ in 0..10000 {
        let id = SimulationRunId::new();
        assert!(ids.insert(id), "Generated duplicate SimulationRunId");
    }
}

#[test]
fn test_every_valid_queue_is_constructible() {
    for q in 0..=MAX_QUEUE {
        let state = QueueState::new(q, q, q, q);
        assert_eq!(state.total(), 4 * q);
        assert_eq!(state.imbalance(), 0);
    }
}

#[test]
fn test_simulation_run_json_shape() {
    let run = SimulationRun::new("morning peak", Algorithm::Rl, sample_result());
    let json = serde_json::to_value(&run).unwrap();

    assert_eq!(json["name"], "morning peak");
    assert_eq!(json["algorithm"], "RL");
    assert!(json["createdAt"].is_string());
    assert_eq!(json["result"]["qValues"].as_array().unwrap().len(), 1024);

    let step = &json["result"]["states"][0];
    assert_eq!(step["episode"], 0);
    assert_eq!(step["northQueue"], 5);
    assert_eq!(step["westQueue"], 8);
    assert_eq!(step["action"], 1);
}

#[test]
fn test_simulation_run_roundtrip() {
    let run = SimulationRun::new("baseline", Algorithm::Fixed, sample_result());
    let json = serde_json::to_string(&run).unwrap();
    let parsed: SimulationRun = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.id, run.id);
    assert_eq!(parsed.algorithm, Algorithm::Fixed);
    assert_eq!(parsed.result, run.result);
}

#[test]
fn test_step_record_rejects_corrupt_queue() {
    let mut record = StepRecord::new(0, 0, &QueueState::empty(), Direction::North, 0.0);
    record.east_queue = MAX_QUEUE + 5;

    assert!(record.queue_state().is_err());
}
