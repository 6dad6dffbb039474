use ndarray::array;
use std::collections::HashSet;
use crate::error::DdpgError;
use crate::replay_buffer::{ReplayBuffer, Transition, TransitionBatch};

fn transition(i: usize) -> Transition {
    Transition {
        state: array![i as f32, 0.0],
        action: array![i as f32 * 0.1],
        reward: i as f32,
        next_state: array![(i + 1) as f32, 0.0],
        done: false,
    }
}

#[test]
fn test_replay_buffer_add_and_sample() {
    let mut replay_buffer = ReplayBuffer::new(10, 0).unwrap();
    let experience = transition(3);
    replay_buffer.add(experience.clone());
    assert_eq!(replay_buffer.len(), 1);
    let sample = replay_buffer.sample_transitions(1).unwrap();
    assert_eq!(sample[0], &experience);
}

#[test]
fn test_replay_buffer_capacity() {
    let mut buffer = ReplayBuffer::new(3, 0).unwrap();

    for i in 0..5 {
        buffer.add(transition(i));
    }

    // only the most recent 3, oldest first
    assert_eq!(buffer.len(), 3);
    let rewards: Vec<f32> = buffer.iter().map(|t| t.reward).collect();
    assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_sample_more_than_stored() {
    let mut buffer = ReplayBuffer::new(10, 0).unwrap();
    buffer.add(transition(0));
    buffer.add(transition(1));

    let err = buffer.sample(3).unwrap_err();
    assert_eq!(err, DdpgError::InsufficientData { requested: 3, available: 2 });
}

#[test]
fn test_sample_zero_is_invalid() {
    let mut buffer = ReplayBuffer::new(10, 0).unwrap();
    buffer.add(transition(0));
    assert!(matches!(buffer.sample(0), Err(DdpgError::InvalidParameter { .. })));
}

#[test]
fn test_zero_capacity_rejected() {
    assert!(ReplayBuffer::new(0, 0).is_err());
}

#[test]
fn test_sample_is_distinct() {
    let mut buffer = ReplayBuffer::new(20, 11).unwrap();
    buffer.extend((0..20).map(transition));

    for _ in 0..50 {
        let batch = buffer.sample_transitions(20).unwrap();
        let rewards: HashSet<u32> = batch.iter().map(|t| t.reward as u32).collect();
        assert_eq!(rewards.len(), 20);
    }
}

#[test]
fn test_sampling_does_not_mutate_contents() {
    let mut buffer = ReplayBuffer::new(8, 2).unwrap();
    buffer.extend((0..8).map(transition));
    let before: Vec<Transition> = buffer.iter().cloned().collect();
    for _ in 0..10 {
        buffer.sample(4).unwrap();
    }
    let after: Vec<Transition> = buffer.iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let mut first = ReplayBuffer::new(50, 42).unwrap();
    let mut second = ReplayBuffer::new(50, 42).unwrap();
    first.extend((0..50).map(transition));
    second.extend((0..50).map(transition));

    for _ in 0..10 {
        assert_eq!(first.sample(8).unwrap(), second.sample(8).unwrap());
    }
}

#[test]
fn test_batch_columns_are_aligned() {
    let mut buffer = ReplayBuffer::new(10, 5).unwrap();
    buffer.extend((0..10).map(transition));

    let batch = buffer.sample(6).unwrap();
    assert_eq!(batch.len(), 6);
    assert_eq!(batch.states.dim(), (6, 2));
    assert_eq!(batch.actions.dim(), (6, 1));
    assert_eq!(batch.rewards.dim(), (6, 1));
    assert_eq!(batch.dones.dim(), (6, 1));
    for row in 0..6 {
        let reward = batch.rewards[[row, 0]];
        assert_eq!(batch.states[[row, 0]], reward);
        assert_eq!(batch.next_states[[row, 0]], reward + 1.0);
        assert!((batch.actions[[row, 0]] - reward * 0.1).abs() < 1e-6);
        assert_eq!(batch.dones[[row, 0]], 0.0);
    }
}

#[test]
fn test_done_flag_becomes_one() {
    let mut t = transition(1);
    t.done = true;
    let batch = TransitionBatch::from_transitions(&[&t, &transition(2)]).unwrap();
    assert_eq!(batch.dones, array![[1.0], [0.0]]);
}

#[test]
fn test_inconsistent_rows_are_shape_mismatch() {
    let mut wide = transition(1);
    wide.state = array![1.0, 2.0, 3.0];
    let err = TransitionBatch::from_transitions(&[&transition(0), &wide]).unwrap_err();
    assert!(matches!(err, DdpgError::ShapeMismatch { .. }));
}

#[test]
fn test_clear() {
    let mut buffer = ReplayBuffer::new(4, 0).unwrap();
    buffer.extend((0..4).map(transition));
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 4);
}
